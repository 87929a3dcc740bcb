//! Adjusting p-values for multiple comparisons.
//!
//! Running a family of hypothesis tests inflates the chance of a spurious
//! rejection; these procedures adjust the raw p-values so the family-wise
//! error rate (Bonferroni, Holm) or false discovery rate
//! (Benjamini-Hochberg) stays controlled at the nominal level.

use aster_core::{AsterError, Result};

/// Multiple comparison adjustment procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Adjustment {
    /// Single-step FWER control: p·m, clamped to 1.
    Bonferroni,
    /// Step-down FWER control, uniformly more powerful than Bonferroni.
    Holm,
    /// Step-up FDR control.
    BenjaminiHochberg,
}

/// Adjust `p_values`, returning adjusted values in the input order.
pub fn adjust(p_values: &[f64], method: Adjustment) -> Result<Vec<f64>> {
    check_unit_interval(p_values)?;
    Ok(match method {
        Adjustment::Bonferroni => bonferroni_adjusted(p_values),
        Adjustment::Holm => holm_adjusted(p_values),
        Adjustment::BenjaminiHochberg => bh_adjusted(p_values),
    })
}

fn check_unit_interval(p_values: &[f64]) -> Result<()> {
    for (i, &p) in p_values.iter().enumerate() {
        if !(0.0..=1.0).contains(&p) {
            return Err(AsterError::InvalidParameter(format!(
                "p-value at index {} must lie in [0, 1], got {}",
                i, p,
            )));
        }
    }
    Ok(())
}

fn order_by_p(p_values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..p_values.len()).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));
    order
}

fn bonferroni_adjusted(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len() as f64;
    p_values.iter().map(|&p| (p * m).min(1.0)).collect()
}

/// Holm: adjusted p at rank i is max over j <= i of (m − j)·p₍ⱼ₎, clamped.
fn holm_adjusted(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    let order = order_by_p(p_values);
    let mut adjusted = vec![0.0; m];
    let mut running_max = 0.0_f64;
    for (rank, &idx) in order.iter().enumerate() {
        let scaled = ((m - rank) as f64 * p_values[idx]).min(1.0);
        running_max = running_max.max(scaled);
        adjusted[idx] = running_max;
    }
    adjusted
}

/// Benjamini-Hochberg: adjusted p at rank i is min over j >= i of
/// m·p₍ⱼ₎/(j+1), clamped.
fn bh_adjusted(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    let order = order_by_p(p_values);
    let mut adjusted = vec![0.0; m];
    let mut running_min = f64::INFINITY;
    let mf = m as f64;
    for rank in (0..m).rev() {
        let idx = order[rank];
        let scaled = (mf * p_values[idx] / (rank + 1) as f64).min(1.0);
        running_min = running_min.min(scaled);
        adjusted[idx] = running_min;
    }
    adjusted
}

// ── Tests ──────────────────────────────────────────────────────────────────
