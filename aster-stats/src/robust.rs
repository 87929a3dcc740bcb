//! Robust estimators: trimmed and winsorized means, MAD summaries, and
//! Theil-Sen regression.
//!
//! These tolerate heavy tails and outliers where their classical
//! counterparts in [`crate::descriptive`] and [`crate::regression`] break
//! down.

use aster_core::{AsterError, Result, Summarizable};

use crate::descriptive;

/// MAD scale factor to make the estimate consistent with the standard
/// deviation under normality (1 / Φ⁻¹(0.75)).
const MAD_CONSISTENCY: f64 = 1.4826;

fn validate(name: &str, data: &[f64], min_n: usize) -> Result<()> {
    if data.len() < min_n {
        return Err(AsterError::InsufficientData(format!(
            "{}: need at least {} observations (got {})",
            name,
            min_n,
            data.len(),
        )));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AsterError::NonNumericData(format!(
            "{}: data contains non-finite values",
            name,
        )));
    }
    Ok(())
}

fn check_proportion(name: &str, proportion: f64) -> Result<()> {
    if !(0.0..0.5).contains(&proportion) {
        return Err(AsterError::InvalidParameter(format!(
            "{}: trim proportion must be in [0, 0.5), got {}",
            name, proportion,
        )));
    }
    Ok(())
}

/// Mean after dropping the lowest and highest `proportion` of values.
///
/// `proportion` is per tail; 0.2 discards 20% from each end. The count
/// trimmed per tail is `floor(n * proportion)`.
pub fn trimmed_mean(data: &[f64], proportion: f64) -> Result<f64> {
    validate("trimmed_mean", data, 1)?;
    check_proportion("trimmed_mean", proportion)?;

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let k = (sorted.len() as f64 * proportion).floor() as usize;
    let kept = &sorted[k..sorted.len() - k];
    if kept.is_empty() {
        return Err(AsterError::InsufficientData(
            "trimmed_mean: trimming removed all observations".into(),
        ));
    }
    Ok(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// Mean after clamping the lowest and highest `proportion` of values to
/// the nearest kept order statistic.
pub fn winsorized_mean(data: &[f64], proportion: f64) -> Result<f64> {
    validate("winsorized_mean", data, 1)?;
    check_proportion("winsorized_mean", proportion)?;

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let k = (n as f64 * proportion).floor() as usize;
    if 2 * k >= n {
        return Err(AsterError::InsufficientData(
            "winsorized_mean: winsorizing removed all observations".into(),
        ));
    }
    let low = sorted[k];
    let high = sorted[n - 1 - k];
    for v in sorted.iter_mut().take(k) {
        *v = low;
    }
    for v in sorted.iter_mut().skip(n - k) {
        *v = high;
    }
    Ok(sorted.iter().sum::<f64>() / n as f64)
}

/// Location and scale summary built from the median and MAD.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobustSummary {
    pub median: f64,
    /// Raw median absolute deviation.
    pub mad: f64,
    /// MAD scaled by 1.4826, comparable to a standard deviation under
    /// normality.
    pub mad_scaled: f64,
    /// 20% trimmed mean.
    pub trimmed_mean: f64,
    /// 20% winsorized mean.
    pub winsorized_mean: f64,
    pub n: usize,
}

impl Summarizable for RobustSummary {
    fn summary(&self) -> String {
        format!(
            "robust: median={:.6}, MAD={:.6} (scaled {:.6}), trimmed mean={:.6}, n={}",
            self.median, self.mad, self.mad_scaled, self.trimmed_mean, self.n,
        )
    }
}

/// Robust location/scale summary of a sample.
pub fn robust_summary(data: &[f64]) -> Result<RobustSummary> {
    validate("robust_summary", data, 2)?;
    let median = descriptive::median(data)?;
    let mad = descriptive::mad(data)?;
    Ok(RobustSummary {
        median,
        mad,
        mad_scaled: mad * MAD_CONSISTENCY,
        trimmed_mean: trimmed_mean(data, 0.2)?,
        winsorized_mean: winsorized_mean(data, 0.2)?,
        n: data.len(),
    })
}

/// Theil-Sen regression line.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TheilSenResult {
    /// Median of all pairwise slopes.
    pub slope: f64,
    /// Median of y − slope·x.
    pub intercept: f64,
    /// Number of finite pairwise slopes used.
    pub n_slopes: usize,
    pub n: usize,
}

impl TheilSenResult {
    pub fn predict(&self, x_new: &[f64]) -> Vec<f64> {
        x_new
            .iter()
            .map(|&xi| self.intercept + self.slope * xi)
            .collect()
    }
}

impl Summarizable for TheilSenResult {
    fn summary(&self) -> String {
        format!(
            "Theil-Sen: y = {:.6} + {:.6}x ({} slopes, n={})",
            self.intercept, self.slope, self.n_slopes, self.n,
        )
    }
}

/// Fit a line by the Theil-Sen estimator: slope is the median of all
/// pairwise slopes (pairs with equal x are skipped), intercept the median
/// of the per-point residual intercepts.
pub fn theil_sen(x: &[f64], y: &[f64]) -> Result<TheilSenResult> {
    if x.len() != y.len() {
        return Err(AsterError::MismatchedLengths {
            left: x.len(),
            right: y.len(),
        });
    }
    validate("theil_sen", x, 3)?;
    validate("theil_sen", y, 3)?;

    let n = x.len();
    let mut slopes = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[j] - x[i];
            if dx.abs() > 1e-300 {
                slopes.push((y[j] - y[i]) / dx);
            }
        }
    }
    if slopes.is_empty() {
        return Err(AsterError::InsufficientData(
            "theil_sen: predictor has no distinct values".into(),
        ));
    }
    let slope = descriptive::median(&slopes)?;
    let intercepts: Vec<f64> = x.iter().zip(y).map(|(&xi, &yi)| yi - slope * xi).collect();
    let intercept = descriptive::median(&intercepts)?;

    Ok(TheilSenResult {
        slope,
        intercept,
        n_slopes: slopes.len(),
        n,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_mean_drops_tails() {
        // 20% of 10 trims 2 per tail, leaving 3..=8 with mean 5.5.
        let data: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let m = trimmed_mean(&data, 0.2).unwrap();
        assert!((m - 5.5).abs() < 1e-12);
    }

    #[test]
    fn trimmed_mean_zero_proportion_is_mean() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert!((trimmed_mean(&data, 0.0).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn trimmed_mean_shrugs_off_outlier() {
        let mut data: Vec<f64> = (1..=9).map(|i| i as f64).collect();
        data.push(1000.0);
        let m = trimmed_mean(&data, 0.2).unwrap();
        assert!((m - 5.5).abs() < 1e-12);
    }

    #[test]
    fn winsorized_mean_clamps_tails() {
        // k=2: [3,3,3,4,5,6,7,8,8,8] → mean 5.5.
        let data: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let m = winsorized_mean(&data, 0.2).unwrap();
        assert!((m - 5.5).abs() < 1e-12);
    }

    #[test]
    fn winsorized_mean_outlier_bounded() {
        let mut data: Vec<f64> = (1..=9).map(|i| i as f64).collect();
        data.push(1000.0);
        let m = winsorized_mean(&data, 0.1).unwrap();
        // Outlier clamped to 9, minimum clamped to 2.
        assert!((m - (2.0 + 2.0 + 3.0 + 4.0 + 5.0 + 6.0 + 7.0 + 8.0 + 9.0 + 9.0) / 10.0).abs() < 1e-12);
    }

    #[test]
    fn proportion_bounds_enforced() {
        let data = [1.0, 2.0, 3.0];
        assert!(trimmed_mean(&data, 0.5).is_err());
        assert!(trimmed_mean(&data, -0.1).is_err());
        assert!(winsorized_mean(&data, 0.5).is_err());
    }

    #[test]
    fn robust_summary_resists_outlier() {
        let mut data: Vec<f64> = (1..=19).map(|i| i as f64).collect();
        data.push(10_000.0);
        let r = robust_summary(&data).unwrap();
        assert!((r.median - 10.5).abs() < 1e-12);
        assert!(r.mad < 10.0);
        assert!(r.trimmed_mean < 20.0);
        assert_eq!(r.n, 20);
    }

    #[test]
    fn mad_scaled_tracks_std_dev_for_normal_like_data() {
        // Symmetric grid: scaled MAD and SD should be the same order.
        let data: Vec<f64> = (-50..=50).map(|i| i as f64 / 10.0).collect();
        let r = robust_summary(&data).unwrap();
        let sd = descriptive::std_dev(&data, 1).unwrap();
        assert!(r.mad_scaled > 0.5 * sd && r.mad_scaled < 1.5 * sd);
    }

    #[test]
    fn theil_sen_exact_line() {
        let x: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| 2.0 * v + 1.0).collect();
        let fit = theil_sen(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert_eq!(fit.n_slopes, 45);
    }

    #[test]
    fn theil_sen_ignores_gross_outlier() {
        let x: Vec<f64> = (1..=15).map(|i| i as f64).collect();
        let mut y: Vec<f64> = x.iter().map(|&v| 3.0 * v - 1.0).collect();
        y[7] = 500.0;
        let fit = theil_sen(&x, &y).unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-9, "slope={}", fit.slope);
        assert!((fit.intercept + 1.0).abs() < 1e-9);
    }

    #[test]
    fn theil_sen_skips_equal_x_pairs() {
        let x = [1.0, 1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 4.0, 6.0];
        let fit = theil_sen(&x, &y).unwrap();
        assert_eq!(fit.n_slopes, 5);
        assert!((fit.slope - 2.0).abs() < 1e-12);
    }

    #[test]
    fn theil_sen_constant_x_errors() {
        let x = [2.0, 2.0, 2.0];
        let y = [1.0, 2.0, 3.0];
        assert!(theil_sen(&x, &y).is_err());
    }

    #[test]
    fn theil_sen_predict() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit = theil_sen(&x, &y).unwrap();
        let pred = fit.predict(&[10.0]);
        assert!((pred[0] - 21.0).abs() < 1e-12);
    }
}
