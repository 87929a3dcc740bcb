//! Normality tests.
//!
//! Shapiro-Wilk (Royston's AS R94 approximation), Anderson-Darling with the
//! Stephens small-sample correction, and the one-sample Kolmogorov-Smirnov
//! test against a fitted normal. [`assess`] picks the appropriate test by
//! sample size and returns a verdict other modules use for assumption
//! checking.
//!
//! All tests share the null hypothesis that the data are drawn from a normal
//! distribution; small p-values reject it.

use aster_core::{AsterError, Result};

use crate::descriptive;
use crate::distribution::{norm_cdf, norm_inv_cdf};

/// Result of the Shapiro-Wilk test.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapiroWilkResult {
    /// The W statistic in (0, 1]; values near 1 suggest normality.
    pub statistic: f64,
    /// P-value under H₀: data is normal.
    pub p_value: f64,
}

/// Result of the Anderson-Darling test.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AndersonDarlingResult {
    /// Raw A² statistic.
    pub statistic: f64,
    /// A² after the Stephens correction A*² = A²(1 + 0.75/n + 2.25/n²).
    pub corrected_statistic: f64,
    /// P-value from the piecewise exponential approximation.
    pub p_value: f64,
}

impl ShapiroWilkResult {
    /// True when normality is not rejected at `alpha`.
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }
}

/// Upper-tail critical values for the corrected Anderson-Darling statistic
/// under a fitted normal, as (alpha, critical A*²) pairs.
pub const AD_CRITICAL_VALUES: [(f64, f64); 4] =
    [(0.10, 0.631), (0.05, 0.752), (0.025, 0.873), (0.01, 1.035)];

impl AndersonDarlingResult {
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }

    /// Compare the corrected statistic against the tabulated critical value
    /// for `alpha` (one of 0.10, 0.05, 0.025, 0.01); `None` for other
    /// levels.
    pub fn exceeds_critical(&self, alpha: f64) -> Option<bool> {
        AD_CRITICAL_VALUES
            .iter()
            .find(|&&(a, _)| (a - alpha).abs() < 1e-12)
            .map(|&(_, cv)| self.corrected_statistic > cv)
    }
}

/// Result of the one-sample Kolmogorov-Smirnov test.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KolmogorovSmirnovResult {
    /// Supremum distance D between the ECDF and the fitted normal CDF.
    pub statistic: f64,
    /// P-value from the Kolmogorov distribution series.
    pub p_value: f64,
}

impl KolmogorovSmirnovResult {
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }
}

/// Which test [`assess`] ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NormalityTest {
    ShapiroWilk,
    AndersonDarling,
    KolmogorovSmirnov,
}

/// Outcome of the size-adaptive normality assessment.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalityReport {
    /// Which test was selected.
    pub test: NormalityTest,
    /// That test's statistic.
    pub statistic: f64,
    /// That test's p-value.
    pub p_value: f64,
    /// True when p-value >= alpha (normality not rejected).
    pub plausibly_normal: bool,
}

fn require_finite(name: &str, data: &[f64]) -> Result<()> {
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AsterError::NonNumericData(format!(
            "{}: data contains non-finite values",
            name,
        )));
    }
    Ok(())
}

// ── Shapiro-Wilk ───────────────────────────────────────────────────────────

// Royston polynomial coefficients (AS R94).
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

fn sw_poly(c: &[f64], x: f64) -> f64 {
    let mut acc = c[c.len() - 1];
    for i in (0..c.len() - 1).rev() {
        acc = acc * x + c[i];
    }
    acc
}

/// Shapiro-Wilk test, valid for 3 <= n <= 5000.
///
/// W = (Σ aᵢ x₍ᵢ₎)² / Σ(xᵢ − x̄)² with coefficients from Blom-approximated
/// normal order statistics; the p-value comes from Royston's log-normal
/// transformation of 1 − W (exact arccos formula for n = 3).
pub fn shapiro_wilk(data: &[f64]) -> Result<ShapiroWilkResult> {
    let n = data.len();
    if !(3..=5000).contains(&n) {
        return Err(AsterError::InsufficientData(format!(
            "shapiro_wilk: n must be in 3..=5000 (got {})",
            n,
        )));
    }
    require_finite("shapiro_wilk", data)?;

    let mut x = data.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));

    if x[n - 1] - x[0] < 1e-300 {
        return Err(AsterError::InsufficientData(
            "shapiro_wilk: all values identical".into(),
        ));
    }

    if n == 3 {
        return shapiro_wilk_n3(&x);
    }

    let nn2 = n / 2;
    let a = sw_coefficients(n, nn2)?;

    // W = (Σ a_i (x_{n+1-i} - x_i))² / SS
    let mut sa = 0.0;
    for i in 0..nn2 {
        sa += a[i] * (x[n - 1 - i] - x[i]);
    }
    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|&v| (v - mean).powi(2)).sum();
    let w = ((sa * sa) / ss).min(1.0);

    Ok(ShapiroWilkResult {
        statistic: w,
        p_value: sw_p_value(w, n)?.clamp(0.0, 1.0),
    })
}

fn shapiro_wilk_n3(x: &[f64]) -> Result<ShapiroWilkResult> {
    // a = [1/√2, 0, -1/√2]; exact p = 1 - (6/π) arccos(√W).
    let a1 = core::f64::consts::FRAC_1_SQRT_2;
    let mean = (x[0] + x[1] + x[2]) / 3.0;
    let ss: f64 = x.iter().map(|&v| (v - mean).powi(2)).sum();
    let numerator = a1 * (x[2] - x[0]);
    let w = ((numerator * numerator) / ss).clamp(0.75, 1.0);
    let p = (1.0 - (6.0 / core::f64::consts::PI) * w.sqrt().acos()).clamp(0.0, 1.0);
    Ok(ShapiroWilkResult {
        statistic: w,
        p_value: p,
    })
}

fn sw_coefficients(n: usize, nn2: usize) -> Result<Vec<f64>> {
    let mut a = vec![0.0; nn2];

    // Blom's approximation for expected normal order statistics.
    let mut m = vec![0.0; nn2];
    let mut summ2 = 0.0;
    for (i, mi) in m.iter_mut().enumerate() {
        let p = (i as f64 + 1.0 - 0.375) / (n as f64 + 0.25);
        *mi = norm_inv_cdf(p)?;
        summ2 += *mi * *mi;
    }
    summ2 *= 2.0;
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let a1 = sw_poly(&SW_C1, rsn) - m[0] / ssumm2;

    if n <= 5 {
        // Only a[0] gets the polynomial correction.
        let fac_sq = summ2 - 2.0 * m[0] * m[0];
        let one_minus = 1.0 - 2.0 * a1 * a1;
        if fac_sq <= 0.0 || one_minus <= 0.0 {
            return Err(AsterError::InsufficientData(
                "shapiro_wilk: degenerate coefficient normalization".into(),
            ));
        }
        let fac = (fac_sq / one_minus).sqrt();
        a[0] = a1;
        for i in 1..nn2 {
            a[i] = -m[i] / fac;
        }
    } else {
        let a2 = -m[1] / ssumm2 + sw_poly(&SW_C2, rsn);
        let fac_sq = summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1];
        let one_minus = 1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2;
        if fac_sq <= 0.0 || one_minus <= 0.0 {
            return Err(AsterError::InsufficientData(
                "shapiro_wilk: degenerate coefficient normalization".into(),
            ));
        }
        let fac = (fac_sq / one_minus).sqrt();
        a[0] = a1;
        a[1] = a2;
        for i in 2..nn2 {
            a[i] = -m[i] / fac;
        }
    }

    Ok(a)
}

fn sw_p_value(w: f64, n: usize) -> Result<f64> {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return Ok(1.0);
    }
    let y = w1.ln();

    if n <= 11 {
        let gamma = sw_poly(&SW_G, nf);
        if y >= gamma {
            return Ok(0.0);
        }
        let y2 = -(gamma - y).ln();
        let m = sw_poly(&SW_C3, nf);
        let s = sw_poly(&SW_C4, nf).exp();
        Ok(1.0 - norm_cdf((y2 - m) / s))
    } else {
        let xx = nf.ln();
        let m = sw_poly(&SW_C5, xx);
        let s = sw_poly(&SW_C6, xx).exp();
        Ok(1.0 - norm_cdf((y - m) / s))
    }
}

// ── Anderson-Darling ───────────────────────────────────────────────────────

/// Anderson-Darling test. Requires n >= 3 and at least two distinct values.
///
/// A² = −n − (1/n) Σ (2i−1)[ln Φ(zᵢ) + ln(1 − Φ(z₍n+1−i₎))], corrected per
/// Stephens (1986); the p-value is a piecewise exponential in A*².
pub fn anderson_darling(data: &[f64]) -> Result<AndersonDarlingResult> {
    let n = data.len();
    if n < 3 {
        return Err(AsterError::InsufficientData(format!(
            "anderson_darling: need at least 3 observations (got {})",
            n,
        )));
    }
    require_finite("anderson_darling", data)?;

    let mean = descriptive::mean(data)?;
    let sd = descriptive::std_dev(data, 1)?;
    if sd < 1e-300 {
        return Err(AsterError::InsufficientData(
            "anderson_darling: all values identical".into(),
        ));
    }

    let mut x = data.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));

    let nf = n as f64;
    let mut s = 0.0;
    for i in 0..n {
        let phi = norm_cdf((x[i] - mean) / sd).clamp(1e-15, 1.0 - 1e-15);
        let phi_rev = norm_cdf((x[n - 1 - i] - mean) / sd).clamp(1e-15, 1.0 - 1e-15);
        let coeff = (2 * (i + 1) - 1) as f64;
        s += coeff * (phi.ln() + (1.0 - phi_rev).ln());
    }
    let a2 = -nf - s / nf;
    let a2_star = a2 * (1.0 + 0.75 / nf + 2.25 / (nf * nf));

    Ok(AndersonDarlingResult {
        statistic: a2,
        corrected_statistic: a2_star,
        p_value: ad_p_value(a2_star),
    })
}

// D'Agostino & Stephens (1986), table 4.9.
fn ad_p_value(a2_star: f64) -> f64 {
    let p = if a2_star >= 0.6 {
        (1.2937 - 5.709 * a2_star + 0.0186 * a2_star * a2_star).exp()
    } else if a2_star > 0.34 {
        (0.9177 - 4.279 * a2_star - 1.38 * a2_star * a2_star).exp()
    } else if a2_star > 0.2 {
        1.0 - (-8.318 + 42.796 * a2_star - 59.938 * a2_star * a2_star).exp()
    } else {
        1.0 - (-13.436 + 101.14 * a2_star - 223.73 * a2_star * a2_star).exp()
    };
    p.clamp(0.0, 1.0)
}

// ── Kolmogorov-Smirnov ─────────────────────────────────────────────────────

/// One-sample Kolmogorov-Smirnov test against a normal fitted by sample mean
/// and sd. Requires n >= 3; below roughly n = 5 the asymptotic p-value is
/// conservative.
///
/// D is the supremum ECDF distance checked on both sides of each step; the
/// p-value uses the Kolmogorov series at λ = (√n + 0.12 + 0.11/√n)·D
/// (Marsaglia et al., 2003).
pub fn kolmogorov_smirnov(data: &[f64]) -> Result<KolmogorovSmirnovResult> {
    let n = data.len();
    if n < 3 {
        return Err(AsterError::InsufficientData(format!(
            "kolmogorov_smirnov: need at least 3 observations (got {})",
            n,
        )));
    }
    require_finite("kolmogorov_smirnov", data)?;

    let mean = descriptive::mean(data)?;
    let sd = descriptive::std_dev(data, 1)?;
    if sd < 1e-300 {
        return Err(AsterError::InsufficientData(
            "kolmogorov_smirnov: all values identical".into(),
        ));
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let nf = n as f64;
    let mut d_stat = 0.0_f64;
    for (i, &x) in sorted.iter().enumerate() {
        let cdf = norm_cdf((x - mean) / sd);
        d_stat = d_stat.max(((i + 1) as f64 / nf - cdf).abs());
        d_stat = d_stat.max((i as f64 / nf - cdf).abs());
    }

    // P(D > d) ≈ 2 Σ (-1)^{k-1} exp(-2 k² λ²)
    let lambda = (nf.sqrt() + 0.12 + 0.11 / nf.sqrt()) * d_stat;
    let mut p_value = 0.0;
    for k in 1..=100 {
        let kf = k as f64;
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * kf * kf * lambda * lambda).exp();
        p_value += term;
        if term.abs() < 1e-15 {
            break;
        }
    }

    Ok(KolmogorovSmirnovResult {
        statistic: d_stat,
        p_value: (2.0 * p_value).clamp(0.0, 1.0),
    })
}

// ── Size-adaptive assessment ───────────────────────────────────────────────

/// Run the normality test best suited to the sample size and compare its
/// p-value against `alpha`.
///
/// Shapiro-Wilk for 3 <= n <= 5000, Anderson-Darling beyond that. `alpha`
/// must be in (0, 1).
pub fn assess(data: &[f64], alpha: f64) -> Result<NormalityReport> {
    if !(0.0..1.0).contains(&alpha) || alpha == 0.0 {
        return Err(AsterError::InvalidParameter(
            "assess: alpha must be in (0, 1)".into(),
        ));
    }
    let n = data.len();
    if n < 3 {
        return Err(AsterError::InsufficientData(format!(
            "assess: need at least 3 observations (got {})",
            n,
        )));
    }

    let (test, statistic, p_value) = if n <= 5000 {
        let r = shapiro_wilk(data)?;
        (NormalityTest::ShapiroWilk, r.statistic, r.p_value)
    } else {
        let r = anderson_darling(data)?;
        (
            NormalityTest::AndersonDarling,
            r.corrected_statistic,
            r.p_value,
        )
    };

    Ok(NormalityReport {
        test,
        statistic,
        p_value,
        plausibly_normal: p_value >= alpha,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic standard-normal-ish sample via inverse CDF of an
    /// equally-spaced grid.
    fn normal_grid(n: usize) -> Vec<f64> {
        (1..=n)
            .map(|i| norm_inv_cdf(i as f64 / (n + 1) as f64).unwrap())
            .collect()
    }

    #[test]
    fn shapiro_wilk_normal_grid_passes() {
        let data = normal_grid(50);
        let r = shapiro_wilk(&data).unwrap();
        assert!(r.statistic > 0.95, "W={}", r.statistic);
        assert!(r.p_value > 0.05, "p={}", r.p_value);
    }

    #[test]
    fn shapiro_wilk_exponential_fails() {
        // Heavily right-skewed sample.
        let data: Vec<f64> = (1..=60)
            .map(|i| -((1.0 - i as f64 / 61.0) as f64).ln())
            .collect();
        let r = shapiro_wilk(&data).unwrap();
        assert!(r.p_value < 0.01, "p={}", r.p_value);
    }

    #[test]
    fn shapiro_wilk_n3_exact() {
        let r = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        // Perfect symmetry: W = 1 exactly for equally spaced triple.
        assert!((r.statistic - 1.0).abs() < 1e-12);
        assert!(r.p_value > 0.9);
    }

    #[test]
    fn shapiro_wilk_bounds() {
        assert!(shapiro_wilk(&[1.0, 2.0]).is_err());
        assert!(shapiro_wilk(&[5.0; 10]).is_err());
        assert!(shapiro_wilk(&[1.0, f64::NAN, 3.0]).is_err());
    }

    #[test]
    fn shapiro_wilk_small_sample_range() {
        // n in 4..=11 exercises the small-sample p-value branch.
        let data = [2.1, 3.4, 1.9, 2.8, 3.0, 2.5, 2.2];
        let r = shapiro_wilk(&data).unwrap();
        assert!(r.statistic > 0.0 && r.statistic <= 1.0);
        assert!((0.0..=1.0).contains(&r.p_value));
    }

    #[test]
    fn anderson_darling_normal_grid_passes() {
        let data = normal_grid(100);
        let r = anderson_darling(&data).unwrap();
        assert!(r.p_value > 0.05, "p={}", r.p_value);
        assert!(r.corrected_statistic < 0.752);
    }

    #[test]
    fn anderson_darling_bimodal_fails() {
        let mut data: Vec<f64> = (0..50).map(|i| -5.0 + 0.01 * i as f64).collect();
        data.extend((0..50).map(|i| 5.0 + 0.01 * i as f64));
        let r = anderson_darling(&data).unwrap();
        assert!(r.p_value < 0.01, "p={}", r.p_value);
    }

    #[test]
    fn anderson_darling_correction_grows_statistic() {
        let data = normal_grid(20);
        let r = anderson_darling(&data).unwrap();
        assert!(r.corrected_statistic > r.statistic);
    }

    #[test]
    fn anderson_darling_p_agrees_with_critical_table() {
        // At each tabulated critical value the approximation should return
        // a p-value within 0.01 of the nominal alpha.
        for (alpha, cv) in AD_CRITICAL_VALUES {
            assert!(
                (ad_p_value(cv) - alpha).abs() < 0.01,
                "alpha={}: p({})={}",
                alpha,
                cv,
                ad_p_value(cv)
            );
        }
    }

    #[test]
    fn anderson_darling_critical_lookup() {
        let r = AndersonDarlingResult {
            statistic: 0.9,
            corrected_statistic: 0.9,
            p_value: 0.02,
        };
        assert_eq!(r.exceeds_critical(0.05), Some(true));
        assert_eq!(r.exceeds_critical(0.01), Some(false));
        assert_eq!(r.exceeds_critical(0.03), None);
        assert!(!r.is_normal(0.05));
    }

    #[test]
    fn anderson_darling_insufficient() {
        assert!(anderson_darling(&[1.0, 2.0]).is_err());
        assert!(anderson_darling(&[3.0; 12]).is_err());
    }

    #[test]
    fn ks_normal_grid_passes() {
        let data = normal_grid(80);
        let r = kolmogorov_smirnov(&data).unwrap();
        assert!(r.statistic < 0.1, "D={}", r.statistic);
        assert!(r.p_value > 0.05, "p={}", r.p_value);
    }

    #[test]
    fn ks_uniform_large_fails() {
        // Uniform data departs from normal in the tails at this size.
        let data: Vec<f64> = (1..=1000).map(|i| i as f64).collect();
        let r = kolmogorov_smirnov(&data).unwrap();
        assert!(r.p_value < 0.05, "p={}", r.p_value);
    }

    #[test]
    fn ks_insufficient() {
        assert!(kolmogorov_smirnov(&[1.0, 2.0]).is_err());
        assert!(kolmogorov_smirnov(&[7.0; 10]).is_err());
    }

    #[test]
    fn ks_accepts_tiny_samples() {
        let r = kolmogorov_smirnov(&[1.0, 2.0, 3.0]).unwrap();
        assert!(r.p_value > 0.0 && r.p_value <= 1.0, "p={}", r.p_value);
        let r = kolmogorov_smirnov(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(r.p_value > 0.0 && r.p_value <= 1.0, "p={}", r.p_value);
    }

    #[test]
    fn assess_small_uses_shapiro() {
        let data = normal_grid(30);
        let report = assess(&data, 0.05).unwrap();
        assert_eq!(report.test, NormalityTest::ShapiroWilk);
        assert!(report.plausibly_normal);
    }

    #[test]
    fn assess_large_uses_anderson_darling() {
        let data = normal_grid(6000);
        let report = assess(&data, 0.05).unwrap();
        assert_eq!(report.test, NormalityTest::AndersonDarling);
        assert!(report.plausibly_normal);
    }

    #[test]
    fn assess_skewed_rejects() {
        let data: Vec<f64> = (1..=40).map(|i| (i as f64).exp2()).collect();
        let report = assess(&data, 0.05).unwrap();
        assert!(!report.plausibly_normal);
    }

    #[test]
    fn assess_invalid_alpha() {
        assert!(assess(&[1.0, 2.0, 3.0], 0.0).is_err());
        assert!(assess(&[1.0, 2.0, 3.0], 1.5).is_err());
    }
}
