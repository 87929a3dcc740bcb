//! Correlation analysis.
//!
//! Pearson, Spearman and Kendall (tau-b) coefficients, significance tests
//! with Fisher-z confidence intervals, and a [`CorrelationMatrix`] that
//! handles nullable columns by pairwise deletion.

use aster_core::{AsterError, Result, Scored, Summarizable};

use crate::distribution::{norm_cdf, norm_inv_cdf, StudentsT};
use crate::rank::{rank, RankMethod};
use crate::testing::ConfidenceInterval;

/// Coefficient used for a correlation computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
    Kendall,
}

impl CorrelationMethod {
    fn name(&self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "Pearson",
            CorrelationMethod::Spearman => "Spearman",
            CorrelationMethod::Kendall => "Kendall",
        }
    }
}

/// A correlation coefficient with its significance test.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelationResult {
    pub method: CorrelationMethod,
    /// The coefficient, in [-1, 1].
    pub r: f64,
    /// Two-tailed p-value under H₀: no association.
    pub p_value: f64,
    /// Number of observation pairs used.
    pub n: usize,
    /// Fisher-z interval for the coefficient (Pearson and Spearman, n >= 4).
    pub confidence_interval: Option<ConfidenceInterval>,
}

impl Scored for CorrelationResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for CorrelationResult {
    fn summary(&self) -> String {
        format!(
            "{} correlation: r={:.4}, n={}, p={:.6}",
            self.method.name(),
            self.r,
            self.n,
            self.p_value,
        )
    }
}

fn validate_paired(x: &[f64], y: &[f64], min_n: usize) -> Result<()> {
    if x.len() != y.len() {
        return Err(AsterError::MismatchedLengths {
            left: x.len(),
            right: y.len(),
        });
    }
    if x.len() < min_n {
        return Err(AsterError::InsufficientData(format!(
            "correlation: need at least {} observation pairs (got {})",
            min_n,
            x.len(),
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(AsterError::NonNumericData(
            "correlation: data contains non-finite values".into(),
        ));
    }
    Ok(())
}

/// Pearson coefficient on pre-validated slices. Constant input yields 0.
fn pearson_raw(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x: f64 = x.iter().sum::<f64>() / n;
    let mean_y: f64 = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        (cov / denom).clamp(-1.0, 1.0)
    }
}

/// Pearson product-moment correlation coefficient.
///
/// Returns 0.0 if either series is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_paired(x, y, 2)?;
    Ok(pearson_raw(x, y))
}

/// Spearman rank correlation: Pearson on tie-averaged ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_paired(x, y, 2)?;
    let rx = rank(x, RankMethod::Average);
    let ry = rank(y, RankMethod::Average);
    Ok(pearson_raw(&rx, &ry))
}

/// Kendall's tau-b, with the tie adjustment in the denominator.
///
/// O(n²) pair scan; fine for the column lengths this crate targets.
pub fn kendall(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_paired(x, y, 2)?;
    let n = x.len();

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut ties_x = 0i64;
    let mut ties_y = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 && dy == 0.0 {
                // Joint tie contributes to neither adjustment.
            } else if dx == 0.0 {
                ties_x += 1;
            } else if dy == 0.0 {
                ties_y += 1;
            } else if dx * dy > 0.0 {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let n0 = (n * (n - 1) / 2) as f64;
    let denom = ((n0 - ties_x as f64) * (n0 - ties_y as f64)).sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok(((concordant - discordant) as f64 / denom).clamp(-1.0, 1.0))
}

fn t_test_for_r(r: f64, n: usize) -> Result<f64> {
    let df = (n - 2) as f64;
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }
    let t = r * (df / (1.0 - r * r)).sqrt();
    Ok(StudentsT::new(df)?.two_tailed_p(t))
}

fn fisher_z_interval(r: f64, n: usize, alpha: f64) -> Result<Option<ConfidenceInterval>> {
    if n < 4 || r.abs() >= 1.0 {
        return Ok(None);
    }
    let z = r.atanh();
    let se = 1.0 / ((n - 3) as f64).sqrt();
    let z_crit = norm_inv_cdf(1.0 - alpha / 2.0)?;
    Ok(Some(ConfidenceInterval {
        lower: (z - z_crit * se).tanh(),
        upper: (z + z_crit * se).tanh(),
        level: 1.0 - alpha,
    }))
}

/// Pearson correlation with t-test p-value and Fisher-z interval.
///
/// Needs at least 3 pairs for the significance test.
pub fn pearson_test(x: &[f64], y: &[f64], alpha: f64) -> Result<CorrelationResult> {
    validate_paired(x, y, 3)?;
    let r = pearson_raw(x, y);
    Ok(CorrelationResult {
        method: CorrelationMethod::Pearson,
        r,
        p_value: t_test_for_r(r, x.len())?,
        n: x.len(),
        confidence_interval: fisher_z_interval(r, x.len(), alpha)?,
    })
}

/// Spearman correlation with t-test p-value on the rank coefficient.
pub fn spearman_test(x: &[f64], y: &[f64], alpha: f64) -> Result<CorrelationResult> {
    validate_paired(x, y, 3)?;
    let rx = rank(x, RankMethod::Average);
    let ry = rank(y, RankMethod::Average);
    let r = pearson_raw(&rx, &ry);
    Ok(CorrelationResult {
        method: CorrelationMethod::Spearman,
        r,
        p_value: t_test_for_r(r, x.len())?,
        n: x.len(),
        confidence_interval: fisher_z_interval(r, x.len(), alpha)?,
    })
}

/// Kendall's tau-b with the normal-approximation p-value.
pub fn kendall_test(x: &[f64], y: &[f64]) -> Result<CorrelationResult> {
    validate_paired(x, y, 3)?;
    let tau = kendall(x, y)?;
    let nf = x.len() as f64;

    // z = 3·tau·√(n(n−1)) / √(2(2n+5))
    let z = 3.0 * tau * (nf * (nf - 1.0)).sqrt() / (2.0 * (2.0 * nf + 5.0)).sqrt();
    let p = (2.0 * (1.0 - norm_cdf(z.abs()))).clamp(0.0, 1.0);

    Ok(CorrelationResult {
        method: CorrelationMethod::Kendall,
        r: tau,
        p_value: p,
        n: x.len(),
        confidence_interval: None,
    })
}

// ── Correlation matrix ─────────────────────────────────────────────────────

/// Minimum valid pairs per cell when building from nullable columns.
const MIN_PAIRS: usize = 3;

/// Pairwise correlation matrix for a set of variables.
///
/// Always symmetric with a unit diagonal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelationMatrix {
    /// Flat storage (row-major, n×n).
    data: Vec<f64>,
    size: usize,
    method: CorrelationMethod,
    labels: Option<Vec<String>>,
}

impl CorrelationMatrix {
    /// Build from rows of observations, one inner slice per variable.
    ///
    /// All variables must have the same length, at least 2.
    pub fn from_rows(rows: &[&[f64]], method: CorrelationMethod) -> Result<Self> {
        Self::build(rows, method, None)
    }

    /// Build a labeled matrix.
    pub fn from_rows_labeled(
        rows: &[&[f64]],
        method: CorrelationMethod,
        labels: &[&str],
    ) -> Result<Self> {
        if labels.len() != rows.len() {
            return Err(AsterError::MismatchedLengths {
                left: labels.len(),
                right: rows.len(),
            });
        }
        let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        Self::build(rows, method, Some(labels))
    }

    /// Build from nullable columns with pairwise deletion.
    ///
    /// For each pair of variables only rows where both are present and
    /// finite contribute; a pair with fewer than 3 such rows is an error.
    pub fn from_nullable_columns(
        columns: &[&[Option<f64>]],
        method: CorrelationMethod,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(AsterError::InsufficientData(
                "CorrelationMatrix: need at least one variable".into(),
            ));
        }
        let obs_len = columns[0].len();
        for col in columns.iter() {
            if col.len() != obs_len {
                return Err(AsterError::MismatchedLengths {
                    left: col.len(),
                    right: obs_len,
                });
            }
        }

        let n = columns.len();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let mut xs = Vec::new();
                let mut ys = Vec::new();
                for (a, b) in columns[i].iter().zip(columns[j]) {
                    if let (Some(av), Some(bv)) = (a, b) {
                        if av.is_finite() && bv.is_finite() {
                            xs.push(*av);
                            ys.push(*bv);
                        }
                    }
                }
                if xs.len() < MIN_PAIRS {
                    return Err(AsterError::InsufficientData(format!(
                        "CorrelationMatrix: variables {} and {} share only {} valid pairs (need {})",
                        i,
                        j,
                        xs.len(),
                        MIN_PAIRS,
                    )));
                }
                let r = coefficient(&xs, &ys, method);
                data[i * n + j] = r;
                data[j * n + i] = r;
            }
        }

        Ok(Self {
            data,
            size: n,
            method,
            labels: None,
        })
    }

    fn build(
        rows: &[&[f64]],
        method: CorrelationMethod,
        labels: Option<Vec<String>>,
    ) -> Result<Self> {
        if rows.is_empty() {
            return Err(AsterError::InsufficientData(
                "CorrelationMatrix: need at least one variable".into(),
            ));
        }
        let obs_len = rows[0].len();
        if obs_len < 2 {
            return Err(AsterError::InsufficientData(
                "CorrelationMatrix: need at least 2 observations".into(),
            ));
        }
        for row in rows.iter() {
            if row.len() != obs_len {
                return Err(AsterError::MismatchedLengths {
                    left: row.len(),
                    right: obs_len,
                });
            }
        }

        let n = rows.len();
        #[cfg(feature = "parallel")]
        let data = {
            use rayon::prelude::*;
            let upper: Vec<Vec<(usize, f64)>> = (0..n)
                .into_par_iter()
                .map(|i| {
                    ((i + 1)..n)
                        .map(|j| (j, coefficient(rows[i], rows[j], method)))
                        .collect()
                })
                .collect();
            let mut data = vec![0.0; n * n];
            for i in 0..n {
                data[i * n + i] = 1.0;
                for &(j, r) in &upper[i] {
                    data[i * n + j] = r;
                    data[j * n + i] = r;
                }
            }
            data
        };
        #[cfg(not(feature = "parallel"))]
        let data = {
            let mut data = vec![0.0; n * n];
            for i in 0..n {
                data[i * n + i] = 1.0;
                for j in (i + 1)..n {
                    let r = coefficient(rows[i], rows[j], method);
                    data[i * n + j] = r;
                    data[j * n + i] = r;
                }
            }
            data
        };

        Ok(Self {
            data,
            size: n,
            method,
            labels,
        })
    }

    /// Correlation between variables `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    /// Number of variables.
    pub fn n(&self) -> usize {
        self.size
    }

    /// Which coefficient fills the matrix.
    pub fn method(&self) -> CorrelationMethod {
        self.method
    }

    /// Variable labels, if provided.
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }
}

impl Summarizable for CorrelationMatrix {
    fn summary(&self) -> String {
        format!(
            "CorrelationMatrix ({}): {}x{}",
            self.method.name(),
            self.size,
            self.size,
        )
    }
}

/// Coefficient on pre-validated equal-length slices.
fn coefficient(x: &[f64], y: &[f64], method: CorrelationMethod) -> f64 {
    match method {
        CorrelationMethod::Pearson => pearson_raw(x, y),
        CorrelationMethod::Spearman => {
            let rx = rank(x, RankMethod::Average);
            let ry = rank(y, RankMethod::Average);
            pearson_raw(&rx, &ry)
        }
        CorrelationMethod::Kendall => kendall(x, y).unwrap_or(0.0),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn pearson_perfect_positive() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < TOL);
    }

    #[test]
    fn pearson_perfect_negative() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y).unwrap() + 1.0).abs() < TOL);
    }

    #[test]
    fn pearson_orthogonal() {
        let x = [1.0, 0.0, -1.0, 0.0];
        let y = [0.0, 1.0, 0.0, -1.0];
        assert!(pearson(&x, &y).unwrap().abs() < TOL);
    }

    #[test]
    fn pearson_constant_series() {
        assert!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).unwrap().abs() < TOL);
    }

    #[test]
    fn pearson_invalid_input() {
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_err());
        assert!(pearson(&[1.0], &[2.0]).is_err());
        assert!(pearson(&[1.0, f64::NAN], &[2.0, 3.0]).is_err());
    }

    #[test]
    fn spearman_monotone_nonlinear() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 8.0, 27.0, 64.0, 125.0];
        assert!((spearman(&x, &y).unwrap() - 1.0).abs() < TOL);
    }

    #[test]
    fn spearman_reverse() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert!((spearman(&x, &y).unwrap() + 1.0).abs() < TOL);
    }

    #[test]
    fn kendall_perfect_orders() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let up = [10.0, 20.0, 30.0, 40.0, 50.0];
        let down = [50.0, 40.0, 30.0, 20.0, 10.0];
        assert!((kendall(&x, &up).unwrap() - 1.0).abs() < TOL);
        assert!((kendall(&x, &down).unwrap() + 1.0).abs() < TOL);
    }

    #[test]
    fn kendall_with_ties_stays_bounded() {
        let x = [1.0, 2.0, 2.0, 3.0, 4.0];
        let y = [1.0, 2.0, 3.0, 3.0, 5.0];
        let tau = kendall(&x, &y).unwrap();
        assert!(tau > 0.5 && tau <= 1.0, "tau={}", tau);
    }

    #[test]
    fn pearson_test_strong_association() {
        let x: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| 3.0 * v + 1.0).collect();
        let r = pearson_test(&x, &y, 0.05).unwrap();
        assert!((r.r - 1.0).abs() < TOL);
        assert!(r.p_value < 1e-6);
        assert_eq!(r.n, 20);
    }

    #[test]
    fn pearson_test_confidence_interval_brackets_r() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 8.0, 7.0];
        let r = pearson_test(&x, &y, 0.05).unwrap();
        let ci = r.confidence_interval.unwrap();
        assert!(ci.lower < r.r && r.r < ci.upper);
        assert!(ci.lower >= -1.0 && ci.upper <= 1.0);
        assert!((ci.level - 0.95).abs() < TOL);
    }

    #[test]
    fn pearson_test_no_association() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y = [5.0, 2.0, 8.0, 1.0, 7.0, 3.0, 6.0, 4.0];
        let r = pearson_test(&x, &y, 0.05).unwrap();
        assert!(r.p_value > 0.1, "p={}", r.p_value);
        assert!(r.confidence_interval.unwrap().contains(0.0));
    }

    #[test]
    fn spearman_test_monotone() {
        let x: Vec<f64> = (1..=15).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| v.exp()).collect();
        let r = spearman_test(&x, &y, 0.05).unwrap();
        assert!((r.r - 1.0).abs() < TOL);
        assert!(r.p_value < 1e-6);
    }

    #[test]
    fn kendall_test_significant() {
        let x: Vec<f64> = (1..=15).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| v * 2.0).collect();
        let r = kendall_test(&x, &y).unwrap();
        assert!((r.r - 1.0).abs() < TOL);
        assert!(r.p_value < 0.001);
        assert!(r.confidence_interval.is_none());
    }

    #[test]
    fn matrix_diagonal_and_symmetry() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [4.0, 3.0, 2.0, 1.0];
        let c = [1.0, 3.0, 2.0, 4.0];
        let cm =
            CorrelationMatrix::from_rows(&[&a, &b, &c], CorrelationMethod::Pearson).unwrap();
        assert_eq!(cm.n(), 3);
        for i in 0..3 {
            assert!((cm.get(i, i) - 1.0).abs() < TOL);
            for j in 0..3 {
                assert!((cm.get(i, j) - cm.get(j, i)).abs() < TOL);
                assert!(cm.get(i, j).abs() <= 1.0 + TOL);
            }
        }
    }

    #[test]
    fn matrix_spearman_method() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [1.0, 4.0, 9.0, 16.0];
        let cm =
            CorrelationMatrix::from_rows(&[&a, &b], CorrelationMethod::Spearman).unwrap();
        assert!((cm.get(0, 1) - 1.0).abs() < TOL);
        assert_eq!(cm.method(), CorrelationMethod::Spearman);
    }

    #[test]
    fn matrix_labeled() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let cm = CorrelationMatrix::from_rows_labeled(
            &[&a, &b],
            CorrelationMethod::Pearson,
            &["height", "weight"],
        )
        .unwrap();
        assert_eq!(cm.labels().unwrap(), &["height", "weight"]);
    }

    #[test]
    fn matrix_nullable_pairwise_deletion() {
        let a = [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)];
        let b = [Some(2.0), Some(4.0), Some(6.0), Some(8.0), None];
        let cm = CorrelationMatrix::from_nullable_columns(
            &[&a, &b],
            CorrelationMethod::Pearson,
        )
        .unwrap();
        // Only rows 0, 1, 3 are jointly present; they are perfectly linear.
        assert!((cm.get(0, 1) - 1.0).abs() < TOL);
    }

    #[test]
    fn matrix_nullable_too_few_pairs() {
        let a = [Some(1.0), Some(2.0), None, None];
        let b = [Some(2.0), None, Some(6.0), Some(8.0)];
        let err = CorrelationMatrix::from_nullable_columns(
            &[&a, &b],
            CorrelationMethod::Pearson,
        )
        .unwrap_err();
        assert!(matches!(err, AsterError::InsufficientData(_)));
    }

    #[test]
    fn matrix_length_mismatch() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0];
        assert!(
            CorrelationMatrix::from_rows(&[&a, &b], CorrelationMethod::Pearson).is_err()
        );
    }
}
