//! Ordinary least squares regression.
//!
//! [`simple_linear`] fits y = β₀ + β₁x in closed form; [`multiple_linear`]
//! builds the design matrix with `ndarray` and solves the normal equations
//! by Cholesky decomposition. Both report per-coefficient inference,
//! goodness of fit, and residual diagnostics.

use aster_core::{AsterError, Result, Summarizable};
use ndarray::{Array1, Array2};

use crate::descriptive;
use crate::distribution::{FDistribution, StudentsT};
use crate::normality;
use crate::testing::ConfidenceInterval;

/// One fitted coefficient with its inference.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coefficient {
    /// "intercept" or the predictor's name ("x1", "x2", ... by default).
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    /// t statistic for H₀: coefficient = 0.
    pub t_statistic: f64,
    pub p_value: f64,
    pub confidence_interval: ConfidenceInterval,
}

/// Residual diagnostics shared by both regression kinds.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegressionDiagnostics {
    /// Durbin-Watson statistic, near 2 when residuals are uncorrelated.
    pub durbin_watson: f64,
    /// P-value of a normality test on the residuals, when computable.
    pub residual_normality_p: Option<f64>,
}

/// Result of a simple linear regression y = β₀ + β₁x.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleRegression {
    pub intercept: Coefficient,
    pub slope: Coefficient,
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    /// √(SSE / (n − 2)).
    pub residual_se: f64,
    /// Overall F statistic (equals slope t² here).
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub residuals: Vec<f64>,
    pub fitted: Vec<f64>,
    pub diagnostics: RegressionDiagnostics,
    pub n: usize,
}

impl SimpleRegression {
    /// Predict responses for new x values.
    pub fn predict(&self, x_new: &[f64]) -> Vec<f64> {
        x_new
            .iter()
            .map(|&xi| self.intercept.estimate + self.slope.estimate * xi)
            .collect()
    }
}

impl Summarizable for SimpleRegression {
    fn summary(&self) -> String {
        format!(
            "OLS: y = {:.4} + {:.4}x, R²={:.4}, F={:.2} (p={:.6}), n={}",
            self.intercept.estimate,
            self.slope.estimate,
            self.r_squared,
            self.f_statistic,
            self.f_p_value,
            self.n,
        )
    }
}

/// Result of a multiple linear regression y = Xβ + ε.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultipleRegression {
    /// Intercept first, then one entry per predictor in input order.
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    pub residual_se: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub residuals: Vec<f64>,
    pub fitted: Vec<f64>,
    /// Variance inflation factor per predictor (intercept excluded).
    pub vif: Vec<f64>,
    pub diagnostics: RegressionDiagnostics,
    pub n: usize,
    /// Number of predictors, excluding the intercept.
    pub p: usize,
}

impl MultipleRegression {
    /// Predict responses for new predictor columns (same order as the fit).
    pub fn predict(&self, predictors_new: &[&[f64]]) -> Result<Vec<f64>> {
        if predictors_new.len() != self.p {
            return Err(AsterError::MismatchedLengths {
                left: predictors_new.len(),
                right: self.p,
            });
        }
        let n = predictors_new[0].len();
        for pred in predictors_new {
            if pred.len() != n {
                return Err(AsterError::MismatchedLengths {
                    left: pred.len(),
                    right: n,
                });
            }
        }
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let mut y = self.coefficients[0].estimate;
            for (j, pred) in predictors_new.iter().enumerate() {
                y += self.coefficients[j + 1].estimate * pred[i];
            }
            out.push(y);
        }
        Ok(out)
    }
}

impl Summarizable for MultipleRegression {
    fn summary(&self) -> String {
        format!(
            "OLS: {} predictors, R²={:.4}, adj R²={:.4}, F={:.2} (p={:.6}), n={}",
            self.p, self.r_squared, self.adjusted_r_squared, self.f_statistic, self.f_p_value, self.n,
        )
    }
}

fn validate_column(name: &str, data: &[f64]) -> Result<()> {
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AsterError::NonNumericData(format!(
            "{}: data contains non-finite values",
            name,
        )));
    }
    Ok(())
}

fn durbin_watson(residuals: &[f64]) -> f64 {
    let ss: f64 = residuals.iter().map(|r| r * r).sum();
    if ss == 0.0 {
        return 2.0;
    }
    let num: f64 = residuals.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    num / ss
}

fn diagnostics(residuals: &[f64]) -> RegressionDiagnostics {
    RegressionDiagnostics {
        durbin_watson: durbin_watson(residuals),
        residual_normality_p: normality::assess(residuals, 0.05)
            .map(|r| r.p_value)
            .ok(),
    }
}

fn coefficient(
    name: &str,
    estimate: f64,
    se: f64,
    df: f64,
    alpha: f64,
) -> Result<Coefficient> {
    let dist = StudentsT::new(df)?;
    let t = if se > 1e-300 {
        estimate / se
    } else {
        f64::INFINITY
    };
    let p_value = if t.is_finite() { dist.two_tailed_p(t) } else { 0.0 };
    let t_crit = dist.inv_cdf(1.0 - alpha / 2.0)?;
    Ok(Coefficient {
        name: name.to_string(),
        estimate,
        std_error: se,
        t_statistic: t,
        p_value,
        confidence_interval: ConfidenceInterval {
            lower: estimate - t_crit * se,
            upper: estimate + t_crit * se,
            level: 1.0 - alpha,
        },
    })
}

// ── Simple linear regression ───────────────────────────────────────────────

/// Fit y = β₀ + β₁x by ordinary least squares.
///
/// Needs at least 3 observations and nonzero variance in x.
pub fn simple_linear(x: &[f64], y: &[f64], alpha: f64) -> Result<SimpleRegression> {
    if x.len() != y.len() {
        return Err(AsterError::MismatchedLengths {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n < 3 {
        return Err(AsterError::InsufficientData(
            "simple_linear: need at least 3 observations".into(),
        ));
    }
    validate_column("simple_linear", x)?;
    validate_column("simple_linear", y)?;

    let x_mean = descriptive::mean(x)?;
    let y_mean = descriptive::mean(y)?;
    let ss_x: f64 = x.iter().map(|&xi| (xi - x_mean).powi(2)).sum();
    if ss_x < 1e-300 {
        return Err(AsterError::InsufficientData(
            "simple_linear: predictor has zero variance".into(),
        ));
    }
    let s_xy: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (xi - x_mean) * (yi - y_mean))
        .sum();

    let slope = s_xy / ss_x;
    let intercept = y_mean - slope * x_mean;

    let fitted: Vec<f64> = x.iter().map(|&xi| intercept + slope * xi).collect();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(&yi, &fi)| yi - fi).collect();

    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let ss_tot: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();

    let nf = n as f64;
    let df_res = nf - 2.0;
    let r_squared = if ss_tot > 1e-300 {
        1.0 - ss_res / ss_tot
    } else {
        1.0
    };
    let adjusted_r_squared = 1.0 - (1.0 - r_squared) * (nf - 1.0) / df_res;

    let mse = ss_res / df_res;
    let residual_se = mse.sqrt();
    let slope_se = (mse / ss_x).sqrt();
    let intercept_se = (mse * (1.0 / nf + x_mean * x_mean / ss_x)).sqrt();

    let slope_coef = coefficient("slope", slope, slope_se, df_res, alpha)?;
    let f_statistic = slope_coef.t_statistic * slope_coef.t_statistic;
    let f_p_value = if f_statistic.is_finite() {
        FDistribution::new(1.0, df_res)?.sf(f_statistic)
    } else {
        0.0
    };

    let diag = diagnostics(&residuals);
    Ok(SimpleRegression {
        intercept: coefficient("intercept", intercept, intercept_se, df_res, alpha)?,
        slope: slope_coef,
        r_squared,
        adjusted_r_squared,
        residual_se,
        f_statistic,
        f_p_value,
        residuals,
        fitted,
        diagnostics: diag,
        n,
    })
}

/// Per-observation influence measures for a fitted simple regression.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfluenceDiagnostics {
    /// Residuals scaled by s·√(1 − hᵢ).
    pub standardized_residuals: Vec<f64>,
    /// Hat-matrix diagonal hᵢ; sums to 2 for a simple regression.
    pub leverage: Vec<f64>,
    pub cooks_distance: Vec<f64>,
}

/// Influence measures for the observations a [`SimpleRegression`] was
/// fitted on. `x` must be the predictor used in the fit.
pub fn influence(x: &[f64], fit: &SimpleRegression) -> Result<InfluenceDiagnostics> {
    let n = fit.residuals.len();
    if x.len() != n {
        return Err(AsterError::MismatchedLengths {
            left: x.len(),
            right: n,
        });
    }
    let nf = n as f64;
    let x_mean = descriptive::mean(x)?;
    let ss_x: f64 = x.iter().map(|&xi| (xi - x_mean).powi(2)).sum();

    let mut standardized = Vec::with_capacity(n);
    let mut leverage = Vec::with_capacity(n);
    let mut cooks = Vec::with_capacity(n);
    let s = fit.residual_se;
    for (i, &xi) in x.iter().enumerate() {
        let h = 1.0 / nf + (xi - x_mean).powi(2) / ss_x;
        let denom = s * (1.0 - h).max(1e-12).sqrt();
        let r = if denom > 1e-300 {
            fit.residuals[i] / denom
        } else {
            0.0
        };
        // Two estimated parameters for a simple regression.
        let d = r * r / 2.0 * h / (1.0 - h).max(1e-12);
        standardized.push(r);
        leverage.push(h);
        cooks.push(d);
    }

    Ok(InfluenceDiagnostics {
        standardized_residuals: standardized,
        leverage,
        cooks_distance: cooks,
    })
}

// ── Multiple linear regression ─────────────────────────────────────────────

/// Solve the SPD system A·x = b by Cholesky decomposition.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 1e-12 {
                    return Err(AsterError::InsufficientData(
                        "regression: design matrix is singular (collinear predictors)".into(),
                    ));
                }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    // Forward then back substitution.
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }
    Ok(x)
}

/// Inverse of an SPD matrix by solving against identity columns.
fn spd_inverse(a: &Array2<f64>) -> Result<Array2<f64>> {
    let n = a.nrows();
    let mut inv = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut e = Array1::<f64>::zeros(n);
        e[j] = 1.0;
        let col = cholesky_solve(a, &e)?;
        for i in 0..n {
            inv[[i, j]] = col[i];
        }
    }
    Ok(inv)
}

/// Fit y = Xβ + ε by OLS over several predictors.
///
/// `predictors` holds one column per predictor; an intercept column is
/// prepended automatically. Needs n >= p + 2 and a non-singular design.
pub fn multiple_linear(
    predictors: &[&[f64]],
    y: &[f64],
    alpha: f64,
) -> Result<MultipleRegression> {
    let p = predictors.len();
    let n = y.len();
    if p == 0 {
        return Err(AsterError::InvalidParameter(
            "multiple_linear: need at least one predictor".into(),
        ));
    }
    if n < p + 2 {
        return Err(AsterError::InsufficientData(format!(
            "multiple_linear: need at least {} observations for {} predictors (got {})",
            p + 2,
            p,
            n,
        )));
    }
    for pred in predictors {
        if pred.len() != n {
            return Err(AsterError::MismatchedLengths {
                left: pred.len(),
                right: n,
            });
        }
        validate_column("multiple_linear", pred)?;
    }
    validate_column("multiple_linear", y)?;

    let ncols = p + 1;
    let mut x_mat = Array2::<f64>::ones((n, ncols));
    for (j, pred) in predictors.iter().enumerate() {
        for i in 0..n {
            x_mat[[i, j + 1]] = pred[i];
        }
    }
    let y_vec = Array1::from_iter(y.iter().copied());

    let xt = x_mat.t();
    let xtx = xt.dot(&x_mat);
    let xty = xt.dot(&y_vec);

    let beta = cholesky_solve(&xtx, &xty)?;
    let fitted_vec = x_mat.dot(&beta);
    let fitted: Vec<f64> = fitted_vec.to_vec();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(&yi, &fi)| yi - fi).collect();

    let y_mean = descriptive::mean(y)?;
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let ss_tot: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();

    let nf = n as f64;
    let pf = p as f64;
    let df_res = nf - pf - 1.0;
    let r_squared = if ss_tot > 1e-300 {
        1.0 - ss_res / ss_tot
    } else {
        1.0
    };
    let adjusted_r_squared = 1.0 - (1.0 - r_squared) * (nf - 1.0) / df_res;
    let mse = ss_res / df_res;
    let residual_se = mse.sqrt();

    let xtx_inv = spd_inverse(&xtx)?;
    let mut coefficients = Vec::with_capacity(ncols);
    for j in 0..ncols {
        let name = if j == 0 {
            "intercept".to_string()
        } else {
            format!("x{}", j)
        };
        let se = (xtx_inv[[j, j]] * mse).max(0.0).sqrt();
        coefficients.push(coefficient(&name, beta[j], se, df_res, alpha)?);
    }

    let ss_reg = ss_tot - ss_res;
    let f_statistic = if mse > 1e-300 {
        (ss_reg / pf) / mse
    } else {
        f64::INFINITY
    };
    let f_p_value = if f_statistic.is_finite() {
        FDistribution::new(pf, df_res)?.sf(f_statistic)
    } else {
        0.0
    };

    let vif = compute_vif(predictors, alpha);
    let diag = diagnostics(&residuals);

    Ok(MultipleRegression {
        coefficients,
        r_squared,
        adjusted_r_squared,
        residual_se,
        f_statistic,
        f_p_value,
        residuals,
        fitted,
        vif,
        diagnostics: diag,
        n,
        p,
    })
}

/// VIF_j = 1 / (1 − R²_j), from regressing predictor j on the others.
fn compute_vif(predictors: &[&[f64]], alpha: f64) -> Vec<f64> {
    let p = predictors.len();
    if p < 2 {
        return vec![1.0; p];
    }

    let mut vif = Vec::with_capacity(p);
    for j in 0..p {
        let others: Vec<&[f64]> = predictors
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != j)
            .map(|(_, v)| *v)
            .collect();
        match multiple_linear(&others, predictors[j], alpha) {
            Ok(fit) if fit.r_squared < 1.0 - 1e-12 => vif.push(1.0 / (1.0 - fit.r_squared)),
            Ok(_) => vif.push(f64::INFINITY),
            Err(_) => vif.push(f64::NAN),
        }
    }
    vif
}

// ── Tests ──────────────────────────────────────────────────────────────────
