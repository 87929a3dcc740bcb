//! Parametric hypothesis tests.
//!
//! t-tests ([`t_test_one_sample`], [`t_test_paired`], [`t_test_two_sample`]),
//! one-way ANOVA with Tukey HSD post-hoc comparisons, variance-homogeneity
//! tests ([`levene`]), and categorical tests ([`chi_square_independence`],
//! [`chi_square_goodness_of_fit`], [`fisher_exact`]).
//!
//! Every result carries the test statistic, a two-tailed p-value, the effect
//! size appropriate to the test, and the assumption checks that were run so
//! callers can judge whether the parametric test was the right choice.

use aster_core::{AsterError, Result, Scored, Summarizable};

use crate::descriptive;
use crate::distribution::{ln_gamma, ChiSquared, FDistribution, StudentsT};
use crate::normality;

/// Default significance level for assumption verdicts and intervals.
pub const DEFAULT_ALPHA: f64 = 0.05;

// ── Shared result pieces ───────────────────────────────────────────────────

/// A two-sided confidence interval.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    /// Coverage level, e.g. 0.95.
    pub level: f64,
}

impl ConfidenceInterval {
    /// Whether the interval contains `value`.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Outcome of a single assumption check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verdict {
    /// The assumption was tested and not rejected.
    Passed,
    /// The assumption was tested and rejected at the chosen alpha.
    Failed,
    /// The assumption could not be tested (e.g. sample too small).
    Unchecked,
}

/// One assumption check attached to a test result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssumptionCheck {
    /// What was checked, e.g. "normality (group 1)".
    pub name: String,
    /// The test that produced the verdict, e.g. "Shapiro-Wilk".
    pub test_used: String,
    pub verdict: Verdict,
    /// P-value of the assumption test, when one was run.
    pub p_value: Option<f64>,
}

impl AssumptionCheck {
    fn normality(label: &str, data: &[f64], alpha: f64) -> Self {
        match normality::assess(data, alpha) {
            Ok(report) => AssumptionCheck {
                name: format!("normality ({})", label),
                test_used: match report.test {
                    normality::NormalityTest::ShapiroWilk => "Shapiro-Wilk".into(),
                    normality::NormalityTest::AndersonDarling => "Anderson-Darling".into(),
                    normality::NormalityTest::KolmogorovSmirnov => "Kolmogorov-Smirnov".into(),
                },
                verdict: if report.plausibly_normal {
                    Verdict::Passed
                } else {
                    Verdict::Failed
                },
                p_value: Some(report.p_value),
            },
            Err(_) => AssumptionCheck {
                name: format!("normality ({})", label),
                test_used: "Shapiro-Wilk".into(),
                verdict: Verdict::Unchecked,
                p_value: None,
            },
        }
    }

    fn variance_homogeneity(groups: &[&[f64]], alpha: f64) -> Self {
        match levene(groups, LeveneCenter::Median) {
            Ok(r) => AssumptionCheck {
                name: "equal variances".into(),
                test_used: "Brown-Forsythe".into(),
                verdict: if r.p_value >= alpha {
                    Verdict::Passed
                } else {
                    Verdict::Failed
                },
                p_value: Some(r.p_value),
            },
            Err(_) => AssumptionCheck {
                name: "equal variances".into(),
                test_used: "Brown-Forsythe".into(),
                verdict: Verdict::Unchecked,
                p_value: None,
            },
        }
    }
}

fn check_alpha(name: &str, alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(AsterError::InvalidParameter(format!(
            "{}: alpha must be in (0, 1)",
            name,
        )));
    }
    Ok(())
}

// ── t-tests ────────────────────────────────────────────────────────────────

/// Which t-test variant produced a [`TTestResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TTestKind {
    OneSample,
    Paired,
    Student,
    Welch,
}

impl TTestKind {
    fn name(&self) -> &'static str {
        match self {
            TTestKind::OneSample => "One-sample t-test",
            TTestKind::Paired => "Paired t-test",
            TTestKind::Student => "Two-sample t-test (pooled)",
            TTestKind::Welch => "Welch's t-test",
        }
    }
}

/// Variance policy for the two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariancePolicy {
    /// Pool the variances (classic Student's test).
    Pooled,
    /// Welch's correction, no equal-variance assumption.
    Welch,
    /// Run Brown-Forsythe first; pool only when it does not reject.
    Auto,
}

/// Result of a t-test.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TTestResult {
    pub kind: TTestKind,
    /// The t statistic.
    pub statistic: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// Degrees of freedom (fractional for Welch).
    pub df: f64,
    /// Estimated mean (one-sample) or mean difference.
    pub mean_difference: f64,
    /// Confidence interval for the mean difference.
    pub confidence_interval: ConfidenceInterval,
    /// Cohen's d.
    pub effect_size: f64,
    /// Assumption checks that were run.
    pub assumptions: Vec<AssumptionCheck>,
}

impl Scored for TTestResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for TTestResult {
    fn summary(&self) -> String {
        format!(
            "{}: t={:.4}, df={:.1}, p={:.6}, d={:.3}",
            self.kind.name(),
            self.statistic,
            self.df,
            self.p_value,
            self.effect_size,
        )
    }
}

fn t_interval(diff: f64, se: f64, df: f64, alpha: f64) -> Result<ConfidenceInterval> {
    let t_crit = StudentsT::new(df)?.inv_cdf(1.0 - alpha / 2.0)?;
    Ok(ConfidenceInterval {
        lower: diff - t_crit * se,
        upper: diff + t_crit * se,
        level: 1.0 - alpha,
    })
}

/// One-sample t-test: does the population mean equal `mu`?
///
/// Requires at least 2 observations with nonzero spread.
pub fn t_test_one_sample(data: &[f64], mu: f64, alpha: f64) -> Result<TTestResult> {
    check_alpha("t_test_one_sample", alpha)?;
    if data.len() < 2 {
        return Err(AsterError::InsufficientData(
            "t_test_one_sample: need at least 2 observations".into(),
        ));
    }

    let n = data.len() as f64;
    let mean = descriptive::mean(data)?;
    let sd = descriptive::std_dev(data, 1)?;
    if sd <= 0.0 {
        return Err(AsterError::InsufficientData(
            "t_test_one_sample: sample has zero variance".into(),
        ));
    }
    let se = sd / n.sqrt();
    let diff = mean - mu;
    let t = diff / se;
    let df = n - 1.0;

    Ok(TTestResult {
        kind: TTestKind::OneSample,
        statistic: t,
        p_value: StudentsT::new(df)?.two_tailed_p(t),
        df,
        mean_difference: diff,
        confidence_interval: t_interval(diff, se, df, alpha)?,
        effect_size: diff / sd,
        assumptions: vec![AssumptionCheck::normality("sample", data, alpha)],
    })
}

/// Paired t-test on two equal-length measurement vectors.
///
/// Reduces to a one-sample test on the differences; the effect size is
/// Cohen's d_z (mean difference over the sd of the differences).
pub fn t_test_paired(before: &[f64], after: &[f64], alpha: f64) -> Result<TTestResult> {
    check_alpha("t_test_paired", alpha)?;
    if before.len() != after.len() {
        return Err(AsterError::MismatchedLengths {
            left: before.len(),
            right: after.len(),
        });
    }
    if before.len() < 2 {
        return Err(AsterError::InsufficientData(
            "t_test_paired: need at least 2 pairs".into(),
        ));
    }

    let diffs: Vec<f64> = before.iter().zip(after).map(|(&b, &a)| a - b).collect();
    let n = diffs.len() as f64;
    let mean_d = descriptive::mean(&diffs)?;
    let sd_d = descriptive::std_dev(&diffs, 1)?;
    if sd_d <= 0.0 {
        return Err(AsterError::InsufficientData(
            "t_test_paired: differences have zero variance".into(),
        ));
    }
    let se = sd_d / n.sqrt();
    let t = mean_d / se;
    let df = n - 1.0;

    Ok(TTestResult {
        kind: TTestKind::Paired,
        statistic: t,
        p_value: StudentsT::new(df)?.two_tailed_p(t),
        df,
        mean_difference: mean_d,
        confidence_interval: t_interval(mean_d, se, df, alpha)?,
        effect_size: mean_d / sd_d,
        assumptions: vec![AssumptionCheck::normality("differences", &diffs, alpha)],
    })
}

/// Paired t-test over nullable measurements. Pairs where either side is
/// missing are dropped before differencing.
pub fn t_test_paired_nullable(
    before: &[Option<f64>],
    after: &[Option<f64>],
    alpha: f64,
) -> Result<TTestResult> {
    if before.len() != after.len() {
        return Err(AsterError::MismatchedLengths {
            left: before.len(),
            right: after.len(),
        });
    }
    let (b, a): (Vec<f64>, Vec<f64>) = before
        .iter()
        .zip(after)
        .filter_map(|(b, a)| match (b, a) {
            (Some(b), Some(a)) if b.is_finite() && a.is_finite() => Some((*b, *a)),
            _ => None,
        })
        .unzip();
    t_test_paired(&b, &a, alpha)
}

/// Two-sample t-test for independent groups.
///
/// The mean difference reported is `x̄ − ȳ`. Cohen's d uses the pooled
/// standard deviation regardless of the variance policy.
pub fn t_test_two_sample(
    x: &[f64],
    y: &[f64],
    policy: VariancePolicy,
    alpha: f64,
) -> Result<TTestResult> {
    check_alpha("t_test_two_sample", alpha)?;
    if x.len() < 2 || y.len() < 2 {
        return Err(AsterError::InsufficientData(
            "t_test_two_sample: each group needs at least 2 observations".into(),
        ));
    }

    let nx = x.len() as f64;
    let ny = y.len() as f64;
    let mean_x = descriptive::mean(x)?;
    let mean_y = descriptive::mean(y)?;
    let var_x = descriptive::variance(x, 1)?;
    let var_y = descriptive::variance(y, 1)?;
    if var_x <= 0.0 && var_y <= 0.0 {
        return Err(AsterError::InsufficientData(
            "t_test_two_sample: both groups have zero variance".into(),
        ));
    }

    let assumptions = vec![
        AssumptionCheck::normality("group 1", x, alpha),
        AssumptionCheck::normality("group 2", y, alpha),
        AssumptionCheck::variance_homogeneity(&[x, y], alpha),
    ];

    let pooled = match policy {
        VariancePolicy::Pooled => true,
        VariancePolicy::Welch => false,
        VariancePolicy::Auto => assumptions[2].verdict == Verdict::Passed,
    };

    let diff = mean_x - mean_y;
    let (kind, t, df, se) = if pooled {
        let sp2 = ((nx - 1.0) * var_x + (ny - 1.0) * var_y) / (nx + ny - 2.0);
        let se = (sp2 * (1.0 / nx + 1.0 / ny)).sqrt();
        (TTestKind::Student, diff / se, nx + ny - 2.0, se)
    } else {
        // Welch-Satterthwaite degrees of freedom.
        let vn_x = var_x / nx;
        let vn_y = var_y / ny;
        let se = (vn_x + vn_y).sqrt();
        let df = (vn_x + vn_y).powi(2)
            / (vn_x.powi(2) / (nx - 1.0) + vn_y.powi(2) / (ny - 1.0));
        (TTestKind::Welch, diff / se, df, se)
    };

    // Cohen's d with pooled sd.
    let sd_pooled = (((nx - 1.0) * var_x + (ny - 1.0) * var_y) / (nx + ny - 2.0)).sqrt();
    let effect_size = if sd_pooled > 0.0 { diff / sd_pooled } else { 0.0 };

    Ok(TTestResult {
        kind,
        statistic: t,
        p_value: StudentsT::new(df)?.two_tailed_p(t),
        df,
        mean_difference: diff,
        confidence_interval: t_interval(diff, se, df, alpha)?,
        effect_size,
        assumptions,
    })
}

// ── Levene / Brown-Forsythe ────────────────────────────────────────────────

/// Center used by [`levene`] when forming absolute deviations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeveneCenter {
    /// Deviations from the group mean (original Levene test).
    Mean,
    /// Deviations from the group median (Brown-Forsythe, robust default).
    Median,
}

/// Result of a variance-homogeneity test.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeveneResult {
    /// The W statistic, F-distributed under H₀.
    pub statistic: f64,
    pub p_value: f64,
    pub df_between: f64,
    pub df_within: f64,
}

/// Levene's test for equal variances across k groups.
///
/// Runs a one-way ANOVA on the absolute deviations from each group's center.
/// Each group needs at least 2 observations.
pub fn levene(groups: &[&[f64]], center: LeveneCenter) -> Result<LeveneResult> {
    if groups.len() < 2 {
        return Err(AsterError::InsufficientData(
            "levene: need at least 2 groups".into(),
        ));
    }
    for (i, g) in groups.iter().enumerate() {
        if g.len() < 2 {
            return Err(AsterError::InsufficientData(format!(
                "levene: group {} needs at least 2 observations",
                i,
            )));
        }
    }

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let c = match center {
                LeveneCenter::Mean => descriptive::mean(g)?,
                LeveneCenter::Median => descriptive::median(g)?,
            };
            Ok(g.iter().map(|&x| (x - c).abs()).collect())
        })
        .collect::<Result<_>>()?;

    let dev_refs: Vec<&[f64]> = deviations.iter().map(|d| d.as_slice()).collect();
    let f = anova_f(&dev_refs)?;

    Ok(LeveneResult {
        statistic: f.f_statistic,
        p_value: f.p_value,
        df_between: f.df_between,
        df_within: f.df_within,
    })
}

// ── One-way ANOVA ─────────────────────────────────────────────────────────

/// One pairwise comparison from Tukey's HSD.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairwiseComparison {
    /// Index of the first group in the input slice.
    pub group_a: usize,
    /// Index of the second group.
    pub group_b: usize,
    /// Mean of group_a minus mean of group_b.
    pub mean_difference: f64,
    /// Studentized range statistic for the pair.
    pub q_statistic: f64,
    /// Family-wise adjusted p-value.
    pub p_value: f64,
    /// Simultaneous confidence interval for the difference.
    pub confidence_interval: ConfidenceInterval,
}

/// Result of a one-way ANOVA.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: f64,
    pub df_within: f64,
    pub ss_between: f64,
    pub ss_within: f64,
    pub ms_between: f64,
    pub ms_within: f64,
    /// Proportion of total variance explained by group membership.
    pub eta_squared: f64,
    /// Less biased variance-explained estimate; can be slightly negative.
    pub omega_squared: f64,
    /// Tukey HSD comparisons for every group pair, empty when the omnibus
    /// test is run without post-hoc.
    pub post_hoc: Vec<PairwiseComparison>,
    pub assumptions: Vec<AssumptionCheck>,
}

impl Scored for AnovaResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for AnovaResult {
    fn summary(&self) -> String {
        format!(
            "One-way ANOVA: F({:.0}, {:.0})={:.4}, p={:.6}, eta²={:.3}",
            self.df_between, self.df_within, self.f_statistic, self.p_value, self.eta_squared,
        )
    }
}

struct AnovaCore {
    f_statistic: f64,
    p_value: f64,
    df_between: f64,
    df_within: f64,
    ss_between: f64,
    ss_within: f64,
    ms_between: f64,
    ms_within: f64,
    group_means: Vec<f64>,
    group_sizes: Vec<usize>,
}

fn anova_f(groups: &[&[f64]]) -> Result<AnovaCore> {
    let k = groups.len();
    if k < 2 {
        return Err(AsterError::InsufficientData(
            "anova: need at least 2 groups".into(),
        ));
    }
    for (i, g) in groups.iter().enumerate() {
        if g.is_empty() {
            return Err(AsterError::InsufficientData(format!(
                "anova: group {} is empty",
                i,
            )));
        }
    }

    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    if n_total <= k {
        return Err(AsterError::InsufficientData(
            "anova: total observations must exceed number of groups".into(),
        ));
    }

    let grand_sum: f64 = groups.iter().flat_map(|g| g.iter()).sum();
    let grand_mean = grand_sum / n_total as f64;

    let group_means: Vec<f64> = groups
        .iter()
        .map(|g| g.iter().sum::<f64>() / g.len() as f64)
        .collect();

    let ss_between: f64 = groups
        .iter()
        .zip(&group_means)
        .map(|(g, &m)| g.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .zip(&group_means)
        .map(|(g, &m)| g.iter().map(|&x| (x - m).powi(2)).sum::<f64>())
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;
    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;

    let f_statistic = if ms_within > 0.0 {
        ms_between / ms_within
    } else {
        f64::INFINITY
    };
    let p_value = if f_statistic.is_finite() {
        FDistribution::new(df_between, df_within)?.sf(f_statistic)
    } else {
        0.0
    };

    Ok(AnovaCore {
        f_statistic,
        p_value,
        df_between,
        df_within,
        ss_between,
        ss_within,
        ms_between,
        ms_within,
        group_means,
        group_sizes: groups.iter().map(|g| g.len()).collect(),
    })
}

/// Critical value of the studentized range by bisection on its CDF.
fn qtukey_inv(p: f64, k: f64, v: f64) -> Result<f64> {
    let mut lo = 0.0_f64;
    let mut hi = 100.0_f64;
    for _ in 0..64 {
        let mid = 0.5 * (lo + hi);
        if crate::distribution::ptukey(mid, k, v)? < p {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(0.5 * (lo + hi))
}

/// One-way ANOVA with assumption checks and Tukey HSD post-hoc comparisons.
///
/// Post-hoc intervals use the Tukey-Kramer standard error, so unbalanced
/// group sizes are handled.
pub fn anova_one_way(groups: &[&[f64]], alpha: f64) -> Result<AnovaResult> {
    check_alpha("anova_one_way", alpha)?;
    let core = anova_f(groups)?;
    let k = groups.len();

    let mut assumptions = Vec::with_capacity(k + 1);
    for (i, g) in groups.iter().enumerate() {
        assumptions.push(AssumptionCheck::normality(
            &format!("group {}", i + 1),
            g,
            alpha,
        ));
    }
    assumptions.push(AssumptionCheck::variance_homogeneity(groups, alpha));

    // Effect sizes.
    let ss_total = core.ss_between + core.ss_within;
    let eta_squared = if ss_total > 0.0 {
        core.ss_between / ss_total
    } else {
        0.0
    };
    let omega_squared = if ss_total + core.ms_within > 0.0 {
        (core.ss_between - core.df_between * core.ms_within) / (ss_total + core.ms_within)
    } else {
        0.0
    };

    // Tukey HSD over all pairs.
    let mut post_hoc = Vec::with_capacity(k * (k - 1) / 2);
    if core.ms_within > 0.0 {
        let q_crit = qtukey_inv(1.0 - alpha, k as f64, core.df_within)?;
        for a in 0..k {
            for b in (a + 1)..k {
                let na = core.group_sizes[a] as f64;
                let nb = core.group_sizes[b] as f64;
                let se = (core.ms_within / 2.0 * (1.0 / na + 1.0 / nb)).sqrt();
                let diff = core.group_means[a] - core.group_means[b];
                let q = diff.abs() / se;
                let p = 1.0 - crate::distribution::ptukey(q, k as f64, core.df_within)?;
                post_hoc.push(PairwiseComparison {
                    group_a: a,
                    group_b: b,
                    mean_difference: diff,
                    q_statistic: q,
                    p_value: p,
                    confidence_interval: ConfidenceInterval {
                        lower: diff - q_crit * se,
                        upper: diff + q_crit * se,
                        level: 1.0 - alpha,
                    },
                });
            }
        }
    }

    Ok(AnovaResult {
        f_statistic: core.f_statistic,
        p_value: core.p_value,
        df_between: core.df_between,
        df_within: core.df_within,
        ss_between: core.ss_between,
        ss_within: core.ss_within,
        ms_between: core.ms_between,
        ms_within: core.ms_within,
        eta_squared,
        omega_squared,
        post_hoc,
        assumptions,
    })
}

// ── Contingency tables and categorical tests ──────────────────────────────

/// An r×c contingency table of counts, row-major.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContingencyTable {
    counts: Vec<f64>,
    nrows: usize,
    ncols: usize,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
}

impl ContingencyTable {
    /// Build from a row-major count slice. Labels are the row/column
    /// indices as strings.
    pub fn from_counts(counts: &[f64], nrows: usize, ncols: usize) -> Result<Self> {
        let row_labels = (0..nrows).map(|i| i.to_string()).collect();
        let col_labels = (0..ncols).map(|j| j.to_string()).collect();
        Self::with_labels(counts, nrows, ncols, row_labels, col_labels)
    }

    fn with_labels(
        counts: &[f64],
        nrows: usize,
        ncols: usize,
        row_labels: Vec<String>,
        col_labels: Vec<String>,
    ) -> Result<Self> {
        if nrows < 2 || ncols < 2 {
            return Err(AsterError::InvalidParameter(
                "ContingencyTable: need at least a 2x2 table".into(),
            ));
        }
        if counts.len() != nrows * ncols {
            return Err(AsterError::MismatchedLengths {
                left: counts.len(),
                right: nrows * ncols,
            });
        }
        if counts.iter().any(|&c| c < 0.0 || !c.is_finite()) {
            return Err(AsterError::NonNumericData(
                "ContingencyTable: counts must be finite and non-negative".into(),
            ));
        }
        if counts.iter().sum::<f64>() == 0.0 {
            return Err(AsterError::InsufficientData(
                "ContingencyTable: all counts are zero".into(),
            ));
        }
        Ok(Self {
            counts: counts.to_vec(),
            nrows,
            ncols,
            row_labels,
            col_labels,
        })
    }

    /// Cross-tabulate two equal-length categorical columns.
    ///
    /// Category order is first-appearance order in each column.
    pub fn cross_tabulate(rows: &[&str], cols: &[&str]) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(AsterError::MismatchedLengths {
                left: rows.len(),
                right: cols.len(),
            });
        }

        let mut row_labels: Vec<&str> = Vec::new();
        let mut col_labels: Vec<&str> = Vec::new();
        for &r in rows {
            if !row_labels.contains(&r) {
                row_labels.push(r);
            }
        }
        for &c in cols {
            if !col_labels.contains(&c) {
                col_labels.push(c);
            }
        }

        let nrows = row_labels.len();
        let ncols = col_labels.len();
        let mut counts = vec![0.0; nrows * ncols];
        for (r, c) in rows.iter().zip(cols) {
            let i = row_labels.iter().position(|l| l == r).unwrap_or(0);
            let j = col_labels.iter().position(|l| l == c).unwrap_or(0);
            counts[i * ncols + j] += 1.0;
        }

        let row_labels = row_labels.into_iter().map(str::to_owned).collect();
        let col_labels = col_labels.into_iter().map(str::to_owned).collect();
        Self::with_labels(&counts, nrows, ncols, row_labels, col_labels)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Row categories, in first-appearance order for cross-tabulated
    /// tables and index order for [`from_counts`](Self::from_counts).
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Column categories, same ordering rules as [`row_labels`](Self::row_labels).
    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Per-row totals.
    pub fn row_totals(&self) -> Vec<f64> {
        self.margins().0
    }

    /// Per-column totals.
    pub fn col_totals(&self) -> Vec<f64> {
        self.margins().1
    }

    /// Count at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.counts[row * self.ncols + col]
    }

    /// Grand total of all counts.
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    fn margins(&self) -> (Vec<f64>, Vec<f64>) {
        let mut row_sums = vec![0.0; self.nrows];
        let mut col_sums = vec![0.0; self.ncols];
        for i in 0..self.nrows {
            for j in 0..self.ncols {
                let v = self.counts[i * self.ncols + j];
                row_sums[i] += v;
                col_sums[j] += v;
            }
        }
        (row_sums, col_sums)
    }
}

/// Result of a chi-square test.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub df: f64,
    /// Cramér's V effect size (0 for goodness-of-fit tests).
    pub cramers_v: f64,
    /// Smallest expected cell count, for judging the approximation.
    pub min_expected: f64,
    /// Expected counts, row-major, same layout as the observed table.
    pub expected: Vec<f64>,
    /// True when Yates' continuity correction was applied (2x2 only).
    pub yates_corrected: bool,
}

impl Scored for ChiSquareResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for ChiSquareResult {
    fn summary(&self) -> String {
        format!(
            "Chi-square: chi2({:.0})={:.4}, p={:.6}, V={:.3}",
            self.df, self.statistic, self.p_value, self.cramers_v,
        )
    }
}

/// Pearson chi-square test of independence.
///
/// Yates' continuity correction is applied to 2x2 tables when `yates` is
/// set. The approximation degrades when `min_expected` falls below 5;
/// callers should fall back to [`fisher_exact`] for sparse 2x2 tables.
pub fn chi_square_independence(table: &ContingencyTable, yates: bool) -> Result<ChiSquareResult> {
    let total = table.total();
    let (row_sums, col_sums) = table.margins();

    let apply_yates = yates && table.nrows == 2 && table.ncols == 2;

    let mut chi2 = 0.0;
    let mut min_expected = f64::INFINITY;
    let mut expected = vec![0.0; table.nrows * table.ncols];
    for i in 0..table.nrows {
        for j in 0..table.ncols {
            let e = row_sums[i] * col_sums[j] / total;
            expected[i * table.ncols + j] = e;
            if e < min_expected {
                min_expected = e;
            }
            if e > 0.0 {
                let mut diff = (table.get(i, j) - e).abs();
                if apply_yates {
                    diff = (diff - 0.5).max(0.0);
                }
                chi2 += diff * diff / e;
            }
        }
    }

    let df = ((table.nrows - 1) * (table.ncols - 1)) as f64;
    let p_value = ChiSquared::new(df)?.sf(chi2);

    let min_dim = (table.nrows.min(table.ncols) - 1) as f64;
    let cramers_v = (chi2 / (total * min_dim)).sqrt();

    Ok(ChiSquareResult {
        statistic: chi2,
        p_value,
        df,
        cramers_v,
        min_expected,
        expected,
        yates_corrected: apply_yates,
    })
}

/// Chi-square goodness-of-fit test of observed counts against an expected
/// distribution.
///
/// `expected` can be raw expected counts or proportions; it is rescaled to
/// the observed total, so only the relative weights matter. Every entry must
/// be positive and finite.
pub fn chi_square_goodness_of_fit(observed: &[f64], expected: &[f64]) -> Result<ChiSquareResult> {
    if observed.len() != expected.len() {
        return Err(AsterError::MismatchedLengths {
            left: observed.len(),
            right: expected.len(),
        });
    }
    if observed.len() < 2 {
        return Err(AsterError::InsufficientData(
            "chi_square_goodness_of_fit: need at least 2 categories".into(),
        ));
    }
    if observed.iter().any(|&o| o < 0.0 || !o.is_finite()) {
        return Err(AsterError::NonNumericData(
            "chi_square_goodness_of_fit: observed counts must be finite and non-negative".into(),
        ));
    }
    if expected.iter().any(|&e| e <= 0.0 || !e.is_finite()) {
        return Err(AsterError::InvalidParameter(
            "chi_square_goodness_of_fit: expected values must be positive and finite".into(),
        ));
    }

    let total: f64 = observed.iter().sum();
    if total == 0.0 {
        return Err(AsterError::InsufficientData(
            "chi_square_goodness_of_fit: all counts are zero".into(),
        ));
    }
    let expected_sum: f64 = expected.iter().sum();

    let mut chi2 = 0.0;
    let mut min_expected = f64::INFINITY;
    let mut expected_counts = Vec::with_capacity(observed.len());
    for (&o, &w) in observed.iter().zip(expected) {
        let e = total * w / expected_sum;
        expected_counts.push(e);
        if e < min_expected {
            min_expected = e;
        }
        chi2 += (o - e).powi(2) / e;
    }

    let df = (observed.len() - 1) as f64;
    let p_value = ChiSquared::new(df)?.sf(chi2);

    Ok(ChiSquareResult {
        statistic: chi2,
        p_value,
        df,
        cramers_v: 0.0,
        min_expected,
        expected: expected_counts,
        yates_corrected: false,
    })
}

/// Goodness-of-fit against the uniform distribution over the categories.
pub fn chi_square_goodness_of_fit_uniform(observed: &[f64]) -> Result<ChiSquareResult> {
    let k = observed.len();
    if k < 2 {
        return Err(AsterError::InsufficientData(
            "chi_square_goodness_of_fit: need at least 2 categories".into(),
        ));
    }
    let uniform = vec![1.0 / k as f64; k];
    chi_square_goodness_of_fit(observed, &uniform)
}

/// Fisher's exact test for a 2x2 table `[[a, b], [c, d]]`.
///
/// Two-tailed p-value: the sum of hypergeometric probabilities of all tables
/// with the same margins that are no more likely than the observed one.
pub fn fisher_exact(table: &[[usize; 2]; 2]) -> Result<ChiSquareResult> {
    let a = table[0][0];
    let b = table[0][1];
    let c = table[1][0];
    let d = table[1][1];
    let n = a + b + c + d;
    if n == 0 {
        return Err(AsterError::InsufficientData(
            "fisher_exact: table is all zeros".into(),
        ));
    }

    let row1 = a + b;
    let col1 = a + c;
    let p_observed = hypergeometric_pmf(a, row1, col1, n);

    let min_a = row1.saturating_sub(n - col1);
    let max_a = row1.min(col1);
    let mut p_value = 0.0;
    for k in min_a..=max_a {
        let p_k = hypergeometric_pmf(k, row1, col1, n);
        if p_k <= p_observed + 1e-12 {
            p_value += p_k;
        }
    }

    // Cramér's V reported from the uncorrected chi-square statistic.
    let counts = [a as f64, b as f64, c as f64, d as f64];
    let tab = ContingencyTable::from_counts(&counts, 2, 2)?;
    let chi = chi_square_independence(&tab, false)?;

    Ok(ChiSquareResult {
        statistic: chi.statistic,
        p_value: p_value.min(1.0),
        df: 1.0,
        cramers_v: chi.cramers_v,
        min_expected: chi.min_expected,
        expected: chi.expected,
        yates_corrected: false,
    })
}

fn hypergeometric_pmf(k: usize, sample_size: usize, success_pop: usize, total: usize) -> f64 {
    // C(K,k) C(N-K, n-k) / C(N, n), in log-space.
    let log_p = ln_choose(success_pop, k)
        + ln_choose(total - success_pop, sample_size - k)
        - ln_choose(total, sample_size);
    log_p.exp()
}

fn ln_choose(n: usize, k: usize) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_one_sample_centered() {
        let data = [-1.0, -0.5, 0.0, 0.5, 1.0];
        let r = t_test_one_sample(&data, 0.0, DEFAULT_ALPHA).unwrap();
        assert!(r.p_value > 0.9, "p={}", r.p_value);
        assert!(r.confidence_interval.contains(0.0));
        assert_eq!(r.kind, TTestKind::OneSample);
    }

    #[test]
    fn t_one_sample_far_from_mu() {
        let data = [10.0, 11.0, 12.0, 13.0, 14.0];
        let r = t_test_one_sample(&data, 0.0, DEFAULT_ALPHA).unwrap();
        assert!(r.p_value < 0.001, "p={}", r.p_value);
        assert!(!r.confidence_interval.contains(0.0));
        assert!(r.effect_size > 2.0);
    }

    #[test]
    fn t_one_sample_rejects_degenerate() {
        assert!(t_test_one_sample(&[1.0], 0.0, DEFAULT_ALPHA).is_err());
        assert!(t_test_one_sample(&[2.0, 2.0, 2.0], 0.0, DEFAULT_ALPHA).is_err());
    }

    #[test]
    fn t_paired_detects_shift() {
        let before = [10.0, 12.0, 11.0, 13.0, 12.0, 11.5, 12.5, 10.5];
        let after: Vec<f64> = before.iter().map(|&b| b + 2.0 + 0.1 * (b - 11.0)).collect();
        let r = t_test_paired(&before, &after, DEFAULT_ALPHA).unwrap();
        assert!(r.p_value < 0.001, "p={}", r.p_value);
        assert!(r.mean_difference > 1.5);
        assert_eq!(r.kind, TTestKind::Paired);
    }

    #[test]
    fn t_paired_nullable_drops_incomplete_pairs() {
        let before = [Some(10.0), None, Some(11.0), Some(9.5), Some(10.5), Some(10.2)];
        let after = [Some(12.0), Some(13.0), Some(13.1), None, Some(12.4), Some(12.3)];
        let r = t_test_paired_nullable(&before, &after, DEFAULT_ALPHA).unwrap();
        // Four complete pairs remain, so df = 3.
        assert!((r.df - 3.0).abs() < 1e-12);
        assert!(r.mean_difference > 1.5);
    }

    #[test]
    fn t_paired_length_mismatch() {
        let err = t_test_paired(&[1.0, 2.0], &[1.0], DEFAULT_ALPHA).unwrap_err();
        assert!(matches!(err, AsterError::MismatchedLengths { .. }));
    }

    #[test]
    fn t_two_sample_textbook_groups() {
        // Means 3 and 103, sd 1.58 each: t ≈ -100 at df=8.
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [100.0, 101.0, 102.0, 103.0, 104.0];
        let r = t_test_two_sample(&x, &y, VariancePolicy::Pooled, DEFAULT_ALPHA).unwrap();
        assert!((r.df - 8.0).abs() < 1e-12);
        assert!(r.p_value < 0.001, "p={}", r.p_value);
        assert!(r.mean_difference < -99.0);
    }

    #[test]
    fn t_two_sample_well_separated_small_groups() {
        // Means 1.3 and 2.2 with sd 0.158 each: t = -9 at df=8.
        let x = [1.2, 1.4, 1.1, 1.3, 1.5];
        let y = [2.1, 2.3, 2.0, 2.2, 2.4];
        let r = t_test_two_sample(&x, &y, VariancePolicy::Pooled, DEFAULT_ALPHA).unwrap();
        assert!((r.df - 8.0).abs() < 1e-12);
        assert!((r.mean_difference - (-0.9)).abs() < 1e-12);
        assert!((r.statistic - (-9.0)).abs() < 1e-9, "t={}", r.statistic);
        assert!(r.p_value < 0.001, "p={}", r.p_value);
    }

    #[test]
    fn t_two_sample_sign_flips_with_group_order() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [3.0, 4.0, 5.0, 6.0, 7.0];
        let xy = t_test_two_sample(&x, &y, VariancePolicy::Pooled, DEFAULT_ALPHA).unwrap();
        let yx = t_test_two_sample(&y, &x, VariancePolicy::Pooled, DEFAULT_ALPHA).unwrap();
        assert!((xy.statistic + yx.statistic).abs() < 1e-12);
        assert!((xy.p_value - yx.p_value).abs() < 1e-12);
    }

    #[test]
    fn t_two_sample_welch_fractional_df() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 30.0, 50.0, 70.0, 90.0, 110.0];
        let r = t_test_two_sample(&x, &y, VariancePolicy::Welch, DEFAULT_ALPHA).unwrap();
        assert_eq!(r.kind, TTestKind::Welch);
        // Welch df is pulled toward the noisier group and is fractional.
        assert!(r.df > 5.0 && r.df < 9.0, "df={}", r.df);
        assert!((r.df.fract()).abs() > 1e-9);
    }

    #[test]
    fn t_two_sample_auto_pools_similar_variances() {
        let x = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let y = [6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0];
        let r = t_test_two_sample(&x, &y, VariancePolicy::Auto, DEFAULT_ALPHA).unwrap();
        assert_eq!(r.kind, TTestKind::Student);
    }

    #[test]
    fn t_two_sample_assumptions_attached() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 3.0, 4.0, 5.0, 6.0];
        let r = t_test_two_sample(&x, &y, VariancePolicy::Pooled, DEFAULT_ALPHA).unwrap();
        assert_eq!(r.assumptions.len(), 3);
        assert!(r.assumptions.iter().any(|a| a.name.contains("variances")));
    }

    #[test]
    fn levene_equal_spread() {
        let g1 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let g2 = [11.0, 12.0, 13.0, 14.0, 15.0];
        let r = levene(&[&g1, &g2], LeveneCenter::Median).unwrap();
        assert!(r.p_value > 0.9, "p={}", r.p_value);
    }

    #[test]
    fn levene_unequal_spread() {
        let g1 = [9.9, 10.0, 10.1, 9.95, 10.05, 10.02, 9.98, 10.01];
        let g2 = [1.0, 20.0, 5.0, 16.0, 2.0, 19.0, 8.0, 13.0];
        let r = levene(&[&g1, &g2], LeveneCenter::Median).unwrap();
        assert!(r.p_value < 0.01, "p={}", r.p_value);
    }

    #[test]
    fn levene_mean_center_variant() {
        let g1 = [1.0, 2.0, 3.0, 4.0];
        let g2 = [1.0, 5.0, 9.0, 13.0];
        let med = levene(&[&g1, &g2], LeveneCenter::Median).unwrap();
        let mean = levene(&[&g1, &g2], LeveneCenter::Mean).unwrap();
        // Same direction, slightly different statistics.
        assert!(med.statistic > 0.0 && mean.statistic > 0.0);
    }

    #[test]
    fn anova_three_shifted_groups() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 3.0, 4.0, 5.0, 6.0];
        let c = [10.0, 11.0, 12.0, 13.0, 14.0];
        let r = anova_one_way(&[&a, &b, &c], DEFAULT_ALPHA).unwrap();
        assert!((r.df_between - 2.0).abs() < 1e-12);
        assert!((r.df_within - 12.0).abs() < 1e-12);
        assert!(r.p_value < 0.001, "p={}", r.p_value);
        assert!(r.eta_squared > 0.8, "eta2={}", r.eta_squared);
        assert!(r.omega_squared < r.eta_squared);
    }

    #[test]
    fn anova_tukey_separates_far_group() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [3.0, 4.0, 5.0, 6.0, 7.0];
        let c = [5.0, 6.0, 7.0, 8.0, 9.0];
        let r = anova_one_way(&[&a, &b, &c], DEFAULT_ALPHA).unwrap();
        assert_eq!(r.post_hoc.len(), 3);

        let ab = &r.post_hoc[0];
        let ac = &r.post_hoc[1];
        assert_eq!((ab.group_a, ab.group_b), (0, 1));
        assert_eq!((ac.group_a, ac.group_b), (0, 2));
        // Adjacent groups (diff 2) not separated, far pair (diff 4) is.
        assert!(ab.p_value > 0.05, "p_ab={}", ab.p_value);
        assert!(ac.p_value < 0.05, "p_ac={}", ac.p_value);
        assert!(!ac.confidence_interval.contains(0.0));
    }

    #[test]
    fn anova_matches_t_for_two_groups() {
        let g1 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let g2 = [3.0, 4.0, 5.0, 6.0, 7.0];
        let a = anova_one_way(&[&g1, &g2], DEFAULT_ALPHA).unwrap();
        let t = t_test_two_sample(&g1, &g2, VariancePolicy::Pooled, DEFAULT_ALPHA).unwrap();
        assert!((a.f_statistic - t.statistic * t.statistic).abs() < 1e-9);
        assert!((a.p_value - t.p_value).abs() < 1e-6);
    }

    #[test]
    fn anova_rejects_degenerate_input() {
        assert!(anova_one_way(&[&[1.0, 2.0]], DEFAULT_ALPHA).is_err());
        let empty: [f64; 0] = [];
        assert!(anova_one_way(&[&empty, &[1.0, 2.0]], DEFAULT_ALPHA).is_err());
    }

    #[test]
    fn chi_square_independent_table() {
        let t = ContingencyTable::from_counts(&[50.0, 50.0, 50.0, 50.0], 2, 2).unwrap();
        let r = chi_square_independence(&t, false).unwrap();
        assert!(r.p_value > 0.9, "p={}", r.p_value);
        assert!(r.cramers_v < 0.05);
    }

    #[test]
    fn chi_square_dependent_table() {
        let t = ContingencyTable::from_counts(&[90.0, 10.0, 10.0, 90.0], 2, 2).unwrap();
        let r = chi_square_independence(&t, false).unwrap();
        assert!(r.p_value < 0.001, "p={}", r.p_value);
        assert!((r.df - 1.0).abs() < 1e-12);
        assert!(r.cramers_v > 0.7, "V={}", r.cramers_v);
    }

    #[test]
    fn chi_square_yates_shrinks_statistic() {
        let t = ContingencyTable::from_counts(&[12.0, 5.0, 6.0, 14.0], 2, 2).unwrap();
        let plain = chi_square_independence(&t, false).unwrap();
        let corrected = chi_square_independence(&t, true).unwrap();
        assert!(corrected.yates_corrected);
        assert!(corrected.statistic < plain.statistic);
        assert!(corrected.p_value > plain.p_value);
    }

    #[test]
    fn chi_square_3x3_df() {
        let counts = [10.0, 20.0, 30.0, 20.0, 30.0, 10.0, 30.0, 10.0, 20.0];
        let t = ContingencyTable::from_counts(&counts, 3, 3).unwrap();
        let r = chi_square_independence(&t, false).unwrap();
        assert!((r.df - 4.0).abs() < 1e-12);
        assert!(r.p_value < 0.05);
    }

    #[test]
    fn chi_square_min_expected_reported() {
        let t = ContingencyTable::from_counts(&[1.0, 9.0, 2.0, 88.0], 2, 2).unwrap();
        let r = chi_square_independence(&t, false).unwrap();
        assert!(r.min_expected < 5.0);
    }

    #[test]
    fn cross_tabulate_counts() {
        let rows = ["a", "a", "b", "b", "a"];
        let cols = ["x", "y", "x", "y", "x"];
        let t = ContingencyTable::cross_tabulate(&rows, &cols).unwrap();
        assert_eq!(t.nrows(), 2);
        assert_eq!(t.ncols(), 2);
        assert_eq!(t.get(0, 0), 2.0); // (a, x)
        assert_eq!(t.get(1, 1), 1.0); // (b, y)
        assert_eq!(t.total(), 5.0);
    }

    #[test]
    fn cross_tabulate_keeps_first_appearance_labels() {
        let rows = ["late", "early", "late", "early", "late"];
        let cols = ["pass", "pass", "fail", "pass", "pass"];
        let t = ContingencyTable::cross_tabulate(&rows, &cols).unwrap();
        assert_eq!(t.row_labels(), ["late", "early"]);
        assert_eq!(t.col_labels(), ["pass", "fail"]);
        assert_eq!(t.row_totals(), [3.0, 2.0]);
        assert_eq!(t.col_totals(), [4.0, 1.0]);
    }

    #[test]
    fn from_counts_synthesizes_index_labels() {
        let t = ContingencyTable::from_counts(&[1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(t.row_labels(), ["0", "1"]);
        assert_eq!(t.col_labels(), ["0", "1"]);
    }

    #[test]
    fn goodness_of_fit_fair_die() {
        let observed = [9.0, 11.0, 10.0, 8.0, 12.0, 10.0];
        let fair = [1.0 / 6.0; 6];
        let r = chi_square_goodness_of_fit(&observed, &fair).unwrap();
        assert!((r.df - 5.0).abs() < 1e-12);
        assert!(r.p_value > 0.5, "p={}", r.p_value);
    }

    #[test]
    fn goodness_of_fit_loaded_die() {
        let observed = [5.0, 5.0, 5.0, 5.0, 5.0, 50.0];
        let fair = [1.0 / 6.0; 6];
        let r = chi_square_goodness_of_fit(&observed, &fair).unwrap();
        assert!(r.p_value < 0.001, "p={}", r.p_value);
    }

    #[test]
    fn goodness_of_fit_uniform_wrapper() {
        let observed = [18.0, 22.0, 20.0, 20.0];
        let r = chi_square_goodness_of_fit_uniform(&observed).unwrap();
        assert!((r.df - 3.0).abs() < 1e-12);
        assert!(r.p_value > 0.9);
        assert!(chi_square_goodness_of_fit_uniform(&[5.0]).is_err());
    }

    #[test]
    fn goodness_of_fit_accepts_expected_counts() {
        // Raw counts and the equivalent proportions give the same test.
        let observed = [10.0, 10.0, 10.0];
        let counts = chi_square_goodness_of_fit(&observed, &[10.0, 10.0, 10.0]).unwrap();
        let props = chi_square_goodness_of_fit(&observed, &[1.0 / 3.0; 3]).unwrap();
        assert!((counts.statistic - props.statistic).abs() < 1e-12);
        assert!((counts.p_value - props.p_value).abs() < 1e-12);
        assert_eq!(counts.expected, [10.0, 10.0, 10.0]);
    }

    #[test]
    fn goodness_of_fit_bad_expected() {
        assert!(chi_square_goodness_of_fit(&[1.0, 2.0], &[0.5, 0.0]).is_err());
        assert!(chi_square_goodness_of_fit(&[1.0, 2.0], &[0.5, -1.0]).is_err());
        assert!(chi_square_goodness_of_fit(&[1.0, 2.0], &[0.5]).is_err());
    }

    #[test]
    fn fisher_exact_tea_tasting() {
        let r = fisher_exact(&[[8, 1], [1, 8]]).unwrap();
        assert!(r.p_value < 0.05, "p={}", r.p_value);
    }

    #[test]
    fn fisher_exact_no_association() {
        let r = fisher_exact(&[[5, 5], [5, 5]]).unwrap();
        assert!(r.p_value > 0.5, "p={}", r.p_value);
    }

    #[test]
    fn fisher_exact_perfect_association() {
        let r = fisher_exact(&[[10, 0], [0, 10]]).unwrap();
        assert!(r.p_value < 0.001, "p={}", r.p_value);
        assert!(r.cramers_v > 0.99);
    }

    #[test]
    fn fisher_exact_zero_table() {
        assert!(fisher_exact(&[[0, 0], [0, 0]]).is_err());
    }

    #[test]
    fn results_implement_scored_and_summary() {
        let r = t_test_one_sample(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.0, DEFAULT_ALPHA).unwrap();
        assert!((r.score() - r.p_value).abs() < 1e-15);
        let s = r.summary();
        assert!(s.contains("One-sample t-test"));
        assert!(s.contains("p="));
    }
}
