//! Resampling inference: bootstrap confidence intervals and permutation
//! tests.
//!
//! All routines take an explicit `seed` so results are reproducible; the
//! generator is a Xorshift64 kept private to this module. With the
//! `parallel` feature the resampling loops fan out over rayon, each chunk
//! running its own generator derived from the caller's seed so the
//! parallel and serial paths draw from the same seed space.

use aster_core::{AsterError, Result, Summarizable};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::descriptive;
use crate::testing::ConfidenceInterval;

// ── PRNG ───────────────────────────────────────────────────────────────────

struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_usize(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

fn fisher_yates_shuffle(slice: &mut [f64], rng: &mut Xorshift64) {
    let n = slice.len();
    for i in (1..n).rev() {
        let j = rng.next_usize(i + 1);
        slice.swap(i, j);
    }
}

// ── Bootstrap ──────────────────────────────────────────────────────────────

/// Result of a percentile bootstrap.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BootstrapResult {
    /// Statistic evaluated on the original sample.
    pub estimate: f64,
    pub confidence_interval: ConfidenceInterval,
    /// Standard deviation of the bootstrap distribution.
    pub std_error: f64,
    pub n_resamples: usize,
}

impl Summarizable for BootstrapResult {
    fn summary(&self) -> String {
        format!(
            "bootstrap: estimate={:.6}, {:.0}% CI [{:.6}, {:.6}], SE={:.6}, B={}",
            self.estimate,
            self.confidence_interval.level * 100.0,
            self.confidence_interval.lower,
            self.confidence_interval.upper,
            self.std_error,
            self.n_resamples,
        )
    }
}

fn validate_resample_inputs(data: &[f64], n_resamples: usize, level: f64) -> Result<()> {
    if data.len() < 2 {
        return Err(AsterError::InsufficientData(
            "bootstrap: need at least 2 observations".into(),
        ));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AsterError::NonNumericData(
            "bootstrap: data contains non-finite values".into(),
        ));
    }
    if n_resamples == 0 {
        return Err(AsterError::InvalidParameter(
            "bootstrap: n_resamples must be > 0".into(),
        ));
    }
    if !(0.0..1.0).contains(&(1.0 - level)) || level <= 0.0 {
        return Err(AsterError::InvalidParameter(format!(
            "bootstrap: confidence level must be in (0, 1), got {}",
            level,
        )));
    }
    Ok(())
}

fn bootstrap_replicates<F>(
    data: &[f64],
    statistic: &F,
    n_resamples: usize,
    seed: u64,
) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    let n = data.len();

    #[cfg(feature = "parallel")]
    {
        (0..n_resamples)
            .into_par_iter()
            .map(|b| {
                let mut rng = Xorshift64::new(seed.wrapping_add(b as u64 * 97));
                let sample: Vec<f64> = (0..n).map(|_| data[rng.next_usize(n)]).collect();
                statistic(&sample)
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut rng = Xorshift64::new(seed);
        let mut sample = vec![0.0; n];
        (0..n_resamples)
            .map(|_| {
                for slot in sample.iter_mut() {
                    *slot = data[rng.next_usize(n)];
                }
                statistic(&sample)
            })
            .collect()
    }
}

/// The raw bootstrap distribution of a statistic, for callers that want to
/// inspect or plot it rather than summarize to an interval.
pub fn bootstrap_distribution<F>(
    data: &[f64],
    statistic: F,
    n_resamples: usize,
    seed: u64,
) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    validate_resample_inputs(data, n_resamples, 0.95)?;
    Ok(bootstrap_replicates(data, &statistic, n_resamples, seed))
}

/// Percentile bootstrap confidence interval for an arbitrary statistic.
///
/// `statistic` is evaluated on `n_resamples` with-replacement resamples of
/// `data`; the interval spans the (α/2, 1−α/2) quantiles of the resulting
/// bootstrap distribution.
pub fn bootstrap_ci<F>(
    data: &[f64],
    statistic: F,
    n_resamples: usize,
    level: f64,
    seed: u64,
) -> Result<BootstrapResult>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    validate_resample_inputs(data, n_resamples, level)?;

    let estimate = statistic(data);
    let mut replicates = bootstrap_replicates(data, &statistic, n_resamples, seed);
    replicates.retain(|v| v.is_finite());
    if replicates.len() < 2 {
        return Err(AsterError::InsufficientData(
            "bootstrap: statistic produced fewer than 2 finite replicates".into(),
        ));
    }
    replicates.sort_by(|a, b| a.total_cmp(b));

    let alpha = 1.0 - level;
    let lower = descriptive::quantile(&replicates, alpha / 2.0)?;
    let upper = descriptive::quantile(&replicates, 1.0 - alpha / 2.0)?;
    let std_error = descriptive::std_dev(&replicates, 1)?;

    Ok(BootstrapResult {
        estimate,
        confidence_interval: ConfidenceInterval {
            lower,
            upper,
            level,
        },
        std_error,
        n_resamples: replicates.len(),
    })
}

/// Convenience wrapper: percentile bootstrap CI for the sample mean.
pub fn bootstrap_mean_ci(
    data: &[f64],
    n_resamples: usize,
    level: f64,
    seed: u64,
) -> Result<BootstrapResult> {
    bootstrap_ci(
        data,
        |s| s.iter().sum::<f64>() / s.len() as f64,
        n_resamples,
        level,
        seed,
    )
}

/// Convenience wrapper: percentile bootstrap CI for the sample median.
pub fn bootstrap_median_ci(
    data: &[f64],
    n_resamples: usize,
    level: f64,
    seed: u64,
) -> Result<BootstrapResult> {
    bootstrap_ci(
        data,
        |s| {
            let mut v = s.to_vec();
            v.sort_by(|a, b| a.total_cmp(b));
            let n = v.len();
            if n % 2 == 0 {
                (v[n / 2 - 1] + v[n / 2]) / 2.0
            } else {
                v[n / 2]
            }
        },
        n_resamples,
        level,
        seed,
    )
}

// ── Permutation test ───────────────────────────────────────────────────────

/// Alternative hypothesis for the two-sample permutation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alternative {
    TwoSided,
    /// Mean of the first sample is greater.
    Greater,
    /// Mean of the first sample is less.
    Less,
}

/// Result of a two-sample permutation test on the difference in means.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PermutationResult {
    /// Observed mean(a) − mean(b).
    pub observed: f64,
    /// (extreme + 1) / (permutations + 1).
    pub p_value: f64,
    pub n_permutations: usize,
    pub alternative: Alternative,
}

impl Summarizable for PermutationResult {
    fn summary(&self) -> String {
        format!(
            "permutation test: observed diff={:.6}, p={:.6} ({} permutations)",
            self.observed, self.p_value, self.n_permutations,
        )
    }
}

fn mean_diff(pooled: &[f64], n1: usize) -> f64 {
    let (a, b) = pooled.split_at(n1);
    a.iter().sum::<f64>() / a.len() as f64 - b.iter().sum::<f64>() / b.len() as f64
}

fn is_extreme(perm: f64, observed: f64, alternative: Alternative) -> bool {
    match alternative {
        Alternative::TwoSided => perm.abs() >= observed.abs() - 1e-12,
        Alternative::Greater => perm >= observed - 1e-12,
        Alternative::Less => perm <= observed + 1e-12,
    }
}

/// The permutation null distribution of the mean difference, one entry per
/// shuffle of the pooled sample.
pub fn permutation_null(
    a: &[f64],
    b: &[f64],
    n_permutations: usize,
    seed: u64,
) -> Result<Vec<f64>> {
    if a.len() < 2 || b.len() < 2 {
        return Err(AsterError::InsufficientData(
            "permutation_null: each group needs at least 2 observations".into(),
        ));
    }
    if a.iter().chain(b).any(|v| !v.is_finite()) {
        return Err(AsterError::NonNumericData(
            "permutation_null: data contains non-finite values".into(),
        ));
    }
    if n_permutations == 0 {
        return Err(AsterError::InvalidParameter(
            "permutation_null: n_permutations must be > 0".into(),
        ));
    }

    let n1 = a.len();
    let pooled: Vec<f64> = a.iter().chain(b).copied().collect();
    let mut rng = Xorshift64::new(seed);
    let mut perm = pooled.clone();
    Ok((0..n_permutations)
        .map(|_| {
            fisher_yates_shuffle(&mut perm, &mut rng);
            mean_diff(&perm, n1)
        })
        .collect())
}

/// Two-sample permutation test on the difference in means.
///
/// Group labels are shuffled `n_permutations` times; the p-value counts
/// shuffles whose mean difference is at least as extreme as the observed
/// one, with the +1 correction so p is never exactly zero.
pub fn permutation_test(
    a: &[f64],
    b: &[f64],
    alternative: Alternative,
    n_permutations: usize,
    seed: u64,
) -> Result<PermutationResult> {
    if a.len() < 2 || b.len() < 2 {
        return Err(AsterError::InsufficientData(
            "permutation_test: each group needs at least 2 observations".into(),
        ));
    }
    if a.iter().chain(b).any(|v| !v.is_finite()) {
        return Err(AsterError::NonNumericData(
            "permutation_test: data contains non-finite values".into(),
        ));
    }
    if n_permutations == 0 {
        return Err(AsterError::InvalidParameter(
            "permutation_test: n_permutations must be > 0".into(),
        ));
    }

    let n1 = a.len();
    let pooled: Vec<f64> = a.iter().chain(b).copied().collect();
    let observed = mean_diff(&pooled, n1);

    #[cfg(feature = "parallel")]
    let n_extreme: usize = (0..n_permutations)
        .into_par_iter()
        .filter(|&i| {
            let mut rng = Xorshift64::new(seed.wrapping_add(i as u64 * 97));
            let mut perm = pooled.clone();
            fisher_yates_shuffle(&mut perm, &mut rng);
            is_extreme(mean_diff(&perm, n1), observed, alternative)
        })
        .count();

    #[cfg(not(feature = "parallel"))]
    let n_extreme: usize = {
        let mut rng = Xorshift64::new(seed);
        let mut perm = pooled.clone();
        (0..n_permutations)
            .filter(|_| {
                fisher_yates_shuffle(&mut perm, &mut rng);
                is_extreme(mean_diff(&perm, n1), observed, alternative)
            })
            .count()
    };

    Ok(PermutationResult {
        observed,
        p_value: (n_extreme as f64 + 1.0) / (n_permutations as f64 + 1.0),
        n_permutations,
        alternative,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────
