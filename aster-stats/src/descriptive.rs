//! Descriptive statistics for numeric samples.
//!
//! Provides individual functions ([`mean`], [`median`], [`variance`], etc.),
//! the aggregate [`describe`] function, and outlier detection. Samples may
//! contain nulls: [`clean`] splits a nullable column into its valid values
//! and a null count, and [`describe_nullable`] carries that count through.

use aster_core::{AsterError, Result, Summarizable};

/// Aggregate descriptive statistics for one sample.
///
/// `count + null_count` always equals the length of the original column.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptiveStats {
    /// Number of valid (non-null, finite) observations.
    pub count: usize,
    /// Number of excluded observations (null or NaN).
    pub null_count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (second quartile).
    pub median: f64,
    /// Most frequent value(s); empty when all frequencies are equal.
    pub modes: Vec<f64>,
    /// Sample variance (divisor n-1); 0 when n <= 1.
    pub variance: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Range (max - min).
    pub range: f64,
    /// First quartile (median of the lower half).
    pub q1: f64,
    /// Third quartile (median of the upper half).
    pub q3: f64,
    /// Interquartile range (q3 - q1).
    pub iqr: f64,
    /// Skewness (third standardized moment, population formula).
    pub skewness: f64,
    /// Excess kurtosis (fourth standardized moment minus 3).
    pub kurtosis: f64,
}

impl Summarizable for DescriptiveStats {
    fn summary(&self) -> String {
        format!(
            "n={} (nulls={}), mean={:.4}, sd={:.4}, median={:.4}, min={:.4}, max={:.4}",
            self.count, self.null_count, self.mean, self.std_dev, self.median, self.min, self.max,
        )
    }
}

/// Split a nullable column into its valid values and the excluded count.
///
/// `None` and non-finite entries both count as nulls.
pub fn clean(values: &[Option<f64>]) -> (Vec<f64>, usize) {
    let mut valid = Vec::with_capacity(values.len());
    for v in values {
        match v {
            Some(x) if x.is_finite() => valid.push(*x),
            _ => {}
        }
    }
    let null_count = values.len() - valid.len();
    (valid, null_count)
}

/// Compute all descriptive statistics for a fully-valid sample.
///
/// Requires at least 1 observation. Ratio-based fields degrade to 0 or NaN
/// for degenerate samples rather than erroring; callers should check `count`
/// before trusting them.
pub fn describe(data: &[f64]) -> Result<DescriptiveStats> {
    describe_with_nulls(data, 0)
}

/// Compute all descriptive statistics for a nullable column.
///
/// Nulls are excluded from every computation but reported in `null_count`.
pub fn describe_nullable(values: &[Option<f64>]) -> Result<DescriptiveStats> {
    let (valid, null_count) = clean(values);
    describe_with_nulls(&valid, null_count)
}

fn describe_with_nulls(data: &[f64], null_count: usize) -> Result<DescriptiveStats> {
    let n = data.len();
    if n == 0 {
        return Err(AsterError::InsufficientData(
            "describe: no valid observations".into(),
        ));
    }
    let n_f = n as f64;

    // First pass: mean, min, max.
    let mut sum = 0.0;
    let mut min_val = f64::INFINITY;
    let mut max_val = f64::NEG_INFINITY;
    for &x in data {
        sum += x;
        if x < min_val {
            min_val = x;
        }
        if x > max_val {
            max_val = x;
        }
    }
    let mean_val = sum / n_f;

    // Second pass: central moments.
    let mut m2 = 0.0;
    let mut m3 = 0.0;
    let mut m4 = 0.0;
    for &x in data {
        let d = x - mean_val;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }

    let sample_var = if n > 1 { m2 / (n_f - 1.0) } else { 0.0 };
    let pop_var = m2 / n_f;
    let pop_std = pop_var.sqrt();

    let skewness = if pop_std > 0.0 {
        (m3 / n_f) / (pop_std * pop_std * pop_std)
    } else {
        0.0
    };
    let kurtosis = if pop_var > 0.0 {
        (m4 / n_f) / (pop_var * pop_var) - 3.0
    } else {
        0.0
    };

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let (q1, q2, q3) = quartiles_sorted(&sorted);

    Ok(DescriptiveStats {
        count: n,
        null_count,
        mean: mean_val,
        median: q2,
        modes: modes_sorted(&sorted),
        variance: sample_var,
        std_dev: sample_var.sqrt(),
        min: min_val,
        max: max_val,
        range: max_val - min_val,
        q1,
        q3,
        iqr: q3 - q1,
        skewness,
        kurtosis,
    })
}

// ── Individual functions ───────────────────────────────────────────────────

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(AsterError::InsufficientData(
            "mean: data must not be empty".into(),
        ));
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Median (second quartile).
pub fn median(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(AsterError::InsufficientData(
            "median: data must not be empty".into(),
        ));
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(median_sorted(&sorted))
}

/// Variance with given degrees-of-freedom correction.
///
/// - `ddof = 0` — population variance
/// - `ddof = 1` — sample variance (Bessel's correction)
pub fn variance(data: &[f64], ddof: usize) -> Result<f64> {
    let n = data.len();
    if n <= ddof {
        return Err(AsterError::InsufficientData(format!(
            "variance: need more than {} observations (got {})",
            ddof, n,
        )));
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|&x| (x - m).powi(2)).sum();
    Ok(ss / (n - ddof) as f64)
}

/// Standard deviation with given degrees-of-freedom correction.
pub fn std_dev(data: &[f64], ddof: usize) -> Result<f64> {
    Ok(variance(data, ddof)?.sqrt())
}

/// Standard error of the mean (sample sd / sqrt(n)).
pub fn standard_error(data: &[f64]) -> Result<f64> {
    Ok(std_dev(data, 1)? / (data.len() as f64).sqrt())
}

/// Geometric mean, computed in log space. All values must be positive.
pub fn geometric_mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(AsterError::InsufficientData(
            "geometric_mean: data must not be empty".into(),
        ));
    }
    if data.iter().any(|&x| x <= 0.0 || !x.is_finite()) {
        return Err(AsterError::InvalidParameter(
            "geometric_mean: all values must be positive and finite".into(),
        ));
    }
    let log_sum: f64 = data.iter().map(|&x| x.ln()).sum();
    Ok((log_sum / data.len() as f64).exp())
}

/// Coefficient of variation (sample sd / mean). Errors when the mean is
/// zero.
pub fn coefficient_of_variation(data: &[f64]) -> Result<f64> {
    let m = mean(data)?;
    if m.abs() < 1e-300 {
        return Err(AsterError::InvalidParameter(
            "coefficient_of_variation: mean is zero".into(),
        ));
    }
    Ok(std_dev(data, 1)? / m)
}

/// Quantile via linear interpolation between closest ranks (type-7).
///
/// For `1..=100` at `q = 0.25` this yields 25.75. `q` must be in [0, 1].
pub fn quantile(data: &[f64], q: f64) -> Result<f64> {
    if data.is_empty() {
        return Err(AsterError::InsufficientData(
            "quantile: data must not be empty".into(),
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(AsterError::InvalidParameter(
            "quantile: q must be in [0, 1]".into(),
        ));
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(quantile_sorted(&sorted, q))
}

/// Quartiles by the median-of-halves rule.
///
/// The sample is split at the median (which is excluded from either half for
/// odd n); Q1 and Q3 are the medians of the halves. For `1..=10` this yields
/// (3, 5.5, 8).
pub fn quartiles(data: &[f64]) -> Result<(f64, f64, f64)> {
    if data.is_empty() {
        return Err(AsterError::InsufficientData(
            "quartiles: data must not be empty".into(),
        ));
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(quartiles_sorted(&sorted))
}

/// Interquartile range (Q3 - Q1, median-of-halves quartiles).
pub fn iqr(data: &[f64]) -> Result<f64> {
    let (q1, _, q3) = quartiles(data)?;
    Ok(q3 - q1)
}

/// Median absolute deviation (raw, without the normal-consistency constant).
pub fn mad(data: &[f64]) -> Result<f64> {
    let med = median(data)?;
    let deviations: Vec<f64> = data.iter().map(|&x| (x - med).abs()).collect();
    median(&deviations)
}

/// Most frequent value(s).
///
/// Returns the empty vector when every value occurs equally often (no
/// meaningful mode), otherwise all values tied for the maximum frequency,
/// in ascending order.
pub fn mode(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    modes_sorted(&sorted)
}

// ── Outlier detection ──────────────────────────────────────────────────────

/// Outlier detection strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlierMethod {
    /// Values outside [Q1 - k·IQR, Q3 + k·IQR]. The conventional fence uses
    /// k = 1.5.
    IqrFence { k: f64 },
    /// Values whose |z| = |x - mean| / sd exceeds the threshold.
    ZScore { threshold: f64 },
    /// Values whose modified z-score 0.6745·|x - median| / MAD exceeds the
    /// threshold; robust to the outliers themselves.
    ModifiedZScore { threshold: f64 },
}

impl Default for OutlierMethod {
    fn default() -> Self {
        OutlierMethod::IqrFence { k: 1.5 }
    }
}

/// Outliers found in a sample, with the fences that flagged them.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlierReport {
    /// Indices of flagged observations in the input order.
    pub indices: Vec<usize>,
    /// The flagged values themselves.
    pub values: Vec<f64>,
    /// Lower cutoff used by the method.
    pub lower_fence: f64,
    /// Upper cutoff used by the method.
    pub upper_fence: f64,
}

/// Detect outliers with the given method.
pub fn outliers(data: &[f64], method: OutlierMethod) -> Result<OutlierReport> {
    if data.is_empty() {
        return Err(AsterError::InsufficientData(
            "outliers: data must not be empty".into(),
        ));
    }

    let (lower, upper) = match method {
        OutlierMethod::IqrFence { k } => {
            if k <= 0.0 {
                return Err(AsterError::InvalidParameter(
                    "outliers: IQR fence multiplier must be positive".into(),
                ));
            }
            let (q1, _, q3) = quartiles(data)?;
            let spread = q3 - q1;
            (q1 - k * spread, q3 + k * spread)
        }
        OutlierMethod::ZScore { threshold } => {
            if threshold <= 0.0 {
                return Err(AsterError::InvalidParameter(
                    "outliers: z-score threshold must be positive".into(),
                ));
            }
            let m = mean(data)?;
            let sd = if data.len() > 1 { std_dev(data, 1)? } else { 0.0 };
            (m - threshold * sd, m + threshold * sd)
        }
        OutlierMethod::ModifiedZScore { threshold } => {
            if threshold <= 0.0 {
                return Err(AsterError::InvalidParameter(
                    "outliers: modified z-score threshold must be positive".into(),
                ));
            }
            let med = median(data)?;
            let mad_val = mad(data)?;
            // 0.6745 makes the MAD consistent with the normal sd.
            let scale = if mad_val > 0.0 { mad_val / 0.6745 } else { 0.0 };
            (med - threshold * scale, med + threshold * scale)
        }
    };

    let mut indices = Vec::new();
    let mut values = Vec::new();
    for (i, &x) in data.iter().enumerate() {
        if x < lower || x > upper {
            indices.push(i);
            values.push(x);
        }
    }

    Ok(OutlierReport {
        indices,
        values,
        lower_fence: lower,
        upper_fence: upper,
    })
}

// ── Internal ───────────────────────────────────────────────────────────────

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn quartiles_sorted(sorted: &[f64]) -> (f64, f64, f64) {
    let n = sorted.len();
    if n == 1 {
        return (sorted[0], sorted[0], sorted[0]);
    }
    let q2 = median_sorted(sorted);
    // Median excluded from both halves when n is odd.
    let lower = &sorted[..n / 2];
    let upper = &sorted[n.div_ceil(2)..];
    (median_sorted(lower), q2, median_sorted(upper))
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    if lo + 1 >= n {
        sorted[n - 1]
    } else {
        sorted[lo] * (1.0 - frac) + sorted[lo + 1] * frac
    }
}

fn modes_sorted(sorted: &[f64]) -> Vec<f64> {
    if sorted.is_empty() {
        return Vec::new();
    }

    // Run-length encode the sorted values.
    let mut runs: Vec<(f64, usize)> = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j].total_cmp(&sorted[i]).is_eq() {
            j += 1;
        }
        runs.push((sorted[i], j - i));
        i = j;
    }

    let max_freq = runs.iter().map(|&(_, c)| c).max().unwrap_or(0);
    let min_freq = runs.iter().map(|&(_, c)| c).min().unwrap_or(0);
    if max_freq == min_freq {
        // Every value equally frequent: no meaningful mode.
        return Vec::new();
    }
    runs.into_iter()
        .filter(|&(_, c)| c == max_freq)
        .map(|(v, _)| v)
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────
