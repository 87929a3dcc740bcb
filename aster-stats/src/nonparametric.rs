//! Rank-based tests that drop the normality assumption.
//!
//! Mann-Whitney U for two independent samples, Wilcoxon signed-rank for
//! paired samples, and Kruskal-Wallis for k groups. All three use the
//! normal (or chi-square) approximation with tie-corrected variances, so
//! they are intended for the sample sizes where that approximation holds
//! (roughly n >= 8 per group; smaller samples still compute but the
//! p-values grow conservative).

use aster_core::{AsterError, Result, Scored, Summarizable};

use crate::descriptive::median;
use crate::distribution::{norm_cdf, ChiSquared};
use crate::rank::{rank, tie_correction, RankMethod};

fn require_finite(name: &str, data: &[f64]) -> Result<()> {
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AsterError::NonNumericData(format!(
            "{}: data contains non-finite values",
            name,
        )));
    }
    Ok(())
}

fn z_two_tailed(z: f64) -> f64 {
    (2.0 * (1.0 - norm_cdf(z.abs()))).clamp(0.0, 1.0)
}

// ── Mann-Whitney U ─────────────────────────────────────────────────────────

/// Result of the Mann-Whitney U test.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MannWhitneyResult {
    /// U statistic for the first sample.
    pub u_statistic: f64,
    /// Normal-approximation z score.
    pub z: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// Rank-biserial correlation, in [-1, 1]; positive when the first
    /// sample tends to be larger.
    pub effect_size: f64,
    /// Median of the first sample.
    pub median_x: f64,
    /// Median of the second sample.
    pub median_y: f64,
}

impl Scored for MannWhitneyResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for MannWhitneyResult {
    fn summary(&self) -> String {
        format!(
            "Mann-Whitney U: U={:.1}, z={:.4}, p={:.6}, r={:.3}",
            self.u_statistic, self.z, self.p_value, self.effect_size,
        )
    }
}

/// Mann-Whitney U test (Wilcoxon rank-sum) for two independent samples.
///
/// U₁ = R₁ − n₁(n₁+1)/2 from tie-averaged ranks of the pooled sample; the
/// z score uses the tie-corrected null variance. Each sample needs at
/// least 2 observations and the pooled sample must not be constant.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<MannWhitneyResult> {
    if x.len() < 2 || y.len() < 2 {
        return Err(AsterError::InsufficientData(
            "mann_whitney_u: each sample needs at least 2 observations".into(),
        ));
    }
    require_finite("mann_whitney_u", x)?;
    require_finite("mann_whitney_u", y)?;

    let nx = x.len() as f64;
    let ny = y.len() as f64;
    let n = nx + ny;

    let mut combined: Vec<f64> = Vec::with_capacity(x.len() + y.len());
    combined.extend_from_slice(x);
    combined.extend_from_slice(y);
    let ranks = rank(&combined, RankMethod::Average);

    let r1: f64 = ranks[..x.len()].iter().sum();
    let u1 = r1 - nx * (nx + 1.0) / 2.0;

    let mu = nx * ny / 2.0;
    let ties = tie_correction(&combined);
    let sigma_sq = nx * ny / 12.0 * (n + 1.0 - ties / (n * (n - 1.0)));
    if sigma_sq <= 0.0 {
        return Err(AsterError::InsufficientData(
            "mann_whitney_u: pooled sample is constant".into(),
        ));
    }

    let z = (u1 - mu) / sigma_sq.sqrt();

    Ok(MannWhitneyResult {
        u_statistic: u1,
        z,
        p_value: z_two_tailed(z),
        effect_size: 2.0 * u1 / (nx * ny) - 1.0,
        median_x: median(x)?,
        median_y: median(y)?,
    })
}

// ── Wilcoxon signed-rank ───────────────────────────────────────────────────

/// Result of the Wilcoxon signed-rank test.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WilcoxonResult {
    /// T⁺, the sum of ranks with positive differences.
    pub t_plus: f64,
    /// Normal-approximation z score.
    pub z: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// Number of non-zero differences actually ranked.
    pub n_used: usize,
    /// Effect size r = |z| / √n over the used pairs.
    pub effect_size: f64,
}

impl Scored for WilcoxonResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for WilcoxonResult {
    fn summary(&self) -> String {
        format!(
            "Wilcoxon signed-rank: T+={:.1}, z={:.4}, p={:.6} (n={})",
            self.t_plus, self.z, self.p_value, self.n_used,
        )
    }
}

/// Wilcoxon signed-rank test on paired samples.
///
/// Differences of zero are discarded before ranking |d|; the tie-corrected
/// normal approximation produces the p-value. Needs equal-length inputs and
/// at least 2 non-zero differences.
pub fn wilcoxon_signed_rank(before: &[f64], after: &[f64]) -> Result<WilcoxonResult> {
    if before.len() != after.len() {
        return Err(AsterError::MismatchedLengths {
            left: before.len(),
            right: after.len(),
        });
    }
    require_finite("wilcoxon_signed_rank", before)?;
    require_finite("wilcoxon_signed_rank", after)?;

    let diffs: Vec<f64> = before
        .iter()
        .zip(after)
        .map(|(&b, &a)| a - b)
        .filter(|d| d.abs() > 1e-300)
        .collect();

    let n_used = diffs.len();
    if n_used < 2 {
        return Err(AsterError::InsufficientData(
            "wilcoxon_signed_rank: need at least 2 non-zero differences".into(),
        ));
    }
    let nf = n_used as f64;

    let abs_diffs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let ranks = rank(&abs_diffs, RankMethod::Average);

    let t_plus: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(&d, _)| d > 0.0)
        .map(|(_, &r)| r)
        .sum();

    let mu = nf * (nf + 1.0) / 4.0;
    let ties = tie_correction(&abs_diffs);
    let sigma_sq = nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - ties / 48.0;
    if sigma_sq <= 0.0 {
        return Err(AsterError::InsufficientData(
            "wilcoxon_signed_rank: degenerate rank variance".into(),
        ));
    }

    let z = (t_plus - mu) / sigma_sq.sqrt();

    Ok(WilcoxonResult {
        t_plus,
        z,
        p_value: z_two_tailed(z),
        n_used,
        effect_size: z.abs() / nf.sqrt(),
    })
}

// ── Kruskal-Wallis ─────────────────────────────────────────────────────────

/// Result of the Kruskal-Wallis test.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KruskalWallisResult {
    /// The tie-corrected H statistic, chi-square distributed under H₀.
    pub h_statistic: f64,
    pub p_value: f64,
    pub df: f64,
    /// Epsilon-squared effect size, in [0, 1].
    pub effect_size: f64,
    /// Mean rank of each group in input order.
    pub mean_ranks: Vec<f64>,
}

impl Scored for KruskalWallisResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for KruskalWallisResult {
    fn summary(&self) -> String {
        format!(
            "Kruskal-Wallis: H({:.0})={:.4}, p={:.6}, eps²={:.3}",
            self.df, self.h_statistic, self.p_value, self.effect_size,
        )
    }
}

/// Kruskal-Wallis rank test across k >= 2 groups.
///
/// H = 12/(N(N+1)) Σ nᵢ(R̄ᵢ − R̄)², divided by the tie correction factor,
/// referred to χ²(k−1). Each group needs at least 2 observations.
pub fn kruskal_wallis(groups: &[&[f64]]) -> Result<KruskalWallisResult> {
    let k = groups.len();
    if k < 2 {
        return Err(AsterError::InsufficientData(
            "kruskal_wallis: need at least 2 groups".into(),
        ));
    }
    for (i, g) in groups.iter().enumerate() {
        if g.len() < 2 {
            return Err(AsterError::InsufficientData(format!(
                "kruskal_wallis: group {} needs at least 2 observations",
                i,
            )));
        }
        require_finite("kruskal_wallis", g)?;
    }

    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    let nf = n_total as f64;

    let mut combined: Vec<f64> = Vec::with_capacity(n_total);
    for g in groups {
        combined.extend_from_slice(g);
    }
    let ranks = rank(&combined, RankMethod::Average);

    // Mean rank per group; ranks are laid out in group order.
    let mut mean_ranks = Vec::with_capacity(k);
    let mut offset = 0;
    for g in groups {
        let sum: f64 = ranks[offset..offset + g.len()].iter().sum();
        mean_ranks.push(sum / g.len() as f64);
        offset += g.len();
    }

    let grand_mean_rank = (nf + 1.0) / 2.0;
    let mut h = 0.0;
    for (g, &mr) in groups.iter().zip(&mean_ranks) {
        h += g.len() as f64 * (mr - grand_mean_rank).powi(2);
    }
    h *= 12.0 / (nf * (nf + 1.0));

    let ties = tie_correction(&combined);
    let denom = 1.0 - ties / (nf * nf * nf - nf);
    if denom <= 1e-15 {
        return Err(AsterError::InsufficientData(
            "kruskal_wallis: all observations identical".into(),
        ));
    }
    h /= denom;

    let df = (k - 1) as f64;
    let p_value = ChiSquared::new(df)?.sf(h);
    let effect_size = ((h - df) / (nf - k as f64)).clamp(0.0, 1.0);

    Ok(KruskalWallisResult {
        h_statistic: h,
        p_value,
        df,
        effect_size,
        mean_ranks,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────
