//! Ranking utilities shared by the rank-based tests.
//!
//! [`rank`] assigns 1-based ranks with a choice of tie strategies;
//! [`tie_correction`] computes the Σ(t³ − t) term that corrects rank-test
//! variances for tied groups.

/// Strategy for handling tied values when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMethod {
    /// Tied values receive the average of their would-be ranks. This is the
    /// convention every rank test in this crate uses.
    Average,
    /// Tied values receive the minimum rank in the group.
    Min,
    /// Tied values receive the maximum rank in the group.
    Max,
    /// Tied values receive sequential ranks in input order.
    Ordinal,
    /// Tied values share a rank and the next distinct value follows
    /// immediately (1, 2, 2, 3, ...).
    Dense,
}

/// Assign 1-based ranks to `data` using the given [`RankMethod`].
///
/// Returns a vector of the same length as `data`, rank at position i
/// corresponding to `data[i]`. Empty input produces empty output.
pub fn rank(data: &[f64], method: RankMethod) -> Vec<f64> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    let mut group = 0usize;
    while i < n {
        // Find the end of the tie group in sorted order.
        let mut j = i + 1;
        while j < n && data[order[j]].total_cmp(&data[order[i]]).is_eq() {
            j += 1;
        }
        group += 1;

        match method {
            RankMethod::Ordinal => {
                for k in i..j {
                    ranks[order[k]] = (k + 1) as f64;
                }
            }
            _ => {
                // Would-be ranks in the group are (i+1)..=j.
                let rank_val = match method {
                    RankMethod::Average => (i + 1 + j) as f64 / 2.0,
                    RankMethod::Min => (i + 1) as f64,
                    RankMethod::Max => j as f64,
                    RankMethod::Dense => group as f64,
                    RankMethod::Ordinal => unreachable!(),
                };
                for k in i..j {
                    ranks[order[k]] = rank_val;
                }
            }
        }

        i = j;
    }

    ranks
}

/// Tie correction term Σ(t³ − t) over all tie groups of a sample.
///
/// Zero when no value repeats. Mann-Whitney, Kruskal-Wallis and Spearman all
/// subtract a multiple of this from their null variance.
pub fn tie_correction(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut sum = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j].total_cmp(&sorted[i]).is_eq() {
            j += 1;
        }
        let t = (j - i) as f64;
        sum += t * t * t - t;
        i = j;
    }
    sum
}

// ── Tests ──────────────────────────────────────────────────────────────────
