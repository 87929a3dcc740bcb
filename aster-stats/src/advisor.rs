//! Rule-based test selection.
//!
//! Given variable profiles (inferred type and usable sample size) and a
//! little study context, [`suggest`] returns a ranked list of candidate
//! tests with the reasoning and assumptions attached. The rules follow the
//! usual decision tree: t-family and ANOVA for numeric comparisons,
//! chi-square for categorical pairs, with rank-based alternatives promoted
//! when samples are too small to lean on normality.

use aster_core::{AsterError, Result, Scored};

use crate::correlation::{pearson_test, spearman_test, CorrelationResult};
use crate::nonparametric::{
    kruskal_wallis, mann_whitney_u, wilcoxon_signed_rank, KruskalWallisResult, MannWhitneyResult,
    WilcoxonResult,
};
use crate::normality::{assess, NormalityReport};
use crate::regression::{simple_linear, SimpleRegression};
use crate::testing::{
    anova_one_way, chi_square_independence, fisher_exact, t_test_one_sample, t_test_paired,
    t_test_two_sample, AnovaResult, ChiSquareResult, ContingencyTable, TTestResult,
    VariancePolicy,
};

/// Inferred measurement type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    Numeric,
    Categorical,
}

/// Classify raw values: numeric when more than 80% of the non-null entries
/// parse as finite floats, otherwise categorical. All-null input is
/// categorical.
pub fn infer_type<S: AsRef<str>>(values: &[Option<S>]) -> DataType {
    let mut non_null = 0usize;
    let mut numeric = 0usize;
    for v in values.iter().flatten() {
        non_null += 1;
        if v.as_ref().trim().parse::<f64>().map(|x| x.is_finite()).unwrap_or(false) {
            numeric += 1;
        }
    }
    if non_null > 0 && numeric as f64 / non_null as f64 > 0.8 {
        DataType::Numeric
    } else {
        DataType::Categorical
    }
}

/// One variable as the advisor sees it.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableProfile {
    pub name: String,
    pub data_type: DataType,
    /// Valid (non-null) observation count.
    pub sample_size: usize,
}

impl VariableProfile {
    pub fn new(name: impl Into<String>, data_type: DataType, sample_size: usize) -> Self {
        Self {
            name: name.into(),
            data_type,
            sample_size,
        }
    }
}

/// Study context the profiles alone cannot express.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuggestOptions {
    /// Number of groups when the design is a k-group comparison.
    pub n_groups: Option<usize>,
    /// Measurements are paired (before/after on the same units).
    pub paired: bool,
    /// Per-group size below which rank-based tests are preferred.
    pub small_sample_threshold: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            n_groups: None,
            paired: false,
            small_sample_threshold: 30,
        }
    }
}

/// The tests the advisor can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TestKind {
    OneSampleT,
    PairedT,
    TwoSampleT,
    OneWayAnova,
    ChiSquareIndependence,
    FisherExact,
    PearsonCorrelation,
    SpearmanCorrelation,
    SimpleRegression,
    MannWhitneyU,
    WilcoxonSignedRank,
    KruskalWallis,
    NormalityCheck,
}

impl TestKind {
    pub fn name(&self) -> &'static str {
        match self {
            TestKind::OneSampleT => "one-sample t-test",
            TestKind::PairedT => "paired t-test",
            TestKind::TwoSampleT => "independent two-sample t-test",
            TestKind::OneWayAnova => "one-way ANOVA",
            TestKind::ChiSquareIndependence => "chi-square test of independence",
            TestKind::FisherExact => "Fisher's exact test",
            TestKind::PearsonCorrelation => "Pearson correlation",
            TestKind::SpearmanCorrelation => "Spearman rank correlation",
            TestKind::SimpleRegression => "simple linear regression",
            TestKind::MannWhitneyU => "Mann-Whitney U test",
            TestKind::WilcoxonSignedRank => "Wilcoxon signed-rank test",
            TestKind::KruskalWallis => "Kruskal-Wallis test",
            TestKind::NormalityCheck => "normality assessment",
        }
    }
}

/// A ranked recommendation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestSuggestion {
    pub kind: TestKind,
    pub reason: String,
    /// Assumptions the caller should verify before trusting the test.
    pub assumptions: Vec<String>,
    /// Relative confidence in (0, 1].
    pub confidence: f64,
}

impl Scored for TestSuggestion {
    fn score(&self) -> f64 {
        self.confidence
    }
}

const NORMALITY: &str = "approximate normality of the measurements";
const INDEPENDENCE: &str = "independent observations";
const EQUAL_VARIANCE: &str = "similar variance across groups";
const LINEARITY: &str = "linear relationship between the variables";
const EXPECTED_COUNTS: &str = "expected cell counts of at least 5";

fn push(
    out: &mut Vec<TestSuggestion>,
    kind: TestKind,
    reason: impl Into<String>,
    assumptions: &[&str],
    confidence: f64,
) {
    out.push(TestSuggestion {
        kind,
        reason: reason.into(),
        assumptions: assumptions.iter().map(|s| s.to_string()).collect(),
        confidence,
    });
}

/// Recommend tests for the given variables, ranked by descending
/// confidence.
pub fn suggest(variables: &[VariableProfile], options: SuggestOptions) -> Result<Vec<TestSuggestion>> {
    let numeric: Vec<&VariableProfile> = variables
        .iter()
        .filter(|v| v.data_type == DataType::Numeric)
        .collect();
    let categorical: Vec<&VariableProfile> = variables
        .iter()
        .filter(|v| v.data_type == DataType::Categorical)
        .collect();

    let min_n = variables.iter().map(|v| v.sample_size).min().unwrap_or(0);
    let small = min_n < options.small_sample_threshold;

    let mut out = Vec::new();

    if let Some(k) = options.n_groups {
        if k >= 3 && !numeric.is_empty() {
            push(
                &mut out,
                TestKind::OneWayAnova,
                format!("comparing means across {} groups", k),
                &[NORMALITY, INDEPENDENCE, EQUAL_VARIANCE],
                if small { 0.6 } else { 0.85 },
            );
            push(
                &mut out,
                TestKind::KruskalWallis,
                "rank-based alternative to ANOVA, no normality requirement",
                &[INDEPENDENCE],
                if small { 0.8 } else { 0.6 },
            );
        }
    }

    match numeric.len() {
        1 if categorical.is_empty() => {
            push(
                &mut out,
                TestKind::OneSampleT,
                format!("testing the mean of '{}' against a reference value", numeric[0].name),
                &[NORMALITY, INDEPENDENCE],
                if small { 0.55 } else { 0.8 },
            );
            push(
                &mut out,
                TestKind::NormalityCheck,
                "establishes whether parametric tests are appropriate",
                &[],
                0.7,
            );
            push(
                &mut out,
                TestKind::WilcoxonSignedRank,
                "tests the median against a reference value, no normality requirement",
                &[INDEPENDENCE],
                if small { 0.75 } else { 0.6 },
            );
        }
        n if n >= 2 => {
            if options.paired {
                push(
                    &mut out,
                    TestKind::PairedT,
                    "paired measurements, test the mean within-pair difference",
                    &["approximate normality of the pair differences", INDEPENDENCE],
                    if small { 0.55 } else { 0.85 },
                );
                push(
                    &mut out,
                    TestKind::WilcoxonSignedRank,
                    "rank-based alternative to the paired t-test, no normality requirement",
                    &[INDEPENDENCE],
                    if small { 0.8 } else { 0.6 },
                );
            } else {
                push(
                    &mut out,
                    TestKind::TwoSampleT,
                    "comparing the means of two numeric variables",
                    &[NORMALITY, INDEPENDENCE, EQUAL_VARIANCE],
                    if small { 0.55 } else { 0.85 },
                );
                push(
                    &mut out,
                    TestKind::MannWhitneyU,
                    "rank-based alternative to the t-test, no normality requirement",
                    &[INDEPENDENCE],
                    if small { 0.8 } else { 0.6 },
                );
            }
            push(
                &mut out,
                TestKind::PearsonCorrelation,
                "measures the linear association between the variables",
                &[LINEARITY, NORMALITY],
                if small { 0.5 } else { 0.75 },
            );
            push(
                &mut out,
                TestKind::SpearmanCorrelation,
                "monotonic association without the normality requirement",
                &[INDEPENDENCE],
                if small { 0.65 } else { 0.55 },
            );
            push(
                &mut out,
                TestKind::SimpleRegression,
                "models one variable as a linear function of the other",
                &[LINEARITY, "homoscedastic residuals", INDEPENDENCE],
                0.7,
            );
        }
        _ => {}
    }

    if categorical.len() >= 2 {
        push(
            &mut out,
            TestKind::ChiSquareIndependence,
            "testing association between two categorical variables",
            &[INDEPENDENCE, EXPECTED_COUNTS],
            0.9,
        );
        if small {
            push(
                &mut out,
                TestKind::FisherExact,
                "small counts, exact inference for a 2x2 table",
                &[INDEPENDENCE],
                0.85,
            );
        }
    }

    out.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(out)
}

// ── Dispatch ───────────────────────────────────────────────────────────────

/// Data shapes [`run`] accepts.
#[derive(Debug, Clone, Copy)]
pub enum TestInput<'a> {
    /// One sample plus a reference value (ignored by the normality check).
    OneSample { data: &'a [f64], mu: f64 },
    TwoSample { x: &'a [f64], y: &'a [f64] },
    Paired { before: &'a [f64], after: &'a [f64] },
    Groups { groups: &'a [&'a [f64]] },
    Table { table: &'a ContingencyTable },
    Fourfold { counts: &'a [[usize; 2]; 2] },
}

impl TestInput<'_> {
    fn shape_name(&self) -> &'static str {
        match self {
            TestInput::OneSample { .. } => "one sample",
            TestInput::TwoSample { .. } => "two samples",
            TestInput::Paired { .. } => "paired samples",
            TestInput::Groups { .. } => "grouped samples",
            TestInput::Table { .. } => "contingency table",
            TestInput::Fourfold { .. } => "2x2 counts",
        }
    }
}

/// Result of running a suggested test.
#[derive(Debug, Clone)]
pub enum TestOutcome {
    TTest(TTestResult),
    Anova(AnovaResult),
    ChiSquare(ChiSquareResult),
    Correlation(CorrelationResult),
    Regression(SimpleRegression),
    MannWhitney(MannWhitneyResult),
    Wilcoxon(WilcoxonResult),
    KruskalWallis(KruskalWallisResult),
    Normality(NormalityReport),
}

/// Execute `kind` against `input`. A kind that cannot run on the given
/// input shape is an `UnsupportedConfiguration` error.
pub fn run(kind: TestKind, input: TestInput<'_>, alpha: f64) -> Result<TestOutcome> {
    match (kind, input) {
        (TestKind::OneSampleT, TestInput::OneSample { data, mu }) => {
            Ok(TestOutcome::TTest(t_test_one_sample(data, mu, alpha)?))
        }
        (TestKind::NormalityCheck, TestInput::OneSample { data, .. }) => {
            Ok(TestOutcome::Normality(assess(data, alpha)?))
        }
        (TestKind::PairedT, TestInput::Paired { before, after }) => {
            Ok(TestOutcome::TTest(t_test_paired(before, after, alpha)?))
        }
        (TestKind::WilcoxonSignedRank, TestInput::Paired { before, after }) => {
            Ok(TestOutcome::Wilcoxon(wilcoxon_signed_rank(before, after)?))
        }
        (TestKind::TwoSampleT, TestInput::TwoSample { x, y }) => Ok(TestOutcome::TTest(
            t_test_two_sample(x, y, VariancePolicy::Auto, alpha)?,
        )),
        (TestKind::MannWhitneyU, TestInput::TwoSample { x, y }) => {
            Ok(TestOutcome::MannWhitney(mann_whitney_u(x, y)?))
        }
        (TestKind::PearsonCorrelation, TestInput::TwoSample { x, y }) => {
            Ok(TestOutcome::Correlation(pearson_test(x, y, alpha)?))
        }
        (TestKind::SpearmanCorrelation, TestInput::TwoSample { x, y }) => {
            Ok(TestOutcome::Correlation(spearman_test(x, y, alpha)?))
        }
        (TestKind::SimpleRegression, TestInput::TwoSample { x, y }) => {
            Ok(TestOutcome::Regression(simple_linear(x, y, alpha)?))
        }
        (TestKind::OneWayAnova, TestInput::Groups { groups }) => {
            Ok(TestOutcome::Anova(anova_one_way(groups, alpha)?))
        }
        (TestKind::KruskalWallis, TestInput::Groups { groups }) => {
            Ok(TestOutcome::KruskalWallis(kruskal_wallis(groups)?))
        }
        (TestKind::ChiSquareIndependence, TestInput::Table { table }) => {
            Ok(TestOutcome::ChiSquare(chi_square_independence(table, false)?))
        }
        (TestKind::FisherExact, TestInput::Fourfold { counts }) => {
            Ok(TestOutcome::ChiSquare(fisher_exact(counts)?))
        }
        (kind, input) => Err(AsterError::UnsupportedConfiguration(format!(
            "cannot run {} on {}",
            kind.name(),
            input.shape_name(),
        ))),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(name: &str, n: usize) -> VariableProfile {
        VariableProfile::new(name, DataType::Numeric, n)
    }

    fn categorical(name: &str, n: usize) -> VariableProfile {
        VariableProfile::new(name, DataType::Categorical, n)
    }

    fn kinds(suggestions: &[TestSuggestion]) -> Vec<TestKind> {
        suggestions.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn infer_type_numeric_majority() {
        let values: Vec<Option<&str>> = vec![
            Some("1.5"),
            Some("2"),
            Some("3.7"),
            Some("-4"),
            Some("oops"),
            None,
        ];
        // 4 of 5 non-null parse: 80% is not strictly greater than 80%.
        assert_eq!(infer_type(&values), DataType::Categorical);
        let values: Vec<Option<&str>> =
            vec![Some("1"), Some("2"), Some("3"), Some("4"), Some("x"), Some("5")];
        assert_eq!(infer_type(&values), DataType::Numeric);
    }

    #[test]
    fn infer_type_labels() {
        let values: Vec<Option<&str>> = vec![Some("red"), Some("green"), Some("blue"), None];
        assert_eq!(infer_type(&values), DataType::Categorical);
    }

    #[test]
    fn infer_type_all_null_is_categorical() {
        let values: Vec<Option<&str>> = vec![None, None];
        assert_eq!(infer_type(&values), DataType::Categorical);
    }

    #[test]
    fn infer_type_rejects_non_finite_tokens() {
        let values: Vec<Option<&str>> = vec![Some("inf"), Some("NaN"), Some("inf")];
        assert_eq!(infer_type(&values), DataType::Categorical);
    }

    #[test]
    fn single_numeric_large_sample() {
        let s = suggest(&[numeric("score", 100)], SuggestOptions::default()).unwrap();
        let k = kinds(&s);
        assert_eq!(k[0], TestKind::OneSampleT);
        assert!(k.contains(&TestKind::NormalityCheck));
        // The rank alternative is still offered, just with less confidence.
        let wilcoxon = s.iter().find(|t| t.kind == TestKind::WilcoxonSignedRank).unwrap();
        let t_test = s.iter().find(|t| t.kind == TestKind::OneSampleT).unwrap();
        assert!(wilcoxon.confidence < t_test.confidence);
    }

    #[test]
    fn single_numeric_small_sample_prefers_ranks() {
        let s = suggest(&[numeric("score", 12)], SuggestOptions::default()).unwrap();
        let k = kinds(&s);
        let wilcoxon = k.iter().position(|&t| t == TestKind::WilcoxonSignedRank).unwrap();
        let t_test = k.iter().position(|&t| t == TestKind::OneSampleT).unwrap();
        assert!(wilcoxon < t_test, "rank test should outrank t at n=12");
    }

    #[test]
    fn two_numeric_unpaired() {
        let s = suggest(
            &[numeric("a", 60), numeric("b", 60)],
            SuggestOptions::default(),
        )
        .unwrap();
        let k = kinds(&s);
        assert_eq!(k[0], TestKind::TwoSampleT);
        assert!(k.contains(&TestKind::PearsonCorrelation));
        assert!(k.contains(&TestKind::SimpleRegression));
        assert!(!k.contains(&TestKind::PairedT));
        let mw = s.iter().find(|t| t.kind == TestKind::MannWhitneyU).unwrap();
        let t = s.iter().find(|t| t.kind == TestKind::TwoSampleT).unwrap();
        assert!(mw.confidence < t.confidence);
    }

    #[test]
    fn two_numeric_paired_flag() {
        let opts = SuggestOptions {
            paired: true,
            ..SuggestOptions::default()
        };
        let s = suggest(&[numeric("before", 40), numeric("after", 40)], opts).unwrap();
        let k = kinds(&s);
        assert_eq!(k[0], TestKind::PairedT);
        assert!(!k.contains(&TestKind::TwoSampleT));
        assert!(k.contains(&TestKind::WilcoxonSignedRank));
    }

    #[test]
    fn two_numeric_small_promotes_mann_whitney() {
        let s = suggest(
            &[numeric("a", 10), numeric("b", 10)],
            SuggestOptions::default(),
        )
        .unwrap();
        let k = kinds(&s);
        let mw = k.iter().position(|&t| t == TestKind::MannWhitneyU).unwrap();
        let t = k.iter().position(|&t| t == TestKind::TwoSampleT).unwrap();
        assert!(mw < t);
        assert!(k.contains(&TestKind::SpearmanCorrelation));
    }

    #[test]
    fn three_groups_suggest_anova() {
        let opts = SuggestOptions {
            n_groups: Some(3),
            ..SuggestOptions::default()
        };
        let s = suggest(&[numeric("response", 90)], opts).unwrap();
        let k = kinds(&s);
        assert_eq!(k[0], TestKind::OneWayAnova);
        assert!(k.contains(&TestKind::KruskalWallis));
    }

    #[test]
    fn three_small_groups_prefer_kruskal_wallis() {
        let opts = SuggestOptions {
            n_groups: Some(4),
            ..SuggestOptions::default()
        };
        let s = suggest(&[numeric("response", 15)], opts).unwrap();
        let k = kinds(&s);
        let kw = k.iter().position(|&t| t == TestKind::KruskalWallis).unwrap();
        let anova = k.iter().position(|&t| t == TestKind::OneWayAnova).unwrap();
        assert!(kw < anova);
    }

    #[test]
    fn categorical_pair_suggests_chi_square() {
        let s = suggest(
            &[categorical("treatment", 200), categorical("outcome", 200)],
            SuggestOptions::default(),
        )
        .unwrap();
        let k = kinds(&s);
        assert_eq!(k[0], TestKind::ChiSquareIndependence);
        assert!(!k.contains(&TestKind::FisherExact));
    }

    #[test]
    fn small_categorical_pair_adds_fisher() {
        let s = suggest(
            &[categorical("treatment", 18), categorical("outcome", 18)],
            SuggestOptions::default(),
        )
        .unwrap();
        assert!(kinds(&s).contains(&TestKind::FisherExact));
    }

    #[test]
    fn output_sorted_by_confidence() {
        let s = suggest(
            &[numeric("a", 12), numeric("b", 12)],
            SuggestOptions::default(),
        )
        .unwrap();
        for w in s.windows(2) {
            assert!(w[0].confidence >= w[1].confidence);
        }
        assert!(s.iter().all(|t| t.confidence > 0.0 && t.confidence <= 1.0));
    }

    #[test]
    fn no_variables_no_suggestions() {
        assert!(suggest(&[], SuggestOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn run_dispatches_matching_shapes() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.1, 3.9, 6.2, 8.1, 9.8, 12.2];
        match run(TestKind::SimpleRegression, TestInput::TwoSample { x: &x, y: &y }, 0.05) {
            Ok(TestOutcome::Regression(fit)) => assert!(fit.r_squared > 0.99),
            other => panic!("unexpected outcome: {:?}", other),
        }
        match run(TestKind::MannWhitneyU, TestInput::TwoSample { x: &x, y: &y }, 0.05) {
            Ok(TestOutcome::MannWhitney(r)) => assert!(r.p_value > 0.0 && r.p_value <= 1.0),
            other => panic!("unexpected outcome: {:?}", other),
        }
        let groups: [&[f64]; 3] = [&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0], &[3.0, 4.0, 5.0]];
        match run(TestKind::KruskalWallis, TestInput::Groups { groups: &groups }, 0.05) {
            Ok(TestOutcome::KruskalWallis(r)) => assert!((r.df - 2.0).abs() < 1e-12),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn run_rejects_incoherent_shape() {
        let x = [1.0, 2.0, 3.0];
        let err = run(
            TestKind::OneWayAnova,
            TestInput::OneSample { data: &x, mu: 0.0 },
            0.05,
        )
        .unwrap_err();
        assert!(matches!(err, aster_core::AsterError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn run_fisher_on_fourfold() {
        let counts = [[8usize, 2], [1, 9]];
        match run(TestKind::FisherExact, TestInput::Fourfold { counts: &counts }, 0.05) {
            Ok(TestOutcome::ChiSquare(r)) => assert!(r.p_value < 0.05),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
