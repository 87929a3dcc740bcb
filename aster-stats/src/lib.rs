//! Statistical computation engine for the Aster data-analysis ecosystem.
//!
//! Provides descriptive statistics, normality assessment, parametric and
//! rank-based hypothesis tests, correlation and regression, multiple
//! comparison adjustment, resampling inference, robust estimators, and a
//! rule-based advisor that recommends which test fits a dataset.
//!
//! # Example
//!
//! ```
//! use aster_stats::{describe, t_test_two_sample, VariancePolicy, DEFAULT_ALPHA};
//!
//! let control = [4.8, 5.1, 4.9, 5.3, 5.0, 4.7, 5.2, 4.9];
//! let treated = [5.9, 6.2, 5.8, 6.4, 6.0, 6.1, 5.7, 6.3];
//!
//! let stats = describe(&control).unwrap();
//! assert!(stats.std_dev < 0.5);
//!
//! let t = t_test_two_sample(&treated, &control, VariancePolicy::Auto, DEFAULT_ALPHA).unwrap();
//! assert!(t.p_value < 0.001);
//! ```

pub mod advisor;
pub mod correction;
pub mod correlation;
pub mod descriptive;
pub mod distribution;
pub mod nonparametric;
pub mod normality;
pub mod rank;
pub mod regression;
pub mod resample;
pub mod robust;
pub mod testing;

pub use advisor::{
    infer_type, run, suggest, DataType, SuggestOptions, TestInput, TestKind, TestOutcome,
    TestSuggestion, VariableProfile,
};
pub use correction::{adjust, Adjustment};
pub use correlation::{
    kendall_test, pearson, pearson_test, spearman_test, CorrelationMatrix, CorrelationMethod,
    CorrelationResult,
};
pub use descriptive::{
    coefficient_of_variation, describe, describe_nullable, geometric_mean, outliers,
    DescriptiveStats, OutlierMethod, OutlierReport,
};
pub use distribution::{ChiSquared, Distribution, FDistribution, Normal, StudentsT};
pub use nonparametric::{
    kruskal_wallis, mann_whitney_u, wilcoxon_signed_rank, KruskalWallisResult, MannWhitneyResult,
    WilcoxonResult,
};
pub use normality::{
    anderson_darling, assess, kolmogorov_smirnov, shapiro_wilk, AndersonDarlingResult,
    KolmogorovSmirnovResult, NormalityReport, NormalityTest, ShapiroWilkResult,
};
pub use rank::{rank, RankMethod};
pub use regression::{
    influence, multiple_linear, simple_linear, Coefficient, InfluenceDiagnostics,
    MultipleRegression, RegressionDiagnostics, SimpleRegression,
};
pub use resample::{
    bootstrap_ci, bootstrap_distribution, bootstrap_mean_ci, bootstrap_median_ci,
    permutation_null, permutation_test, Alternative, BootstrapResult, PermutationResult,
};
pub use robust::{robust_summary, theil_sen, trimmed_mean, winsorized_mean, RobustSummary, TheilSenResult};
pub use testing::{
    anova_one_way, chi_square_goodness_of_fit, chi_square_goodness_of_fit_uniform,
    chi_square_independence, fisher_exact, levene, t_test_one_sample, t_test_paired,
    t_test_paired_nullable, t_test_two_sample, AnovaResult, AssumptionCheck,
    ChiSquareResult, ConfidenceInterval, ContingencyTable, LeveneCenter, LeveneResult,
    PairwiseComparison, TTestKind, TTestResult, VariancePolicy, Verdict, DEFAULT_ALPHA,
};
