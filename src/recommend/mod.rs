//! Multi-factor, explainable product recommendation.
//!
//! Each product gets seven factor scores in `[0, 1]` (see [`Factor`]). The
//! weighted sum is the match score; confidence is a calibrated copy of it
//! used for filtering. Results are ranked by match score, ties broken by
//! product id, and each carries the reasons that made it rank.

pub mod config;
pub mod engine;
pub mod explain;
pub mod factors;
pub mod result;

pub use config::{
    BudgetPolicy, ConfidenceCalibration, FactorWeights, RecommendationConfig,
    SignificanceThresholds,
};
pub use engine::{BatchResults, PreparedCatalog, RecommendationEngine};
pub use factors::{Factor, FactorScores};
pub use result::{MatchAnalysis, MatchDiagnostics, MatchResult, QualitySummary};
