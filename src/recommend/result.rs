//! Output records of the engine.

use serde::{Deserialize, Serialize};

use crate::recommend::factors::FactorScores;

/// One recommended product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub product_id: String,
    pub product_name: String,
    pub price: f64,
    pub match_score: f64,
    pub confidence: f64,
    /// Explanations for the factors that matched well, strongest first.
    pub match_reasons: Vec<String>,
    pub factor_scores: FactorScores,
}

/// Unfiltered breakdown of one product, as returned by
/// `analyze_match_quality`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDiagnostics {
    pub product_id: String,
    pub product_name: String,
    pub price: f64,
    pub match_score: f64,
    pub confidence: f64,
    pub factor_scores: FactorScores,
    /// `weight × score` per factor, in factor order.
    pub contributions: FactorScores,
    pub match_reasons: Vec<String>,
    /// Terms the article and product share, most informative first.
    pub shared_terms: Vec<String>,
}

/// Distribution of match scores over a set of products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub total_products: usize,
    pub average_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    /// Population standard deviation.
    pub score_std: f64,
    /// Confidence above 0.8.
    pub high_confidence_count: usize,
    /// Confidence in `[0.6, 0.8]`.
    pub medium_confidence_count: usize,
    /// Confidence below 0.6.
    pub low_confidence_count: usize,
}

impl QualitySummary {
    /// Summarize `(match_score, confidence)` pairs. Empty input gives all zeros.
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let scores: Vec<(f64, f64)> = scores.into_iter().collect();
        if scores.is_empty() {
            return QualitySummary::default();
        }

        let n = scores.len() as f64;
        let mean = scores.iter().map(|(s, _)| s).sum::<f64>() / n;
        let variance = scores.iter().map(|(s, _)| (s - mean).powi(2)).sum::<f64>() / n;

        let mut summary = QualitySummary {
            total_products: scores.len(),
            average_score: mean,
            max_score: scores.iter().map(|(s, _)| *s).fold(f64::MIN, f64::max),
            min_score: scores.iter().map(|(s, _)| *s).fold(f64::MAX, f64::min),
            score_std: variance.sqrt(),
            ..QualitySummary::default()
        };
        for (_, confidence) in &scores {
            if *confidence > 0.8 {
                summary.high_confidence_count += 1;
            } else if *confidence >= 0.6 {
                summary.medium_confidence_count += 1;
            } else {
                summary.low_confidence_count += 1;
            }
        }
        summary
    }
}

/// Everything `analyze_match_quality` reports for one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub article_id: String,
    pub products: Vec<MatchDiagnostics>,
    pub summary: QualitySummary,
}
