//! Response shapes returned by [`RecommendationService`](super::RecommendationService).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recommend::{MatchDiagnostics, MatchResult, QualitySummary};

/// One product in a recommendation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub product_id: String,
    pub product_name: String,
    pub price: f64,
    pub match_score: f64,
    pub confidence: f64,
    pub match_reasons: Vec<String>,
}

impl From<MatchResult> for RecommendedProduct {
    fn from(result: MatchResult) -> Self {
        RecommendedProduct {
            product_id: result.product_id,
            product_name: result.product_name,
            price: result.price,
            match_score: result.match_score,
            confidence: result.confidence,
            match_reasons: result.match_reasons,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub article_id: String,
    pub recommendations: Vec<RecommendedProduct>,
    pub total_recommendations: usize,
    pub requested_limit: usize,
    pub min_confidence: f64,
    pub catalog_version: u64,
    pub timestamp: DateTime<Utc>,
}

impl RecommendationResponse {
    pub fn new(
        article_id: String,
        results: Vec<MatchResult>,
        requested_limit: usize,
        min_confidence: f64,
        catalog_version: u64,
    ) -> Self {
        let recommendations: Vec<RecommendedProduct> =
            results.into_iter().map(RecommendedProduct::from).collect();
        RecommendationResponse {
            article_id,
            total_recommendations: recommendations.len(),
            recommendations,
            requested_limit,
            min_confidence,
            catalog_version,
            timestamp: Utc::now(),
        }
    }
}

/// A batch entry: the article's response, or why it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Ok(RecommendationResponse),
    Err { error: String },
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        matches!(self, BatchEntry::Ok(_))
    }

    pub fn response(&self) -> Option<&RecommendationResponse> {
        match self {
            BatchEntry::Ok(response) => Some(response),
            BatchEntry::Err { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: BTreeMap<String, BatchEntry>,
    pub total_articles: usize,
    pub catalog_version: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub article_id: String,
    pub per_product_factor_breakdown: Vec<MatchDiagnostics>,
    pub summary: QualitySummary,
    pub catalog_version: u64,
    pub timestamp: DateTime<Utc>,
}

/// Minimum, maximum and mean of catalog prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Overview of the catalog currently served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_articles: usize,
    pub total_products: usize,
    pub catalog_version: u64,
    pub fingerprint: u32,
    /// Product count per category; uncategorized products are counted under "".
    pub categories: BTreeMap<String, usize>,
    pub scenes: BTreeSet<String>,
    /// `None` for an empty catalog.
    pub price_range: Option<PriceRange>,
    pub built_at: DateTime<Utc>,
}
