//! Offline ranking-quality metrics against hand-labelled relevance.
//!
//! Relevance is binary: a product is either in an article's
//! `relevant_products` or not. Metrics are computed per article and
//! averaged over every article that could be scored.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{OkurimonoError, Result};
use crate::service::RecommendationService;

/// Cutoffs evaluated when none are given.
pub const DEFAULT_K_VALUES: [usize; 3] = [5, 10, 20];

/// Products known to be relevant (and optionally irrelevant) for one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub article_id: String,
    pub relevant_products: BTreeSet<String>,
    #[serde(default)]
    pub irrelevant_products: BTreeSet<String>,
}

impl GroundTruth {
    /// Read a JSON array of ground-truth entries.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<GroundTruth>> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Metrics at one cutoff, averaged over articles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub ndcg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Metrics keyed by cutoff `k`.
    pub metrics: BTreeMap<usize, RankingMetrics>,
    pub articles_evaluated: usize,
    /// Articles that were unknown or could not be scored.
    pub articles_failed: Vec<String>,
}

/// Precision, recall and F1 of the first `k` ranked ids.
///
/// Precision is taken over the ids actually returned, so a short list is
/// not penalized for its missing tail.
pub fn precision_recall_at_k(
    ranked: &[String],
    relevant: &BTreeSet<String>,
    k: usize,
) -> (f64, f64, f64) {
    let top: BTreeSet<&str> = ranked.iter().take(k).map(String::as_str).collect();
    let hits = top.iter().filter(|id| relevant.contains(**id)).count() as f64;

    let precision = if top.is_empty() { 0.0 } else { hits / top.len() as f64 };
    let recall = if relevant.is_empty() {
        0.0
    } else {
        hits / relevant.len() as f64
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    (precision, recall, f1)
}

/// Binary-relevance NDCG of the first `k` ranked ids.
pub fn ndcg_at_k(ranked: &[String], relevant: &BTreeSet<String>, k: usize) -> f64 {
    let discount = |rank: usize| 1.0 / ((rank + 2) as f64).log2();

    let dcg: f64 = ranked
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, id)| relevant.contains(*id))
        .map(|(rank, _)| discount(rank))
        .sum();
    let ideal: f64 = (0..k.min(relevant.len())).map(discount).sum();

    if ideal == 0.0 { 0.0 } else { dcg / ideal }
}

/// Score every ground-truth article through `service` and average the
/// metrics at each cutoff.
pub fn evaluate(
    service: &RecommendationService,
    ground_truth: &[GroundTruth],
    k_values: &[usize],
    min_confidence: f64,
) -> Result<EvaluationReport> {
    if k_values.is_empty() || k_values.contains(&0) {
        return Err(OkurimonoError::invalid_argument(
            "k values must be non-empty and positive",
        ));
    }
    let max_k = k_values.iter().copied().max().unwrap_or(1);

    let mut sums: BTreeMap<usize, RankingMetrics> =
        k_values.iter().map(|k| (*k, RankingMetrics::default())).collect();
    let mut evaluated = 0;
    let mut failed = Vec::new();

    for truth in ground_truth {
        let response = match service.recommend(&truth.article_id, Some(max_k), Some(min_confidence)) {
            Ok(response) => response,
            Err(e) => {
                warn!(article_id = %truth.article_id, error = %e, "cannot evaluate article");
                failed.push(truth.article_id.clone());
                continue;
            }
        };
        let ranked: Vec<String> = response
            .recommendations
            .into_iter()
            .map(|r| r.product_id)
            .collect();

        for (k, sum) in sums.iter_mut() {
            let (precision, recall, f1) = precision_recall_at_k(&ranked, &truth.relevant_products, *k);
            sum.precision += precision;
            sum.recall += recall;
            sum.f1 += f1;
            sum.ndcg += ndcg_at_k(&ranked, &truth.relevant_products, *k);
        }
        evaluated += 1;
    }

    let metrics = sums
        .into_iter()
        .map(|(k, sum)| {
            let n = evaluated.max(1) as f64;
            (
                k,
                RankingMetrics {
                    precision: sum.precision / n,
                    recall: sum.recall / n,
                    f1: sum.f1 / n,
                    ndcg: sum.ndcg / n,
                },
            )
        })
        .collect();

    info!(evaluated, failed = failed.len(), "evaluation finished");
    Ok(EvaluationReport {
        metrics,
        articles_evaluated: evaluated,
        articles_failed: failed,
    })
}
