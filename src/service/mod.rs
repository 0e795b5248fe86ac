//! Id-based recommendation service over a swappable catalog.
//!
//! The service owns the current [`CatalogSnapshot`] behind a read-write
//! lock. Readers clone the `Arc` and release the lock immediately, so a
//! request keeps scoring against the snapshot it started with even if the
//! catalog is replaced mid-flight. Replacement builds the new snapshot
//! without holding the lock and then swaps it in.

pub mod catalog;
pub mod response;
pub mod snapshot;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{OkurimonoError, Result};
use crate::model::Article;
use crate::recommend::RecommendationEngine;

pub use catalog::Catalog;
pub use response::{
    AnalysisResponse, BatchEntry, BatchResponse, DataSummary, PriceRange, RecommendationResponse,
    RecommendedProduct,
};
pub use snapshot::CatalogSnapshot;

pub struct RecommendationService {
    engine: RecommendationEngine,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    next_version: AtomicU64,
}

impl RecommendationService {
    /// Serve `catalog` as version 1.
    pub fn new(engine: RecommendationEngine, catalog: Catalog) -> Result<Self> {
        let snapshot = CatalogSnapshot::build(&engine, catalog, 1)?;
        info!(
            articles = snapshot.catalog().articles.len(),
            products = snapshot.catalog().products.len(),
            "catalog version 1 ready"
        );
        Ok(RecommendationService {
            engine,
            snapshot: RwLock::new(Arc::new(snapshot)),
            next_version: AtomicU64::new(2),
        })
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// The snapshot currently served.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    pub fn catalog_version(&self) -> u64 {
        self.snapshot.read().version()
    }

    /// Publish a new catalog and return the version now served.
    ///
    /// A catalog identical to the current one keeps the current snapshot
    /// and version.
    pub fn replace_catalog(&self, catalog: Catalog) -> Result<u64> {
        let current = self.snapshot();
        let fingerprint = catalog.fingerprint()?;
        if fingerprint == current.fingerprint() && &catalog == current.catalog() {
            debug!(version = current.version(), "catalog unchanged");
            return Ok(current.version());
        }

        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let snapshot = Arc::new(CatalogSnapshot::build(&self.engine, catalog, version)?);

        let mut guard = self.snapshot.write();
        if guard.version() < version {
            *guard = snapshot;
            info!(version, "catalog replaced");
        }
        Ok(guard.version())
    }

    /// Recommendations for one article, with configured defaults for absent
    /// arguments.
    pub fn recommend(
        &self,
        article_id: &str,
        limit: Option<usize>,
        min_confidence: Option<f64>,
    ) -> Result<RecommendationResponse> {
        let snapshot = self.snapshot();
        let article = find_article(&snapshot, article_id)?;
        let (limit, min_confidence) = self.resolve(limit, min_confidence);

        let results = self.engine.recommend_with_space(
            article,
            &snapshot.catalog().products,
            snapshot.space(),
            limit,
            min_confidence,
        )?;
        Ok(RecommendationResponse::new(
            article.id.clone(),
            results,
            limit,
            min_confidence,
            snapshot.version(),
        ))
    }

    /// Recommendations for several articles. Unknown ids and invalid
    /// articles become error entries; the rest are unaffected.
    pub fn recommend_batch<S: AsRef<str>>(
        &self,
        article_ids: &[S],
        limit: Option<usize>,
        min_confidence: Option<f64>,
    ) -> Result<BatchResponse> {
        let snapshot = self.snapshot();
        let (limit, min_confidence) = self.resolve(limit, min_confidence);

        let requested: BTreeSet<&str> = article_ids.iter().map(AsRef::as_ref).collect();
        let mut results = BTreeMap::new();
        let mut articles: Vec<Article> = Vec::with_capacity(requested.len());
        for id in &requested {
            match snapshot.article(id) {
                Some(article) => articles.push(article.clone()),
                None => {
                    results.insert(
                        id.to_string(),
                        BatchEntry::Err {
                            error: OkurimonoError::not_found(format!("article {id}")).to_string(),
                        },
                    );
                }
            }
        }

        let scored = self.engine.recommend_batch_with_space(
            &articles,
            &snapshot.catalog().products,
            snapshot.space(),
            limit,
            min_confidence,
        )?;
        for (id, result) in scored {
            let entry = match result {
                Ok(matches) => BatchEntry::Ok(RecommendationResponse::new(
                    id.clone(),
                    matches,
                    limit,
                    min_confidence,
                    snapshot.version(),
                )),
                Err(e) => BatchEntry::Err {
                    error: e.to_string(),
                },
            };
            results.insert(id, entry);
        }

        Ok(BatchResponse {
            total_articles: results.len(),
            results,
            catalog_version: snapshot.version(),
            timestamp: Utc::now(),
        })
    }

    /// Full factor breakdown of every product for one article.
    pub fn analyze_match_quality(&self, article_id: &str) -> Result<AnalysisResponse> {
        let snapshot = self.snapshot();
        let article = find_article(&snapshot, article_id)?;
        let analysis = self.engine.analyze_match_quality_with_space(
            article,
            &snapshot.catalog().products,
            snapshot.space(),
        )?;
        Ok(AnalysisResponse {
            article_id: analysis.article_id,
            per_product_factor_breakdown: analysis.products,
            summary: analysis.summary,
            catalog_version: snapshot.version(),
            timestamp: Utc::now(),
        })
    }

    pub fn data_summary(&self) -> DataSummary {
        self.snapshot().summary()
    }

    fn resolve(&self, limit: Option<usize>, min_confidence: Option<f64>) -> (usize, f64) {
        let config = self.engine.config();
        (
            limit.unwrap_or(config.default_limit),
            min_confidence.unwrap_or(config.default_min_confidence),
        )
    }
}

fn find_article<'a>(snapshot: &'a CatalogSnapshot, article_id: &str) -> Result<&'a Article> {
    snapshot
        .article(article_id)
        .ok_or_else(|| OkurimonoError::not_found(format!("article {article_id}")))
}
