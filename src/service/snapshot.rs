//! Immutable, versioned view of a catalog and its vector space.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::Article;
use crate::recommend::RecommendationEngine;
use crate::service::catalog::Catalog;
use crate::service::response::{DataSummary, PriceRange};
use crate::vector_space::TfIdfVectorSpace;

/// A catalog version together with the vector space built from it.
///
/// Snapshots are never mutated after construction. A catalog change
/// produces a new snapshot that replaces the old one as a whole.
#[derive(Debug)]
pub struct CatalogSnapshot {
    version: u64,
    fingerprint: u32,
    catalog: Catalog,
    article_index: AHashMap<String, usize>,
    space: TfIdfVectorSpace,
    built_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn build(engine: &RecommendationEngine, catalog: Catalog, version: u64) -> Result<Self> {
        let fingerprint = catalog.fingerprint()?;
        let space = engine.build_vector_space(&catalog.articles, &catalog.products)?;

        let mut article_index = AHashMap::with_capacity(catalog.articles.len());
        for (index, article) in catalog.articles.iter().enumerate() {
            article_index.entry(article.id.clone()).or_insert(index);
        }

        Ok(CatalogSnapshot {
            version,
            fingerprint,
            catalog,
            article_index,
            space,
            built_at: Utc::now(),
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn space(&self) -> &TfIdfVectorSpace {
        &self.space
    }

    /// First article with `article_id`.
    pub fn article(&self, article_id: &str) -> Option<&Article> {
        self.article_index
            .get(article_id)
            .map(|&index| &self.catalog.articles[index])
    }

    pub fn summary(&self) -> DataSummary {
        let products = &self.catalog.products;

        let mut categories = BTreeMap::new();
        let mut scenes = BTreeSet::new();
        for product in products {
            *categories.entry(product.category.clone()).or_insert(0) += 1;
            scenes.extend(product.scene_suitability.iter().cloned());
        }
        for article in &self.catalog.articles {
            scenes.extend(article.scene.iter().cloned());
        }

        let prices: Vec<f64> = products
            .iter()
            .map(|p| p.price)
            .filter(|p| p.is_finite())
            .collect();
        let price_range = (!prices.is_empty()).then(|| PriceRange {
            min: prices.iter().copied().fold(f64::INFINITY, f64::min),
            max: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: prices.iter().sum::<f64>() / prices.len() as f64,
        });

        DataSummary {
            total_articles: self.catalog.articles.len(),
            total_products: products.len(),
            catalog_version: self.version,
            fingerprint: self.fingerprint,
            categories,
            scenes,
            price_range,
            built_at: self.built_at,
        }
    }
}
