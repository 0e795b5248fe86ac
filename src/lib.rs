//! # Okurimono
//!
//! An explainable recommendation engine that matches gift-guide articles
//! with catalog products.
//!
//! ## Features
//!
//! - Seven weighted factors: keyword similarity, persona, scene, budget,
//!   season, popularity and conversion rate
//! - Shared TF-IDF vector space over article and product text, with
//!   Japanese-aware tokenization
//! - Human-readable match reasons for every recommendation
//! - Deterministic ranking with product-id tie-break
//! - Parallel batch scoring over a versioned, atomically swapped catalog
//! - Offline precision, recall, F1 and NDCG evaluation
//!
//! ## Example
//!
//! ```
//! use okurimono::prelude::*;
//!
//! let engine = RecommendationEngine::new(RecommendationConfig::default()).unwrap();
//!
//! let article = Article {
//!     id: "a-1".into(),
//!     title: "Leather gifts for him".into(),
//!     target_keywords: Some(["leather".to_string()].into()),
//!     ..Article::default()
//! };
//! let products = vec![Product {
//!     id: "p-1".into(),
//!     name: "Leather wallet".into(),
//!     price: 8000.0,
//!     ..Product::default()
//! }];
//!
//! let results = engine.recommend(&article, &products, 10, 0.0).unwrap();
//! assert_eq!(results[0].product_id, "p-1");
//! ```

pub mod analysis;
pub mod cli;
pub mod error;
pub mod evaluation;
pub mod feature;
pub mod model;
pub mod recommend;
pub mod service;
pub mod vector_space;

pub mod prelude {
    pub use crate::error::{OkurimonoError, Result};
    pub use crate::feature::{FeatureExtractor, Season, current_season};
    pub use crate::model::{Article, BudgetRange, BudgetSpec, Product};
    pub use crate::recommend::{
        Factor, FactorScores, FactorWeights, MatchResult, RecommendationConfig,
        RecommendationEngine,
    };
    pub use crate::service::{Catalog, RecommendationService};
    pub use crate::vector_space::{TfIdfVectorSpace, VectorSpace};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
