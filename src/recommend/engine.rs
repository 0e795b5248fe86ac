//! The recommendation engine.
//!
//! Scoring is a pure function of the article, the product catalog, the
//! vector space and the configuration. The engine itself keeps no state
//! between calls apart from its validated configuration and a thread pool
//! for batch work.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use chrono::NaiveDate;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::error::{OkurimonoError, Result};
use crate::feature::{ArticleFeatures, FeatureExtractor, ProductFeatures, Season, current_season};
use crate::model::{Article, Product};
use crate::recommend::config::RecommendationConfig;
use crate::recommend::explain::{SignalCutoffs, match_reasons};
use crate::recommend::factors::{
    FactorScores, budget_match, clamp_unit, jaccard, percentage, seasonal_match,
};
use crate::recommend::result::{MatchAnalysis, MatchDiagnostics, MatchResult, QualitySummary};
use crate::vector_space::{TfIdfVectorSpace, VectorSpace};

/// Per-article results of a batch. One article's failure leaves the others intact.
pub type BatchResults = BTreeMap<String, Result<Vec<MatchResult>>>;

/// Products that passed validation, with their features and the catalog
/// cutoffs used for reasons.
pub struct PreparedCatalog<'a> {
    products: Vec<(&'a Product, ProductFeatures)>,
    cutoffs: SignalCutoffs,
}

impl PreparedCatalog<'_> {
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

struct Scored<'a> {
    product: &'a Product,
    scores: FactorScores,
    match_score: f64,
    confidence: f64,
}

pub struct RecommendationEngine {
    config: RecommendationConfig,
    extractor: FeatureExtractor,
    /// Boosts keyed by normalized keyword.
    keyword_boosts: AHashMap<String, f64>,
    reference_date: Option<NaiveDate>,
    thread_pool: Arc<ThreadPool>,
}

impl RecommendationEngine {
    /// Validate `config` and build the engine.
    ///
    /// With `normalize_weights` set the weights are rescaled to sum to 1
    /// before validation.
    pub fn new(mut config: RecommendationConfig) -> Result<Self> {
        if config.normalize_weights {
            config.weights = config.weights.normalized()?;
        }
        config.validate()?;

        let extractor = FeatureExtractor::new(&config.analyzer);

        let mut keyword_boosts = AHashMap::new();
        for (keyword, boost) in &config.keyword_boosts {
            for normalized in extractor.normalize_labels([keyword])? {
                keyword_boosts.insert(normalized, *boost);
            }
        }

        let num_threads = config.num_threads.unwrap_or_else(num_cpus::get);
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("okurimono-batch-{i}"))
            .build()
            .map_err(|e| OkurimonoError::internal(format!("Failed to create thread pool: {e}")))?;

        debug!(num_threads, boosts = keyword_boosts.len(), "recommendation engine ready");

        Ok(RecommendationEngine {
            config,
            extractor,
            keyword_boosts,
            reference_date: None,
            thread_pool: Arc::new(thread_pool),
        })
    }

    /// Fix the date used to determine the current season.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Season of the reference date, or of today.
    pub fn season(&self) -> Season {
        current_season(self.reference_date)
    }

    /// Build the shared vector space for a set of articles and a catalog.
    pub fn build_vector_space(
        &self,
        articles: &[Article],
        products: &[Product],
    ) -> Result<TfIdfVectorSpace> {
        self.extractor.build_corpus(articles, products)
    }

    /// Validate products once so they can be scored against many articles.
    ///
    /// Invalid records are skipped with a warning. Of several valid records
    /// sharing an id only the first is kept, matching the vector space.
    pub fn prepare_catalog<'a>(&self, products: &'a [Product]) -> PreparedCatalog<'a> {
        let mut prepared = Vec::with_capacity(products.len());
        let mut seen: AHashSet<&str> = AHashSet::with_capacity(products.len());
        for product in products {
            match self.extractor.product_features(product) {
                Ok(features) => {
                    if seen.insert(product.id.as_str()) {
                        prepared.push((product, features));
                    } else {
                        warn!(product_id = %product.id, "skipping duplicate product id");
                    }
                }
                Err(e) => warn!(product_id = %product.id, error = %e, "skipping product record"),
            }
        }
        let cutoffs = SignalCutoffs::from_products(prepared.iter().map(|(product, _)| *product));
        PreparedCatalog {
            products: prepared,
            cutoffs,
        }
    }

    /// Ranked, confidence-filtered recommendations for one article.
    ///
    /// Builds a vector space for this article and catalog. Use
    /// [`recommend_with_space`](Self::recommend_with_space) to reuse one.
    pub fn recommend(
        &self,
        article: &Article,
        products: &[Product],
        limit: usize,
        min_confidence: f64,
    ) -> Result<Vec<MatchResult>> {
        check_request(limit, min_confidence)?;
        let space = self.build_vector_space(std::slice::from_ref(article), products)?;
        let catalog = self.prepare_catalog(products);
        self.recommend_prepared(article, &catalog, &space, limit, min_confidence)
    }

    /// Like [`recommend`](Self::recommend) against a prebuilt space that
    /// contains the article.
    pub fn recommend_with_space(
        &self,
        article: &Article,
        products: &[Product],
        space: &dyn VectorSpace,
        limit: usize,
        min_confidence: f64,
    ) -> Result<Vec<MatchResult>> {
        check_request(limit, min_confidence)?;
        let catalog = self.prepare_catalog(products);
        self.recommend_prepared(article, &catalog, space, limit, min_confidence)
    }

    /// Score one article against a prepared catalog.
    pub fn recommend_prepared(
        &self,
        article: &Article,
        catalog: &PreparedCatalog<'_>,
        space: &dyn VectorSpace,
        limit: usize,
        min_confidence: f64,
    ) -> Result<Vec<MatchResult>> {
        check_request(limit, min_confidence)?;
        let ranked = self.score_all(article, catalog, space)?;
        let candidates = ranked.len();

        let results: Vec<MatchResult> = ranked
            .into_iter()
            .filter(|s| s.confidence >= min_confidence)
            .take(limit)
            .map(|s| MatchResult {
                product_id: s.product.id.clone(),
                product_name: s.product.name.clone(),
                price: s.product.price,
                match_score: s.match_score,
                confidence: s.confidence,
                match_reasons: self.reasons(&s, catalog),
                factor_scores: s.scores,
            })
            .collect();

        debug!(
            article_id = %article.id,
            candidates,
            returned = results.len(),
            min_confidence,
            "scored article"
        );
        Ok(results)
    }

    /// Unfiltered factor breakdown for every valid product.
    pub fn analyze_match_quality(
        &self,
        article: &Article,
        products: &[Product],
    ) -> Result<MatchAnalysis> {
        let space = self.build_vector_space(std::slice::from_ref(article), products)?;
        self.analyze_match_quality_with_space(article, products, &space)
    }

    pub fn analyze_match_quality_with_space(
        &self,
        article: &Article,
        products: &[Product],
        space: &dyn VectorSpace,
    ) -> Result<MatchAnalysis> {
        let catalog = self.prepare_catalog(products);
        let ranked = self.score_all(article, &catalog, space)?;

        let summary = QualitySummary::from_scores(ranked.iter().map(|s| (s.match_score, s.confidence)));
        let weights = &self.config.weights;
        let products = ranked
            .iter()
            .map(|s| {
                let mut contributions = s.scores;
                contributions.keyword *= weights.keyword;
                contributions.persona *= weights.persona;
                contributions.scene *= weights.scene;
                contributions.budget *= weights.budget;
                contributions.seasonal *= weights.seasonal;
                contributions.popularity *= weights.popularity;
                contributions.conversion *= weights.conversion;

                MatchDiagnostics {
                    product_id: s.product.id.clone(),
                    product_name: s.product.name.clone(),
                    price: s.product.price,
                    match_score: s.match_score,
                    confidence: s.confidence,
                    factor_scores: s.scores,
                    contributions,
                    match_reasons: self.reasons(s, &catalog),
                    shared_terms: space.shared_terms(&article.id, &s.product.id),
                }
            })
            .collect();

        Ok(MatchAnalysis {
            article_id: article.id.clone(),
            products,
            summary,
        })
    }

    /// Recommendations for several articles over one shared vector space.
    ///
    /// Invalid arguments fail the whole call; an invalid article only fails
    /// its own entry.
    pub fn recommend_batch(
        &self,
        articles: &[Article],
        products: &[Product],
        limit: usize,
        min_confidence: f64,
    ) -> Result<BatchResults> {
        check_request(limit, min_confidence)?;
        let space = self.build_vector_space(articles, products)?;
        self.recommend_batch_with_space(articles, products, &space, limit, min_confidence)
    }

    pub fn recommend_batch_with_space(
        &self,
        articles: &[Article],
        products: &[Product],
        space: &dyn VectorSpace,
        limit: usize,
        min_confidence: f64,
    ) -> Result<BatchResults> {
        check_request(limit, min_confidence)?;
        let catalog = self.prepare_catalog(products);

        let results: Vec<(String, Result<Vec<MatchResult>>)> = self.thread_pool.install(|| {
            articles
                .par_iter()
                .map(|article| {
                    let result =
                        self.recommend_prepared(article, &catalog, space, limit, min_confidence);
                    if let Err(e) = &result {
                        warn!(article_id = %article.id, error = %e, "article failed in batch");
                    }
                    (article.id.clone(), result)
                })
                .collect()
        });

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(
            articles = articles.len(),
            products = catalog.len(),
            failed,
            "batch recommendation finished"
        );
        Ok(results.into_iter().collect())
    }

    fn reasons(&self, scored: &Scored<'_>, catalog: &PreparedCatalog<'_>) -> Vec<String> {
        match_reasons(
            &scored.scores,
            scored.product,
            &self.config.weights,
            &self.config.thresholds,
            &catalog.cutoffs,
        )
    }

    /// Score every product and rank by match score, then product id.
    fn score_all<'a>(
        &self,
        article: &Article,
        catalog: &PreparedCatalog<'a>,
        space: &dyn VectorSpace,
    ) -> Result<Vec<Scored<'a>>> {
        let features = self.extractor.article_features(article)?;
        if !space.contains_article(&article.id) {
            return Err(OkurimonoError::invalid_argument(format!(
                "article {} is not indexed in the {} vector space",
                article.id,
                space.name()
            )));
        }

        let in_season = self.in_season_labels(&features)?;
        let boost = self.keyword_boost(&features);

        let mut scored: Vec<Scored<'a>> = catalog
            .products
            .iter()
            .map(|(product, product_features)| {
                let scores = self.score_product(
                    &features,
                    &in_season,
                    boost,
                    product,
                    product_features,
                    space,
                );
                let match_score = self.config.weights.combine(&scores);
                Scored {
                    product,
                    scores,
                    match_score,
                    confidence: self.config.calibration.apply(match_score),
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.match_score
                .total_cmp(&a.match_score)
                .then_with(|| a.product.id.cmp(&b.product.id))
        });
        Ok(scored)
    }

    fn score_product(
        &self,
        article: &ArticleFeatures,
        in_season: &BTreeSet<String>,
        boost: f64,
        product: &Product,
        features: &ProductFeatures,
        space: &dyn VectorSpace,
    ) -> FactorScores {
        FactorScores {
            keyword: clamp_unit(space.similarity(&article.id, &product.id) * boost),
            persona: jaccard(&article.audience, &features.audience),
            scene: jaccard(&article.scenes, &features.scenes),
            budget: budget_match(
                article.budget.as_ref(),
                product.price,
                self.config.budget.decay_width_ratio,
            ),
            seasonal: seasonal_match(&features.seasons, in_season),
            popularity: percentage(product.popularity_score),
            conversion: percentage(product.conversion_rate),
        }
        .clamped()
    }

    /// Current season label, its lexicon words and the article's seasonal
    /// keywords, all normalized.
    fn in_season_labels(&self, article: &ArticleFeatures) -> Result<BTreeSet<String>> {
        let season = self.season();
        let season_label = season.label().to_string();
        let lexicon = self.config.seasonal_lexicon.words(season);

        let mut labels = self
            .extractor
            .normalize_labels(std::iter::once(&season_label).chain(lexicon))?;
        labels.extend(article.seasonal_keywords.iter().cloned());
        Ok(labels)
    }

    /// Product of the boosts of the article's keywords.
    fn keyword_boost(&self, article: &ArticleFeatures) -> f64 {
        article
            .keywords
            .iter()
            .filter_map(|k| self.keyword_boosts.get(k))
            .product()
    }
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("config", &self.config)
            .field("reference_date", &self.reference_date)
            .field("num_threads", &self.thread_pool.current_num_threads())
            .finish()
    }
}

fn check_request(limit: usize, min_confidence: f64) -> Result<()> {
    if limit == 0 {
        return Err(OkurimonoError::invalid_argument("limit must be positive"));
    }
    if !(0.0..=1.0).contains(&min_confidence) {
        return Err(OkurimonoError::invalid_argument(format!(
            "min_confidence must be in [0, 1], got {min_confidence}"
        )));
    }
    Ok(())
}
