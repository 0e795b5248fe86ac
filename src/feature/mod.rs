//! Feature extraction for articles and products.
//!
//! [`FeatureExtractor`] turns raw records into the comparable forms the
//! scorer needs: normalized label sets, term lists for the shared vector
//! space, and the validated budget range. It holds two analyzers, one for
//! free text and one for whole labels.

pub mod season;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer, label_analyzer, text_analyzer};
use crate::analysis::token::Token;
use crate::error::{OkurimonoError, Result};
use crate::model::{Article, BudgetRange, Product};
use crate::vector_space::TfIdfVectorSpace;

pub use season::{Season, SeasonalLexicon, current_season};

/// Settings for term extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Longest n-gram formed from adjacent words. `1` disables n-grams.
    pub ngram_max: usize,

    /// Cap on the product vocabulary, most frequent terms first.
    pub max_features: Option<usize>,

    /// Stop words applied in addition to the built-in English and Japanese lists.
    pub extra_stop_words: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            ngram_max: 2,
            max_features: None,
            extra_stop_words: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ngram_max == 0 {
            return Err(OkurimonoError::configuration("ngram_max must be at least 1"));
        }
        if self.max_features == Some(0) {
            return Err(OkurimonoError::configuration(
                "max_features must be positive when set",
            ));
        }
        Ok(())
    }
}

/// Input accepted by [`FeatureExtractor::normalize_keywords`].
#[derive(Debug, Clone, Copy)]
pub enum KeywordInput<'a> {
    /// Free text, split into words.
    Text(&'a str),
    /// Labels, each normalized as a whole.
    Set(&'a BTreeSet<String>),
}

impl<'a> From<&'a str> for KeywordInput<'a> {
    fn from(text: &'a str) -> Self {
        KeywordInput::Text(text)
    }
}

impl<'a> From<&'a BTreeSet<String>> for KeywordInput<'a> {
    fn from(labels: &'a BTreeSet<String>) -> Self {
        KeywordInput::Set(labels)
    }
}

/// Normalized view of one article.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleFeatures {
    pub id: String,
    pub keywords: BTreeSet<String>,
    /// Persona and target audience together.
    pub audience: BTreeSet<String>,
    pub scenes: BTreeSet<String>,
    pub seasonal_keywords: BTreeSet<String>,
    pub budget: Option<BudgetRange>,
}

/// Normalized view of one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFeatures {
    pub id: String,
    pub audience: BTreeSet<String>,
    pub scenes: BTreeSet<String>,
    pub seasons: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    text: PipelineAnalyzer,
    label: PipelineAnalyzer,
    ngram_max: usize,
    max_features: Option<usize>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

impl FeatureExtractor {
    pub fn new(config: &AnalyzerConfig) -> Self {
        FeatureExtractor {
            text: text_analyzer(config.extra_stop_words.as_slice()),
            label: label_analyzer(config.extra_stop_words.as_slice()),
            ngram_max: config.ngram_max.max(1),
            max_features: config.max_features,
        }
    }

    /// Lowercased, punctuation-free, stop-word-free keyword set.
    ///
    /// Text is split into words; a set keeps each label whole. The result
    /// depends only on the input.
    pub fn normalize_keywords<'a, I: Into<KeywordInput<'a>>>(
        &self,
        input: I,
    ) -> Result<BTreeSet<String>> {
        match input.into() {
            KeywordInput::Text(text) => Ok(self.text.terms(text)?.into_iter().collect()),
            KeywordInput::Set(labels) => self.normalize_labels(labels),
        }
    }

    pub fn normalize_labels<'a, I>(&self, labels: I) -> Result<BTreeSet<String>>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut normalized = BTreeSet::new();
        for label in labels {
            normalized.extend(self.label.terms(label)?);
        }
        Ok(normalized)
    }

    /// Unigrams plus n-grams of adjacent words.
    ///
    /// Words separated by a removed stop word are not adjacent. Japanese
    /// and Chinese script runs are joined without a space.
    pub fn text_terms(&self, text: &str) -> Result<Vec<String>> {
        let tokens: Vec<Token> = self.text.analyze(text)?.collect();
        let mut terms: Vec<String> = tokens.iter().map(|t| t.text.clone()).collect();

        for n in 2..=self.ngram_max {
            for window in tokens.windows(n) {
                let adjacent = window
                    .windows(2)
                    .all(|pair| pair[1].position == pair[0].position + 1);
                if !adjacent {
                    continue;
                }
                let unspaced = window
                    .iter()
                    .all(|t| t.token_type.is_some_and(|ty| ty.is_unspaced()));
                let joiner = if unspaced { "" } else { " " };
                terms.push(
                    window
                        .iter()
                        .map(|t| t.text.as_str())
                        .collect::<Vec<_>>()
                        .join(joiner),
                );
            }
        }

        Ok(terms)
    }

    /// Text terms of a label plus the whole normalized label.
    pub fn label_terms(&self, label: &str) -> Result<Vec<String>> {
        let mut terms = self.text_terms(label)?;
        for whole in self.label.terms(label)? {
            if !terms.contains(&whole) {
                terms.push(whole);
            }
        }
        Ok(terms)
    }

    /// Title, content, search queries, target keywords and seasonal keywords.
    pub fn article_terms(&self, article: &Article) -> Result<Vec<String>> {
        let mut terms = self.text_terms(&article.title)?;
        terms.extend(self.text_terms(&article.content)?);
        for query in &article.search_queries {
            terms.extend(self.text_terms(query)?);
        }
        for keyword in article.target_keywords.iter().flatten() {
            terms.extend(self.label_terms(keyword)?);
        }
        for keyword in &article.seasonal_keywords {
            terms.extend(self.label_terms(keyword)?);
        }
        Ok(terms)
    }

    /// Name, description, tags, category and subcategory.
    pub fn product_terms(&self, product: &Product) -> Result<Vec<String>> {
        let mut terms = self.text_terms(&product.name)?;
        terms.extend(self.text_terms(&product.description)?);
        for tag in &product.tags {
            terms.extend(self.label_terms(tag)?);
        }
        for label in [&product.category, &product.subcategory] {
            if !label.trim().is_empty() {
                terms.extend(self.label_terms(label)?);
            }
        }
        Ok(terms)
    }

    /// Validate an article and normalize its label sets.
    pub fn article_features(&self, article: &Article) -> Result<ArticleFeatures> {
        article.validate()?;
        let budget = article.budget()?;

        let keywords = match &article.target_keywords {
            Some(keywords) => self.normalize_labels(keywords)?,
            None => BTreeSet::new(),
        };

        Ok(ArticleFeatures {
            id: article.id.clone(),
            keywords,
            audience: self
                .normalize_labels(article.persona.iter().chain(&article.target_audience))?,
            scenes: self.normalize_labels(&article.scene)?,
            seasonal_keywords: self.normalize_labels(&article.seasonal_keywords)?,
            budget,
        })
    }

    /// Validate a product and normalize its label sets.
    pub fn product_features(&self, product: &Product) -> Result<ProductFeatures> {
        product.validate()?;

        Ok(ProductFeatures {
            id: product.id.clone(),
            audience: self.normalize_labels(&product.target_audience)?,
            scenes: self.normalize_labels(&product.scene_suitability)?,
            seasons: self.normalize_labels(&product.seasonal_suitability)?,
        })
    }

    /// Shared TF-IDF space over article and product text.
    ///
    /// Products that fail validation are left out with a warning. An empty
    /// input produces an empty space, not an error.
    pub fn build_corpus(&self, articles: &[Article], products: &[Product]) -> Result<TfIdfVectorSpace> {
        let mut article_docs = Vec::with_capacity(articles.len());
        for article in articles {
            if article.id.trim().is_empty() {
                warn!(title = %article.title, "skipping article without id");
                continue;
            }
            article_docs.push((article.id.clone(), self.article_terms(article)?));
        }

        let mut product_docs = Vec::with_capacity(products.len());
        for product in products {
            if let Err(e) = product.validate() {
                warn!(product_id = %product.id, error = %e, "skipping product record");
                continue;
            }
            product_docs.push((product.id.clone(), self.product_terms(product)?));
        }

        let space = TfIdfVectorSpace::build(article_docs, product_docs, self.max_features);
        debug!(
            articles = space.num_articles(),
            products = space.num_products(),
            vocabulary = space.vocabulary_size(),
            "built tf-idf space"
        );
        Ok(space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BudgetSpec;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_text_is_deterministic_and_deduplicated() {
        let extractor = FeatureExtractor::default();
        let a = extractor
            .normalize_keywords("Gift ideas: the BEST gift for HIM!")
            .unwrap();
        let b = extractor
            .normalize_keywords("Gift ideas: the BEST gift for HIM!")
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a, set(&["best", "gift", "him", "ideas"]));
    }

    #[test]
    fn normalize_set_keeps_labels_whole() {
        let extractor = FeatureExtractor::default();
        let labels = set(&["Birthday Gift", "ＧＩＦＴ", "誕生日"]);
        let normalized = extractor.normalize_keywords(&labels).unwrap();
        assert_eq!(normalized, set(&["birthday gift", "gift", "誕生日"]));
    }

    #[test]
    fn text_terms_include_adjacent_bigrams() {
        let extractor = FeatureExtractor::default();
        let terms = extractor.text_terms("leather wallet").unwrap();
        assert_eq!(terms, vec!["leather", "wallet", "leather wallet"]);

        let terms = extractor.text_terms("誕生日").unwrap();
        assert!(terms.contains(&"誕生".to_string()));
        assert!(terms.contains(&"生日".to_string()));
    }

    #[test]
    fn stop_words_break_adjacency() {
        let extractor = FeatureExtractor::default();
        let terms = extractor.text_terms("gift for him").unwrap();
        assert!(!terms.contains(&"gift him".to_string()));
    }

    #[test]
    fn unigrams_only_when_ngram_max_is_one() {
        let config = AnalyzerConfig {
            ngram_max: 1,
            ..AnalyzerConfig::default()
        };
        let extractor = FeatureExtractor::new(&config);
        assert_eq!(
            extractor.text_terms("leather wallet").unwrap(),
            vec!["leather", "wallet"]
        );
    }

    #[test]
    fn label_terms_add_whole_label_once() {
        let extractor = FeatureExtractor::default();
        let terms = extractor.label_terms("gift").unwrap();
        assert_eq!(terms, vec!["gift"]);

        let terms = extractor.label_terms("誕生日").unwrap();
        assert_eq!(terms.iter().filter(|t| *t == "誕生日").count(), 1);
    }

    #[test]
    fn article_features_merge_persona_and_audience() {
        let extractor = FeatureExtractor::default();
        let article = Article {
            id: "a".into(),
            target_keywords: Some(set(&["プレゼント"])),
            persona: set(&["20代女性"]),
            target_audience: set(&["Couples"]),
            budget_range: Some(BudgetSpec::Range([3000.0, 15000.0])),
            ..Article::default()
        };
        let features = extractor.article_features(&article).unwrap();
        assert_eq!(features.audience, set(&["20代女性", "couples"]));
        assert_eq!(features.budget.unwrap().max, 15000.0);
    }

    #[test]
    fn article_features_reject_missing_keywords() {
        let extractor = FeatureExtractor::default();
        let article = Article {
            id: "a".into(),
            ..Article::default()
        };
        assert!(matches!(
            extractor.article_features(&article),
            Err(OkurimonoError::InvalidArticle(_))
        ));
    }

    #[test]
    fn build_corpus_skips_invalid_products() {
        let extractor = FeatureExtractor::default();
        let products = vec![
            Product {
                id: "p1".into(),
                name: "wallet".into(),
                price: 100.0,
                ..Product::default()
            },
            Product {
                id: "".into(),
                name: "broken".into(),
                price: 100.0,
                ..Product::default()
            },
        ];
        let space = extractor.build_corpus(&[], &products).unwrap();
        assert_eq!(space.num_products(), 1);
    }

    #[test]
    fn empty_corpus_is_not_an_error() {
        let extractor = FeatureExtractor::default();
        let space = extractor.build_corpus(&[], &[]).unwrap();
        assert!(space.is_empty());
    }

    #[test]
    fn analyzer_config_validation() {
        assert!(AnalyzerConfig::default().validate().is_ok());
        let bad = AnalyzerConfig {
            ngram_max: 0,
            ..AnalyzerConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
