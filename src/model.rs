//! Article and product records consumed by the engine.
//!
//! Both records are built by the catalog-loading collaborator and are never
//! mutated by the engine. Set-valued fields use `BTreeSet` so that iteration
//! order (and therefore every derived value) is deterministic.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{OkurimonoError, Result};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"));

/// A content page whose commercial intent drives product matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    /// `None` means the field is missing entirely, which makes the article
    /// unscoreable. An empty set is allowed.
    pub target_keywords: Option<BTreeSet<String>>,
    pub persona: BTreeSet<String>,
    pub scene: BTreeSet<String>,
    pub target_audience: BTreeSet<String>,
    pub budget_range: Option<BudgetSpec>,
    pub seasonal_keywords: BTreeSet<String>,
    /// Search-console queries that brought readers to the article.
    pub search_queries: Vec<String>,
}

impl Article {
    /// Resolve the budget field into a validated range.
    pub fn budget(&self) -> Result<Option<BudgetRange>> {
        match &self.budget_range {
            None => Ok(None),
            Some(spec) => spec.resolve().map(Some).map_err(|e| {
                OkurimonoError::invalid_article(format!(
                    "article {} has an unusable budget_range: {e}",
                    self.id
                ))
            }),
        }
    }

    /// Check the fields the engine reads directly.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(OkurimonoError::invalid_article("article id is empty"));
        }
        if self.target_keywords.is_none() {
            return Err(OkurimonoError::invalid_article(format!(
                "article {} is missing target_keywords",
                self.id
            )));
        }
        self.budget()?;
        Ok(())
    }
}

/// A catalog item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    pub price: f64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub target_audience: BTreeSet<String>,
    #[serde(default)]
    pub seasonal_suitability: BTreeSet<String>,
    #[serde(default)]
    pub scene_suitability: BTreeSet<String>,
    /// 0–100; absent signal is 0.
    #[serde(default)]
    pub popularity_score: f64,
    /// Percentage; absent signal is 0.
    #[serde(default)]
    pub conversion_rate: f64,
}

impl Product {
    /// Check the fields the engine reads directly.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(OkurimonoError::product_record(format!(
                "product named {:?} has an empty id",
                self.name
            )));
        }
        if self.name.trim().is_empty() {
            return Err(OkurimonoError::product_record(format!(
                "product {} has an empty name",
                self.id
            )));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(OkurimonoError::product_record(format!(
                "product {} has an invalid price {}",
                self.id, self.price
            )));
        }
        Ok(())
    }
}

/// Budget as supplied by the data source: a pair, a single amount or free
/// text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BudgetSpec {
    Range([f64; 2]),
    /// Read as `[0.5v, 1.5v]`.
    Amount(f64),
    Text(String),
}

impl BudgetSpec {
    pub fn resolve(&self) -> Result<BudgetRange> {
        match self {
            BudgetSpec::Range([min, max]) => BudgetRange::new(*min, *max),
            BudgetSpec::Amount(value) => BudgetRange::around(*value),
            BudgetSpec::Text(text) => text.parse(),
        }
    }
}

impl From<BudgetRange> for BudgetSpec {
    fn from(range: BudgetRange) -> Self {
        BudgetSpec::Range([range.min, range.max])
    }
}

/// Closed price interval `[min, max]` in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

impl BudgetRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(OkurimonoError::invalid_argument(format!(
                "budget bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min < 0.0 || min > max {
            return Err(OkurimonoError::invalid_argument(format!(
                "budget must satisfy 0 <= min <= max, got [{min}, {max}]"
            )));
        }
        Ok(BudgetRange { min, max })
    }

    /// `[0.5v, 1.5v]`.
    pub fn around(value: f64) -> Result<Self> {
        BudgetRange::new(value * 0.5, value * 1.5)
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl FromStr for BudgetRange {
    type Err = OkurimonoError;

    /// Parses "3000-15000", "3,000〜15,000円" and similar. A single number
    /// `v` is read as `[0.5v, 1.5v]`.
    fn from_str(s: &str) -> Result<Self> {
        let cleaned = s.replace([',', '，'], "");
        let numbers: Vec<f64> = NUMBER
            .find_iter(&cleaned)
            .filter_map(|m| m.as_str().parse().ok())
            .collect();

        match numbers.as_slice() {
            [] => Err(OkurimonoError::invalid_argument(format!(
                "no amount found in budget {s:?}"
            ))),
            [value] => BudgetRange::around(*value),
            [min, max, ..] => BudgetRange::new(*min, *max),
        }
    }
}

impl fmt::Display for BudgetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            id: "a-1".into(),
            title: "彼氏への誕生日プレゼント".into(),
            target_keywords: Some(["誕生日".to_string()].into()),
            ..Article::default()
        }
    }

    #[test]
    fn parses_budget_text() {
        let range: BudgetRange = "3000-15000円".parse().unwrap();
        assert_eq!(range, BudgetRange { min: 3000.0, max: 15000.0 });

        let range: BudgetRange = "3,000〜15,000".parse().unwrap();
        assert_eq!(range.max, 15000.0);

        let range: BudgetRange = "10000円前後".parse().unwrap();
        assert_eq!(range, BudgetRange { min: 5000.0, max: 15000.0 });
    }

    #[test]
    fn rejects_unparseable_or_inverted_budget() {
        assert!("予算未定".parse::<BudgetRange>().is_err());
        assert!(BudgetRange::new(500.0, 100.0).is_err());
        assert!(BudgetRange::new(f64::NAN, 100.0).is_err());
    }

    #[test]
    fn article_without_keywords_is_invalid() {
        let mut a = article();
        assert!(a.validate().is_ok());

        a.target_keywords = None;
        let err = a.validate().unwrap_err();
        assert!(matches!(err, OkurimonoError::InvalidArticle(_)));
    }

    #[test]
    fn article_with_bad_budget_is_invalid() {
        let mut a = article();
        a.budget_range = Some(BudgetSpec::Text("ask the editor".into()));
        assert!(matches!(
            a.validate().unwrap_err(),
            OkurimonoError::InvalidArticle(_)
        ));
    }

    #[test]
    fn budget_deserializes_from_pair_or_text() {
        let a: Article =
            serde_json::from_str(r#"{"id":"x","target_keywords":[],"budget_range":[1000,2000]}"#)
                .unwrap();
        assert_eq!(a.budget().unwrap().unwrap().max, 2000.0);

        let a: Article =
            serde_json::from_str(r#"{"id":"x","budget_range":"1000〜2000円"}"#).unwrap();
        assert_eq!(a.budget().unwrap().unwrap().min, 1000.0);
        assert!(a.target_keywords.is_none());

        let a: Article = serde_json::from_str(r#"{"id":"x","budget_range":8000}"#).unwrap();
        assert_eq!(
            a.budget().unwrap(),
            Some(BudgetRange { min: 4000.0, max: 12000.0 })
        );
    }

    #[test]
    fn product_validation() {
        let mut p = Product {
            id: "p-1".into(),
            name: "革財布".into(),
            price: 8000.0,
            ..Product::default()
        };
        assert!(p.validate().is_ok());

        p.price = -1.0;
        assert!(matches!(
            p.validate().unwrap_err(),
            OkurimonoError::ProductRecord(_)
        ));

        p.price = 10.0;
        p.name = "  ".into();
        assert!(p.validate().is_err());
    }
}
