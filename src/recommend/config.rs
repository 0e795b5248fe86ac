//! Configuration for the recommendation engine.
//!
//! Everything tunable lives here and is validated once, when the engine is
//! constructed. Configurations load from TOML; every field has a default so
//! a file only needs the values it changes.
//!
//! ```toml
//! default_limit = 5
//!
//! [weights]
//! keyword = 0.4
//! persona = 0.2
//! scene = 0.1
//! budget = 0.1
//! seasonal = 0.1
//! popularity = 0.05
//! conversion = 0.05
//!
//! [calibration]
//! kind = "linear"
//! factor = 1.2
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OkurimonoError, Result};
use crate::feature::{AnalyzerConfig, SeasonalLexicon};
use crate::recommend::factors::{Factor, FactorScores, clamp_unit};

/// Tolerance for the weight-sum check.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weight of each factor in the composite match score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub keyword: f64,
    pub persona: f64,
    pub scene: f64,
    pub budget: f64,
    pub seasonal: f64,
    pub popularity: f64,
    pub conversion: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        FactorWeights {
            keyword: 0.30,
            persona: 0.20,
            scene: 0.20,
            budget: 0.10,
            seasonal: 0.10,
            popularity: 0.05,
            conversion: 0.05,
        }
    }
}

impl FactorWeights {
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Keyword => self.keyword,
            Factor::Persona => self.persona,
            Factor::Scene => self.scene,
            Factor::Budget => self.budget,
            Factor::Seasonal => self.seasonal,
            Factor::Popularity => self.popularity,
            Factor::Conversion => self.conversion,
        }
    }

    pub fn sum(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.get(*f)).sum()
    }

    /// Fails unless every weight is finite and non-negative and the weights
    /// sum to 1 within [`WEIGHT_SUM_TOLERANCE`].
    pub fn validate(&self) -> Result<()> {
        for factor in Factor::ALL {
            let weight = self.get(factor);
            if !weight.is_finite() || weight < 0.0 {
                return Err(OkurimonoError::configuration(format!(
                    "weight for {factor} must be finite and non-negative, got {weight}"
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(OkurimonoError::configuration(format!(
                "factor weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }

    /// Rescale so the weights sum to 1.
    pub fn normalized(&self) -> Result<Self> {
        let sum = self.sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Err(OkurimonoError::configuration(format!(
                "cannot normalize weights summing to {sum}"
            )));
        }
        let normalized = FactorWeights {
            keyword: self.keyword / sum,
            persona: self.persona / sum,
            scene: self.scene / sum,
            budget: self.budget / sum,
            seasonal: self.seasonal / sum,
            popularity: self.popularity / sum,
            conversion: self.conversion / sum,
        };
        normalized.validate()?;
        Ok(normalized)
    }

    /// Weighted sum of `scores`, clamped to `[0, 1]`.
    pub fn combine(&self, scores: &FactorScores) -> f64 {
        clamp_unit(scores.iter().map(|(factor, score)| self.get(factor) * score).sum())
    }
}

/// When a factor earns a line in `match_reasons`.
///
/// Match factors qualify when their score reaches the threshold. Popularity
/// and conversion qualify when the product's raw value is non-zero and
/// strictly greater than at least the given fraction of catalog values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceThresholds {
    pub keyword: f64,
    pub persona: f64,
    pub scene: f64,
    pub budget: f64,
    pub seasonal: f64,
    pub popularity_quantile: f64,
    pub conversion_quantile: f64,
}

impl Default for SignificanceThresholds {
    fn default() -> Self {
        SignificanceThresholds {
            keyword: 0.7,
            persona: 0.7,
            scene: 0.7,
            budget: 0.7,
            seasonal: 0.7,
            popularity_quantile: 0.75,
            conversion_quantile: 0.75,
        }
    }
}

impl SignificanceThresholds {
    /// Score threshold for a match factor, quantile for a signal factor.
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Keyword => self.keyword,
            Factor::Persona => self.persona,
            Factor::Scene => self.scene,
            Factor::Budget => self.budget,
            Factor::Seasonal => self.seasonal,
            Factor::Popularity => self.popularity_quantile,
            Factor::Conversion => self.conversion_quantile,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for factor in Factor::ALL {
            let value = self.get(factor);
            if !(0.0..=1.0).contains(&value) {
                return Err(OkurimonoError::configuration(format!(
                    "significance threshold for {factor} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetPolicy {
    /// Distance outside the range, as a multiple of its width, at which the
    /// budget score reaches 0.
    pub decay_width_ratio: f64,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        BudgetPolicy {
            decay_width_ratio: 1.0,
        }
    }
}

/// Mapping from match score to confidence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfidenceCalibration {
    /// Confidence equals the match score.
    #[default]
    Identity,
    /// `min(score * factor, 1)`.
    Linear { factor: f64 },
}

impl ConfidenceCalibration {
    pub fn apply(&self, score: f64) -> f64 {
        match self {
            ConfidenceCalibration::Identity => clamp_unit(score),
            ConfidenceCalibration::Linear { factor } => clamp_unit(score * factor),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ConfidenceCalibration::Identity => Ok(()),
            ConfidenceCalibration::Linear { factor } if factor.is_finite() && *factor > 0.0 => {
                Ok(())
            }
            ConfidenceCalibration::Linear { factor } => Err(OkurimonoError::configuration(
                format!("linear calibration factor must be positive, got {factor}"),
            )),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub weights: FactorWeights,

    /// Rescale `weights` to sum to 1 instead of rejecting them.
    pub normalize_weights: bool,

    pub thresholds: SignificanceThresholds,
    pub budget: BudgetPolicy,
    pub calibration: ConfidenceCalibration,
    pub seasonal_lexicon: SeasonalLexicon,

    /// Multipliers applied to keyword similarity when the article targets
    /// the keyword.
    pub keyword_boosts: BTreeMap<String, f64>,

    pub analyzer: AnalyzerConfig,

    /// Result cap used when a caller does not pass one.
    pub default_limit: usize,

    /// Confidence threshold used when a caller does not pass one.
    pub default_min_confidence: f64,

    /// Worker threads for batch scoring. If None, uses the number of CPU cores.
    pub num_threads: Option<usize>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        RecommendationConfig {
            weights: FactorWeights::default(),
            normalize_weights: false,
            thresholds: SignificanceThresholds::default(),
            budget: BudgetPolicy::default(),
            calibration: ConfidenceCalibration::default(),
            seasonal_lexicon: SeasonalLexicon::default(),
            keyword_boosts: default_keyword_boosts(),
            analyzer: AnalyzerConfig::default(),
            default_limit: 10,
            default_min_confidence: 0.6,
            num_threads: None,
        }
    }
}

/// Gift-occasion, relationship and category keywords.
pub fn default_keyword_boosts() -> BTreeMap<String, f64> {
    [
        ("誕生日プレゼント", 1.0),
        ("クリスマスギフト", 1.0),
        ("バレンタインデー", 1.0),
        ("母の日", 1.0),
        ("父の日", 1.0),
        ("卒業祝い", 0.9),
        ("入学祝い", 0.9),
        ("彼氏", 1.0),
        ("彼女", 1.0),
        ("上司", 0.8),
        ("同僚", 0.8),
        ("友達", 0.9),
        ("子供", 0.9),
        ("両親", 0.9),
        ("スイーツ", 1.0),
        ("コスメ", 1.0),
        ("花束", 1.0),
        ("お酒", 0.9),
        ("雑貨", 0.8),
        ("インテリア", 0.8),
    ]
    .into_iter()
    .map(|(keyword, boost)| (keyword.to_string(), boost))
    .collect()
}

impl RecommendationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.thresholds.validate()?;
        self.calibration.validate()?;
        self.analyzer.validate()?;

        if !self.budget.decay_width_ratio.is_finite() || self.budget.decay_width_ratio < 0.0 {
            return Err(OkurimonoError::configuration(format!(
                "decay_width_ratio must be finite and non-negative, got {}",
                self.budget.decay_width_ratio
            )));
        }
        for (keyword, boost) in &self.keyword_boosts {
            if !boost.is_finite() || *boost < 0.0 {
                return Err(OkurimonoError::configuration(format!(
                    "boost for {keyword:?} must be finite and non-negative, got {boost}"
                )));
            }
        }
        if self.default_limit == 0 {
            return Err(OkurimonoError::configuration("default_limit must be positive"));
        }
        if !(0.0..=1.0).contains(&self.default_min_confidence) {
            return Err(OkurimonoError::configuration(format!(
                "default_min_confidence must be in [0, 1], got {}",
                self.default_min_confidence
            )));
        }
        if self.num_threads == Some(0) {
            return Err(OkurimonoError::configuration("num_threads must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RecommendationConfig::default();
        config.validate().unwrap();
        assert!((config.weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert_eq!(config.keyword_boosts.get("上司"), Some(&0.8));
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let weights = FactorWeights {
            keyword: 0.5,
            ..FactorWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(OkurimonoError::Configuration(_))
        ));

        let within_tolerance = FactorWeights {
            keyword: 0.30 + 1e-8,
            ..FactorWeights::default()
        };
        assert!(within_tolerance.validate().is_ok());
    }

    #[test]
    fn rejects_negative_or_nan_weights() {
        let negative = FactorWeights {
            keyword: 0.6,
            persona: -0.1,
            scene: 0.1,
            ..FactorWeights::default()
        };
        assert!(negative.validate().is_err());

        let nan = FactorWeights {
            keyword: f64::NAN,
            ..FactorWeights::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn normalized_weights_sum_to_one() {
        let weights = FactorWeights {
            keyword: 3.0,
            persona: 2.0,
            scene: 2.0,
            budget: 1.0,
            seasonal: 1.0,
            popularity: 0.5,
            conversion: 0.5,
        };
        let normalized = weights.normalized().unwrap();
        assert!((normalized.sum() - 1.0).abs() < 1e-12);
        assert!((normalized.keyword - 0.3).abs() < 1e-12);

        let zero = FactorWeights {
            keyword: 0.0,
            persona: 0.0,
            scene: 0.0,
            budget: 0.0,
            seasonal: 0.0,
            popularity: 0.0,
            conversion: 0.0,
        };
        assert!(zero.normalized().is_err());
    }

    #[test]
    fn calibration_is_monotonic_and_clamped() {
        let linear = ConfidenceCalibration::Linear { factor: 1.2 };
        assert!((linear.apply(0.5) - 0.6).abs() < 1e-12);
        assert_eq!(linear.apply(0.9), 1.0);
        assert_eq!(ConfidenceCalibration::Identity.apply(0.42), 0.42);
        assert!(ConfidenceCalibration::Linear { factor: 0.0 }.validate().is_err());
    }

    #[test]
    fn loads_partial_toml() {
        let config = RecommendationConfig::from_toml_str(
            r#"
            default_limit = 5

            [calibration]
            kind = "linear"
            factor = 1.2

            [analyzer]
            max_features = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.calibration, ConfidenceCalibration::Linear { factor: 1.2 });
        assert_eq!(config.analyzer.max_features, Some(1000));
        assert_eq!(config.analyzer.ngram_max, 2);
        assert_eq!(config.weights, FactorWeights::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            RecommendationConfig::from_toml_str("default_limit = \"ten\""),
            Err(OkurimonoError::Toml(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("okurimono.toml");
        std::fs::write(&path, "default_min_confidence = 0.4\n").unwrap();
        let config = RecommendationConfig::from_file(&path).unwrap();
        assert_eq!(config.default_min_confidence, 0.4);
    }
}
