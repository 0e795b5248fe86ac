//! Human-readable reasons for a match.

use crate::model::Product;
use crate::recommend::config::{FactorWeights, SignificanceThresholds};
use crate::recommend::factors::{Factor, FactorScores};

/// Finite values of one catalog signal, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalDistribution {
    sorted: Vec<f64>,
}

impl SignalDistribution {
    pub fn new<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        SignalDistribution { sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Number of catalog values strictly below `value`.
    pub fn count_below(&self, value: f64) -> usize {
        self.sorted.partition_point(|v| *v < value)
    }

    /// Whether a positive `value` is strictly greater than at least
    /// `ceil(quantile × n)` catalog values.
    ///
    /// A catalog where every product has the same value has no top products.
    pub fn is_top(&self, value: f64, quantile: f64) -> bool {
        if !value.is_finite() || value <= 0.0 || self.sorted.is_empty() {
            return false;
        }
        let needed = (quantile.clamp(0.0, 1.0) * self.sorted.len() as f64).ceil() as usize;
        self.count_below(value) >= needed.max(1)
    }
}

/// Catalog-level distributions of popularity and conversion, used to decide
/// which products are worth calling out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalCutoffs {
    pub popularity: SignalDistribution,
    pub conversion: SignalDistribution,
}

impl SignalCutoffs {
    pub fn from_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a Product>,
        I::IntoIter: Clone,
    {
        let products = products.into_iter();
        SignalCutoffs {
            popularity: SignalDistribution::new(products.clone().map(|p| p.popularity_score)),
            conversion: SignalDistribution::new(products.map(|p| p.conversion_rate)),
        }
    }
}

fn description(factor: Factor) -> &'static str {
    match factor {
        Factor::Keyword => "article keywords appear in the product text",
        Factor::Persona => "product targets the article's audience",
        Factor::Scene => "product suits the article's occasion",
        Factor::Budget => "price fits the article's budget",
        Factor::Seasonal => "product is in season",
        Factor::Popularity => "one of the most popular products in the catalog",
        Factor::Conversion => "one of the best-converting products in the catalog",
    }
}

/// Whether `factor` is strong enough to explain.
pub fn is_significant(
    factor: Factor,
    scores: &FactorScores,
    product: &Product,
    thresholds: &SignificanceThresholds,
    cutoffs: &SignalCutoffs,
) -> bool {
    if !factor.is_signal() {
        return scores.get(factor) >= thresholds.get(factor);
    }
    match factor {
        Factor::Popularity => cutoffs
            .popularity
            .is_top(product.popularity_score, thresholds.popularity_quantile),
        Factor::Conversion => cutoffs
            .conversion
            .is_top(product.conversion_rate, thresholds.conversion_quantile),
        _ => false,
    }
}

/// Reasons for every significant factor, largest contribution first.
pub fn match_reasons(
    scores: &FactorScores,
    product: &Product,
    weights: &FactorWeights,
    thresholds: &SignificanceThresholds,
    cutoffs: &SignalCutoffs,
) -> Vec<String> {
    let mut significant: Vec<(Factor, f64)> = Factor::ALL
        .into_iter()
        .filter(|f| is_significant(*f, scores, product, thresholds, cutoffs))
        .map(|f| (f, weights.get(f) * scores.get(f)))
        .collect();

    // stable: equal contributions keep factor order
    significant.sort_by(|a, b| b.1.total_cmp(&a.1));

    significant
        .into_iter()
        .map(|(factor, _)| {
            format!(
                "{}: {} ({:.2})",
                factor.label(),
                description(factor),
                scores.get(factor)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(popularity: f64, conversion: f64) -> Product {
        Product {
            id: "p".into(),
            name: "p".into(),
            price: 1.0,
            popularity_score: popularity,
            conversion_rate: conversion,
            ..Product::default()
        }
    }

    #[test]
    fn distribution_counts_strictly_smaller_values() {
        let values = SignalDistribution::new(vec![4.0, 1.0, f64::NAN, 3.0, 2.0, 3.0]);
        assert_eq!(values.len(), 5);
        assert_eq!(values.count_below(3.0), 2);
        assert_eq!(values.count_below(3.5), 4);
        assert_eq!(values.count_below(0.5), 0);

        assert!(values.is_top(4.0, 0.75));
        assert!(!values.is_top(3.0, 0.75));
        assert!(!SignalDistribution::new(vec![5.0]).is_top(5.0, 0.75));
        assert!(!SignalDistribution::default().is_top(5.0, 0.75));
    }

    #[test]
    fn reasons_follow_contribution_order() {
        let scores = FactorScores {
            keyword: 0.8,
            persona: 1.0,
            scene: 0.5,
            budget: 1.0,
            seasonal: 1.0,
            popularity: 0.0,
            conversion: 0.0,
        };
        let reasons = match_reasons(
            &scores,
            &product(0.0, 0.0),
            &FactorWeights::default(),
            &SignificanceThresholds::default(),
            &SignalCutoffs::default(),
        );
        assert_eq!(reasons.len(), 4);
        assert!(reasons[0].starts_with("keyword match"));
        assert_eq!(reasons[1], "persona match: product targets the article's audience (1.00)");
        assert!(reasons[2].starts_with("budget match"));
        assert!(reasons[3].starts_with("seasonal match"));
    }

    #[test]
    fn signals_need_top_quartile_and_nonzero() {
        let catalog = [
            product(10.0, 0.0),
            product(20.0, 0.0),
            product(30.0, 0.0),
            product(90.0, 0.0),
        ];
        let thresholds = SignificanceThresholds::default();
        let cutoffs = SignalCutoffs::from_products(catalog.iter());

        let scores = FactorScores::default();
        assert!(is_significant(Factor::Popularity, &scores, &catalog[3], &thresholds, &cutoffs));
        assert!(!is_significant(Factor::Popularity, &scores, &catalog[2], &thresholds, &cutoffs));
        assert!(!is_significant(Factor::Popularity, &scores, &catalog[0], &thresholds, &cutoffs));
        assert!(!is_significant(Factor::Conversion, &scores, &catalog[3], &thresholds, &cutoffs));

        let uniform = vec![product(5.0, 5.0); 8];
        let cutoffs = SignalCutoffs::from_products(uniform.iter());
        for item in &uniform {
            assert!(!is_significant(Factor::Popularity, &scores, item, &thresholds, &cutoffs));
            assert!(!is_significant(Factor::Conversion, &scores, item, &thresholds, &cutoffs));
        }
    }
}
