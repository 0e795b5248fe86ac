//! The seven scoring factors and their pure scoring functions.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::BudgetRange;

/// A scoring factor, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Keyword,
    Persona,
    Scene,
    Budget,
    Seasonal,
    Popularity,
    Conversion,
}

impl Factor {
    pub const ALL: [Factor; 7] = [
        Factor::Keyword,
        Factor::Persona,
        Factor::Scene,
        Factor::Budget,
        Factor::Seasonal,
        Factor::Popularity,
        Factor::Conversion,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Factor::Keyword => "keyword match",
            Factor::Persona => "persona match",
            Factor::Scene => "scene match",
            Factor::Budget => "budget match",
            Factor::Seasonal => "seasonal match",
            Factor::Popularity => "popularity",
            Factor::Conversion => "conversion rate",
        }
    }

    /// Whether the factor is a catalog-relative performance signal rather
    /// than an article/product match.
    pub fn is_signal(&self) -> bool {
        matches!(self, Factor::Popularity | Factor::Conversion)
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-factor scores of one article/product pair, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub keyword: f64,
    pub persona: f64,
    pub scene: f64,
    pub budget: f64,
    pub seasonal: f64,
    pub popularity: f64,
    pub conversion: f64,
}

impl FactorScores {
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

    /// Clamp every score into `[0, 1]`.
    pub fn clamped(self) -> Self {
        FactorScores {
            keyword: clamp_unit(self.keyword),
            persona: clamp_unit(self.persona),
            scene: clamp_unit(self.scene),
            budget: clamp_unit(self.budget),
            seasonal: clamp_unit(self.seasonal),
            popularity: clamp_unit(self.popularity),
            conversion: clamp_unit(self.conversion),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        Factor::ALL.into_iter().map(move |factor| (factor, self.get(factor)))
    }
}

/// Clamp into `[0, 1]`; NaN becomes 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// `|A ∩ B| / |A ∪ B|`, with 1.0 for two empty sets and 0.0 when exactly
/// one is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let intersection = a.intersection(b).count();
            let union = a.len() + b.len() - intersection;
            intersection as f64 / union as f64
        }
    }
}

/// 1.0 inside the range, falling linearly to 0 over `decay_ratio` × width
/// outside it.
///
/// A zero-width range decays over `decay_ratio` × max instead; when that is
/// also zero any price outside the range scores 0.
pub fn budget_match(budget: Option<&BudgetRange>, price: f64, decay_ratio: f64) -> f64 {
    let Some(range) = budget else {
        return 1.0;
    };
    if range.contains(price) {
        return 1.0;
    }

    let span = if range.width() > 0.0 {
        range.width()
    } else {
        range.max
    } * decay_ratio;
    if span <= 0.0 {
        return 0.0;
    }

    let distance = if price > range.max {
        price - range.max
    } else {
        range.min - price
    };
    clamp_unit(1.0 - distance / span)
}

/// 1.0 when the product has no seasonal restriction or shares a label with
/// `in_season`.
pub fn seasonal_match(product_seasons: &BTreeSet<String>, in_season: &BTreeSet<String>) -> f64 {
    if product_seasons.is_empty() || !product_seasons.is_disjoint(in_season) {
        1.0
    } else {
        0.0
    }
}

/// `value / 100`, clamped.
pub fn percentage(value: f64) -> f64 {
    clamp_unit(value / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn jaccard_empty_set_convention() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 1.0);
        assert_eq!(jaccard(&set(&["a"]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&[]), &set(&["a"])), 0.0);
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["b", "c"])), 1.0 / 3.0);
        assert_eq!(jaccard(&set(&["a"]), &set(&["a"])), 1.0);
    }

    #[test]
    fn budget_inside_and_unconstrained() {
        let range = BudgetRange::new(3000.0, 15000.0).unwrap();
        assert_eq!(budget_match(None, 1e9, 1.0), 1.0);
        assert_eq!(budget_match(Some(&range), 3000.0, 1.0), 1.0);
        assert_eq!(budget_match(Some(&range), 15000.0, 1.0), 1.0);
    }

    #[test]
    fn budget_decays_linearly() {
        let range = BudgetRange::new(1000.0, 2000.0).unwrap();
        assert!((budget_match(Some(&range), 2500.0, 1.0) - 0.5).abs() < 1e-12);
        assert!((budget_match(Some(&range), 500.0, 1.0) - 0.5).abs() < 1e-12);
        assert_eq!(budget_match(Some(&range), 3000.0, 1.0), 0.0);
        assert_eq!(budget_match(Some(&range), 50000.0, 1.0), 0.0);
        assert!((budget_match(Some(&range), 2500.0, 2.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn budget_zero_width_range() {
        let range = BudgetRange::new(1000.0, 1000.0).unwrap();
        assert_eq!(budget_match(Some(&range), 1000.0, 1.0), 1.0);
        assert!((budget_match(Some(&range), 1500.0, 1.0) - 0.5).abs() < 1e-12);

        let free = BudgetRange::new(0.0, 0.0).unwrap();
        assert_eq!(budget_match(Some(&free), 0.0, 1.0), 1.0);
        assert_eq!(budget_match(Some(&free), 1.0, 1.0), 0.0);
    }

    #[test]
    fn seasonal_rules() {
        let in_season = set(&["winter", "クリスマス"]);
        assert_eq!(seasonal_match(&set(&[]), &in_season), 1.0);
        assert_eq!(seasonal_match(&set(&["クリスマス"]), &in_season), 1.0);
        assert_eq!(seasonal_match(&set(&["summer"]), &in_season), 0.0);
    }

    #[test]
    fn percentage_clamps() {
        assert_eq!(percentage(50.0), 0.5);
        assert_eq!(percentage(250.0), 1.0);
        assert_eq!(percentage(-3.0), 0.0);
        assert_eq!(percentage(f64::NAN), 0.0);
    }

    #[test]
    fn factor_scores_iterate_in_order() {
        let scores = FactorScores {
            keyword: 2.0,
            persona: -1.0,
            ..FactorScores::default()
        }
        .clamped();
        let collected: Vec<_> = scores.iter().collect();
        assert_eq!(collected[0], (Factor::Keyword, 1.0));
        assert_eq!(collected[1], (Factor::Persona, 0.0));
        assert_eq!(collected.len(), 7);
    }
}
