//! Season buckets and the per-season keyword lexicon.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::OkurimonoError;

/// One of four fixed, month-bounded seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// Mar–May spring, Jun–Aug summer, Sep–Nov autumn, Dec–Feb winter.
    pub fn from_month(month: u32) -> Season {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

/// Season of `reference_date`, or of today's local date when absent.
pub fn current_season(reference_date: Option<NaiveDate>) -> Season {
    let date = reference_date.unwrap_or_else(|| Local::now().date_naive());
    Season::from_month(date.month())
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Season {
    type Err = OkurimonoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spring" | "春" => Ok(Season::Spring),
            "summer" | "夏" => Ok(Season::Summer),
            "autumn" | "fall" | "秋" => Ok(Season::Autumn),
            "winter" | "冬" => Ok(Season::Winter),
            other => Err(OkurimonoError::invalid_argument(format!(
                "unknown season {other:?}"
            ))),
        }
    }
}

/// Words that count as "in season" for each season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalLexicon {
    pub spring: Vec<String>,
    pub summer: Vec<String>,
    pub autumn: Vec<String>,
    pub winter: Vec<String>,
}

impl SeasonalLexicon {
    pub fn words(&self, season: Season) -> &[String] {
        match season {
            Season::Spring => &self.spring,
            Season::Summer => &self.summer,
            Season::Autumn => &self.autumn,
            Season::Winter => &self.winter,
        }
    }
}

impl Default for SeasonalLexicon {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect();
        Self {
            spring: words(&["春", "桜", "新生活", "入学", "卒業"]),
            summer: words(&["夏", "暑中見舞い", "お中元", "夏休み"]),
            autumn: words(&["秋", "お歳暮", "ハロウィン", "紅葉"]),
            winter: words(&["冬", "クリスマス", "年末", "バレンタイン"]),
        }
    }
}
