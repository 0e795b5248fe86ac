//! Analyzers combine a tokenizer with token filters.
//!
//! - [`PipelineAnalyzer`] - a tokenizer plus an ordered filter chain
//! - [`text_analyzer`] - words out of free text (titles, descriptions)
//! - [`label_analyzer`] - whole labels (keywords, tags, personas, scenes)
//!
//! # Examples
//!
//! ```
//! use okurimono::analysis::analyzer::{Analyzer, label_analyzer, text_analyzer};
//!
//! let words: Vec<_> = text_analyzer::<&str>(&[])
//!     .analyze("The Leather Wallet, for him!")
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(words, vec!["leather", "wallet", "him"]);
//!
//! let labels: Vec<_> = label_analyzer::<&str>(&[])
//!     .analyze("  20代・女性 ")
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(labels, vec!["20代 女性"]);
//! ```

pub mod pipeline;

use std::sync::Arc;

pub use pipeline::PipelineAnalyzer;

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{
    LowercaseFilter, PunctuationFilter, RemoveEmptyFilter, StopFilter,
};
use crate::analysis::tokenizer::{LabelTokenizer, UnicodeWordTokenizer};
use crate::error::Result;

/// Trait for complete text analysis pipelines.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer.
    fn name(&self) -> &str;
}

/// Word analyzer for free text.
///
/// Unicode word tokenization, lowercase, punctuation removal, stop words.
pub fn text_analyzer<S: AsRef<str>>(extra_stop_words: &[S]) -> PipelineAnalyzer {
    PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
        .add_filter(Arc::new(LowercaseFilter::new()))
        .add_filter(Arc::new(PunctuationFilter::removing()))
        .add_filter(Arc::new(StopFilter::with_extra_words(extra_stop_words)))
        .add_filter(Arc::new(RemoveEmptyFilter::new()))
        .with_name("text")
}

/// Label analyzer for keyword, tag and audience labels.
///
/// The label stays one token; punctuation runs become single spaces.
pub fn label_analyzer<S: AsRef<str>>(extra_stop_words: &[S]) -> PipelineAnalyzer {
    PipelineAnalyzer::new(Arc::new(LabelTokenizer::new()))
        .add_filter(Arc::new(LowercaseFilter::new()))
        .add_filter(Arc::new(PunctuationFilter::separating()))
        .add_filter(Arc::new(StopFilter::with_extra_words(extra_stop_words)))
        .add_filter(Arc::new(RemoveEmptyFilter::new()))
        .with_name("label")
}
