//! Token filter implementations for token transformation.
//!
//! - [`lowercase::LowercaseFilter`] - Lowercases and folds full-width ASCII
//! - [`punctuation::PunctuationFilter`] - Strips punctuation and symbols
//! - [`stop::StopFilter`] - Removes English and Japanese stop words
//! - [`remove_empty::RemoveEmptyFilter`] - Drops empty and stopped tokens
//!
//! # Examples
//!
//! ```
//! use okurimono::analysis::token_filter::Filter;
//! use okurimono::analysis::token_filter::lowercase::LowercaseFilter;
//! use okurimono::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Ｇｉｆｔ", 0), Token::new("BOX", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "gift");
//! assert_eq!(filtered[1].text, "box");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter.
    fn name(&self) -> &'static str;
}

pub mod lowercase;
pub mod punctuation;
pub mod remove_empty;
pub mod stop;

pub use lowercase::LowercaseFilter;
pub use punctuation::PunctuationFilter;
pub use remove_empty::RemoveEmptyFilter;
pub use stop::StopFilter;
