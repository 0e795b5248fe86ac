//! Tokenizer implementations for text analysis.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    fn name(&self) -> &'static str;
}

pub mod label;
pub mod unicode_word;

pub use label::LabelTokenizer;
pub use unicode_word::UnicodeWordTokenizer;
