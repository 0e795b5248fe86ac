//! Text analysis for feature extraction.
//!
//! Raw article and product text passes through a tokenizer and a chain of
//! token filters before it reaches the vector space:
//!
//! ```text
//! Raw Text → Tokenizer → Lowercase → Punctuation → Stop Words → Remove Empty
//! ```
//!
//! Two analyzers are built from these parts (see [`analyzer`]): one splits
//! free text into words, the other keeps a keyword or tag label whole.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, PipelineAnalyzer};
pub use token::{Token, TokenStream, TokenType};
pub use token_filter::Filter;
pub use tokenizer::Tokenizer;
