//! Token types for text analysis.
//!
//! A [`Token`] is one unit of analyzed text. Tokens flow through the analysis
//! pipeline as a [`TokenStream`], a boxed iterator that each filter consumes
//! and replaces.
//!
//! # Examples
//!
//! ```
//! use okurimono::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("ギフト", 0, 0, 9).with_token_type(TokenType::Katakana);
//! assert_eq!(token.text, "ギフト");
//! assert_eq!(token.token_type, Some(TokenType::Katakana));
//! assert!(!token.is_stopped());
//! ```

use serde::{Deserialize, Serialize};

/// A single analyzed token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The token text after any filtering.
    pub text: String,

    /// Position of the token in the token sequence.
    pub position: usize,

    /// Byte offset of the token start in the original text.
    pub start_offset: usize,

    /// Byte offset of the token end in the original text.
    pub end_offset: usize,

    /// Marked for removal by a filter.
    pub stopped: bool,

    /// Script classification assigned by the tokenizer.
    pub token_type: Option<TokenType>,
}

/// Classification of token content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    Alphanum,
    Num,
    Cjk,
    Katakana,
    Hiragana,
    Hangul,
    Label,
    Other,
}

impl TokenType {
    /// Scripts written without spaces between words.
    ///
    /// Adjacent tokens of these types are joined without a separator when
    /// bigrams are formed.
    pub fn is_unspaced(&self) -> bool {
        matches!(
            self,
            TokenType::Cjk | TokenType::Katakana | TokenType::Hiragana
        )
    }
}

impl Token {
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Self::with_offsets(text, position, 0, 0)
    }

    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
            token_type: None,
        }
    }

    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = Some(token_type);
        self
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A stream of tokens passed between tokenizer and filters.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;
