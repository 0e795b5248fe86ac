//! Label tokenizer: the whole input is one token.
//!
//! Keyword, tag, persona and scene labels ("20代女性", "誕生日") are compared
//! as units, so they must not be split on word boundaries.

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct LabelTokenizer;

impl LabelTokenizer {
    pub fn new() -> Self {
        LabelTokenizer
    }
}

impl Tokenizer for LabelTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        if text.trim().is_empty() {
            Ok(Box::new(std::iter::empty()))
        } else {
            let token =
                Token::with_offsets(text, 0, 0, text.len()).with_token_type(TokenType::Label);
            Ok(Box::new(std::iter::once(token)))
        }
    }

    fn name(&self) -> &'static str {
        "label"
    }
}
