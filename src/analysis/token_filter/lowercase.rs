//! Lowercase filter implementation.
//!
//! Besides lowercasing, the filter folds full-width ASCII forms
//! (U+FF01..=U+FF5E) and the ideographic space to their half-width
//! counterparts, so "Ｇｉｆｔ" and "gift" produce the same term.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    pub fn new() -> Self {
        LowercaseFilter
    }

    /// Fold full-width ASCII and lowercase the result.
    pub fn normalize(text: &str) -> String {
        text.chars()
            .map(|c| match c {
                '\u{FF01}'..='\u{FF5E}' => {
                    char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
                }
                '\u{3000}' => ' ',
                _ => c,
            })
            .flat_map(char::to_lowercase)
            .collect()
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    token
                } else {
                    let text = Self::normalize(&token.text);
                    token.with_text(text)
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_lowercase_filter() {
        let filter = LowercaseFilter::new();
        let tokens = vec![Token::new("Hello", 0), Token::new("WORLD", 1)];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert_eq!(result[0].text, "hello");
        assert_eq!(result[1].text, "world");
    }

    #[test]
    fn test_full_width_folding() {
        assert_eq!(LowercaseFilter::normalize("ＡＢＣ１２３"), "abc123");
        assert_eq!(LowercaseFilter::normalize("彼氏\u{3000}ギフト"), "彼氏 ギフト");
    }

    #[test]
    fn test_stopped_tokens_untouched() {
        let filter = LowercaseFilter::new();
        let tokens = vec![Token::new("KEEP", 0).stop()];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
        assert_eq!(result[0].text, "KEEP");
    }
}
