//! Punctuation filter implementation.
//!
//! Removes Unicode punctuation and symbol characters (`\p{P}`, `\p{S}`) from
//! token text. In [`PunctuationMode::Remove`] the characters are dropped, which
//! suits single words; in [`PunctuationMode::Separate`] each run becomes a
//! single space and whitespace is collapsed, which suits multi-word labels.
//! A token left empty is marked stopped.

use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{P}\p{S}]+").expect("punctuation pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PunctuationMode {
    #[default]
    Remove,
    Separate,
}

#[derive(Clone, Debug, Default)]
pub struct PunctuationFilter {
    mode: PunctuationMode,
}

impl PunctuationFilter {
    pub fn new(mode: PunctuationMode) -> Self {
        PunctuationFilter { mode }
    }

    pub fn removing() -> Self {
        Self::new(PunctuationMode::Remove)
    }

    pub fn separating() -> Self {
        Self::new(PunctuationMode::Separate)
    }

    pub fn strip(&self, text: &str) -> String {
        match self.mode {
            PunctuationMode::Remove => PUNCTUATION.replace_all(text, "").trim().to_string(),
            PunctuationMode::Separate => {
                let spaced = PUNCTUATION.replace_all(text, " ");
                WHITESPACE.replace_all(spaced.trim(), " ").into_owned()
            }
        }
    }
}

impl Filter for PunctuationFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    return token;
                }
                let stripped = self.strip(&token.text);
                if stripped.is_empty() {
                    token.with_text(stripped).stop()
                } else {
                    token.with_text(stripped)
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "punctuation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_remove_mode() {
        let filter = PunctuationFilter::removing();
        assert_eq!(filter.strip("gift!"), "gift");
        assert_eq!(filter.strip("「誕生日」"), "誕生日");
    }

    #[test]
    fn test_separate_mode_collapses_whitespace() {
        let filter = PunctuationFilter::separating();
        assert_eq!(filter.strip("  彼氏・プレゼント !! "), "彼氏 プレゼント");
        assert_eq!(filter.strip("20代女性"), "20代女性");
    }

    #[test]
    fn test_punctuation_only_token_is_stopped() {
        let filter = PunctuationFilter::separating();
        let tokens = vec![Token::new("★☆", 0), Token::new("ok", 1)];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert!(result[0].is_stopped());
        assert!(result[0].is_empty());
        assert_eq!(result[1].text, "ok");
    }
}
