//! Unicode word tokenizer implementation.
//!
//! Splits text on Unicode word boundaries (UAX #29) and keeps only segments
//! containing at least one alphanumeric character. Katakana runs stay whole;
//! kanji and hiragana come out one character per token, which the feature
//! extractor later recombines into bigrams.
//!
//! # Examples
//!
//! ```
//! use okurimono::analysis::tokenizer::Tokenizer;
//! use okurimono::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
//!
//! let tokenizer = UnicodeWordTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Gift box, プレゼント!").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "Gift");
//! assert_eq!(tokens[1].text, "box");
//! assert_eq!(tokens[2].text, "プレゼント");
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct UnicodeWordTokenizer;

impl UnicodeWordTokenizer {
    pub fn new() -> Self {
        UnicodeWordTokenizer
    }

    pub(crate) fn detect_token_type(word: &str) -> TokenType {
        if word.is_empty() {
            return TokenType::Other;
        }

        if word.chars().all(|c| c.is_numeric()) {
            return TokenType::Num;
        }

        if word.chars().all(|c| matches!(c, '\u{3040}'..='\u{309F}')) {
            return TokenType::Hiragana;
        }

        // ー (U+30FC) is inside the katakana block
        if word.chars().all(|c| matches!(c, '\u{30A0}'..='\u{30FF}')) {
            return TokenType::Katakana;
        }

        if word
            .chars()
            .any(|c| matches!(c, '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}'))
        {
            return TokenType::Hangul;
        }

        if word.chars().any(|c| {
            matches!(c,
                '\u{4E00}'..='\u{9FFF}' |
                '\u{3400}'..='\u{4DBF}' |
                '\u{20000}'..='\u{2A6DF}'
            )
        }) {
            return TokenType::Cjk;
        }

        if word
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return TokenType::Alphanum;
        }

        TokenType::Other
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = text
            .split_word_bound_indices()
            .filter(|(_, word)| word.chars().any(|c| c.is_alphanumeric()))
            .enumerate()
            .map(|(position, (start, word))| {
                Token::with_offsets(word, position, start, start + word.len())
                    .with_token_type(Self::detect_token_type(word))
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_word_tokenizer() {
        let tokenizer = UnicodeWordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("hello, world!").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 5);
        assert_eq!(tokens[1].text, "world");
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].start_offset, 7);
    }

    #[test]
    fn test_japanese_scripts() {
        let tokenizer = UnicodeWordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("誕生日プレゼント").unwrap().collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert!(texts.contains(&"プレゼント"));
        assert!(texts.contains(&"誕"));

        let katakana = tokens.iter().find(|t| t.text == "プレゼント").unwrap();
        assert_eq!(katakana.token_type, Some(TokenType::Katakana));
    }

    #[test]
    fn test_detect_token_type() {
        assert_eq!(UnicodeWordTokenizer::detect_token_type("2024"), TokenType::Num);
        assert_eq!(UnicodeWordTokenizer::detect_token_type("gift"), TokenType::Alphanum);
        assert_eq!(UnicodeWordTokenizer::detect_token_type("の"), TokenType::Hiragana);
        assert_eq!(UnicodeWordTokenizer::detect_token_type("財"), TokenType::Cjk);
    }

    #[test]
    fn test_empty_text() {
        let tokenizer = UnicodeWordTokenizer::new();
        assert_eq!(tokenizer.tokenize("  ,.  ").unwrap().count(), 0);
    }
}
