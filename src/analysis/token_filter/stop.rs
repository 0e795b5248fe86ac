//! Stop filter implementation.
//!
//! Removes function words that carry no matching signal. The default list
//! combines common English words with Japanese particles and auxiliaries;
//! extra words can be added from configuration.
//!
//! # Examples
//!
//! ```
//! use okurimono::analysis::token_filter::Filter;
//! use okurimono::analysis::token_filter::stop::StopFilter;
//! use okurimono::analysis::token::Token;
//!
//! let filter = StopFilter::new();
//! let tokens = vec![Token::new("the", 0), Token::new("gift", 1), Token::new("の", 2)];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
//!
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0].text, "gift");
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

const JAPANESE_STOP_WORDS: &[&str] = &[
    "の", "に", "は", "を", "た", "が", "で", "て", "と", "し", "れ", "さ", "ある", "いる", "も",
    "する", "から", "な", "こと", "として", "い", "や", "れる", "など", "なっ", "ない", "この",
    "ため", "その", "あっ", "よう", "また", "もの", "という", "あり", "まで", "られ", "なる", "へ",
    "か", "だ", "これ", "によって", "により", "おり", "より", "による", "ず", "なり", "られる",
    "において", "ば", "なかっ", "なく", "しかし", "について", "せ", "だっ", "できる", "それ", "う",
    "ので", "なお", "のみ", "でき", "き", "つ", "における", "および", "いう", "さらに", "でも",
    "ら", "たり", "たち", "ます", "ん", "なら", "特に", "せる", "及び", "これら", "とき", "では",
    "にて", "ほか", "ながら", "うち", "そして", "ただし", "それぞれ", "または", "お", "ほど",
    "ものの", "ほとんど", "といった", "です", "とも", "ところ", "ここ",
];

/// Default stop words (English and Japanese) as a HashSet.
pub static DEFAULT_STOP_WORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    ENGLISH_STOP_WORDS
        .iter()
        .chain(JAPANESE_STOP_WORDS.iter())
        .map(|&s| s.to_string())
        .collect()
});

/// A filter that removes stop words from the token stream.
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: Arc<HashSet<String>>,
}

impl StopFilter {
    /// Create a filter using the default English and Japanese lists.
    pub fn new() -> Self {
        StopFilter {
            stop_words: Arc::new(DEFAULT_STOP_WORDS.clone()),
        }
    }

    /// Create a filter with the default lists plus `extra` words.
    pub fn with_extra_words<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stop_words = DEFAULT_STOP_WORDS.clone();
        stop_words.extend(extra.into_iter().map(|s| s.as_ref().to_lowercase()));
        StopFilter {
            stop_words: Arc::new(stop_words),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stop_words = Arc::clone(&self.stop_words);
        let filtered_tokens = tokens
            .filter(|token| token.is_stopped() || !stop_words.contains(&token.text))
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
