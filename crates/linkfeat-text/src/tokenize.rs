//! Text tokenization
//!
//! Two tokenizers live here and they are intentionally different:
//!
//! - [`Tokenizer`] is the corpus tokenizer used to fit TF-IDF. It splits on
//!   Unicode word boundaries, folds case, drops stopwords, numbers and short
//!   fragments.
//! - [`whitespace_tokens`] is the cheap tokenizer used when matching an
//!   author's papers against an already-built vocabulary: lowercase and split
//!   on whitespace, nothing else.

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// English stopwords plus contraction remnants and filler words common in
/// paper abstracts.
pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your",
    "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she",
    "her", "hers", "herself", "it", "its", "itself", "they", "them", "their",
    "theirs", "themselves", "what", "which", "who", "whom", "this", "that",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being",
    "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of",
    "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some",
    "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
    "very", "s", "t", "can", "will", "just", "don", "should", "now", "d",
    "ll", "m", "o", "re", "ve", "y", "ain", "aren", "couldn", "didn",
    "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
    "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
    // contraction remnants and fillers
    "dont", "didnt", "doesnt", "arent", "aint", "hadnt", "hasnt", "may",
    "mightve", "couldnt", "shouldnt", "shouldnot", "shouldntve", "mustnt",
    "would", "woulda", "wouldany", "wouldnot", "woudnt", "wouldve", "must",
    "could", "ive", "cant", "thats", "isnt", "youre", "wont", "subject",
    "hes", "etc", "edu", "com", "org",
];

/// Corpus tokenizer settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TokenizerConfig {
    /// Tokens shorter than this (in chars) are dropped
    pub min_token_len: usize,
    /// Drop entries of [`STOP_WORDS`]
    pub remove_stopwords: bool,
    /// Drop tokens made only of digits and numeric separators
    pub drop_numeric: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            remove_stopwords: true,
            drop_numeric: true,
        }
    }
}

impl TokenizerConfig {
    /// Keep every word of two or more characters, like a stock TF-IDF
    /// vectorizer with no stopword list.
    pub fn plain() -> Self {
        Self {
            min_token_len: 2,
            remove_stopwords: false,
            drop_numeric: false,
        }
    }
}

/// Corpus tokenizer
#[derive(Debug, Clone)]
pub struct Tokenizer {
    config: TokenizerConfig,
    stop_words: HashSet<&'static str>,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        let stop_words = if config.remove_stopwords {
            STOP_WORDS.iter().copied().collect()
        } else {
            HashSet::new()
        };
        Self { config, stop_words }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Split text into normalized tokens, in order of appearance.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .filter_map(|word| {
                let token = normalize(word);
                self.keep(&token).then_some(token)
            })
            .collect()
    }

    fn keep(&self, token: &str) -> bool {
        if token.chars().count() < self.config.min_token_len {
            return false;
        }
        if self.config.drop_numeric && is_numeric(token) {
            return false;
        }
        !self.stop_words.contains(token)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

/// Lowercase and split on whitespace. No other normalization.
pub fn whitespace_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(str::to_lowercase)
}

fn normalize(word: &str) -> String {
    // Apostrophes join contractions ("don't" -> "dont") instead of splitting them
    word.chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | '"'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_numeric(token: &str) -> bool {
    token.chars().any(|c| c.is_numeric())
        && token.chars().all(|c| c.is_numeric() || c == '.' || c == ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tokenizer_cleans_text() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize("The Graph-based models don't fail in 2020, do they?");
        assert_eq!(tokens, vec!["graph", "based", "models", "fail"]);
    }

    #[test]
    fn test_plain_tokenizer_keeps_stopwords() {
        let tokenizer = Tokenizer::new(TokenizerConfig::plain());
        let tokens = tokenizer.tokenize("The 42 nets of a graph");
        assert_eq!(tokens, vec!["the", "42", "nets", "of", "graph"]);
    }

    #[test]
    fn test_whitespace_tokens_keep_punctuation() {
        let tokens: Vec<String> = whitespace_tokens("Neural  Graph,\tNetworks\n").collect();
        assert_eq!(tokens, vec!["neural", "graph,", "networks"]);
    }
}
