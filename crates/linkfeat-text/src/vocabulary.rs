//! Shared vocabulary type for term selection
//!
//! A vocabulary is the bounded set of normalized terms that decides which
//! tokens of an author's papers count as "important".

use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while building a vocabulary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    /// The corpus had no documents, or none of them produced a token
    #[error("Cannot build a vocabulary from an empty corpus")]
    EmptyCorpus,

    /// A zero-sized vocabulary was requested
    #[error("Invalid vocabulary size: {0}")]
    InvalidSize(usize),
}

pub type VocabularyResult<T> = Result<T, VocabularyError>;

/// A set of unique, normalized terms.
///
/// Order is irrelevant once constructed; only membership is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vocabulary {
    terms: HashSet<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a term belongs to the vocabulary
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn insert(&mut self, term: impl Into<String>) -> bool {
        self.terms.insert(term.into())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Terms in lexical order (for display and stable output)
    pub fn sorted_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.iter().collect();
        terms.sort_unstable();
        terms
    }

    pub fn as_set(&self) -> &HashSet<String> {
        &self.terms
    }
}

impl From<HashSet<String>> for Vocabulary {
    fn from(terms: HashSet<String>) -> Self {
        Self { terms }
    }
}

impl<S: Into<String>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Extend<String> for Vocabulary {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.terms.extend(iter);
    }
}
