//! Pipeline error types

use crate::config::ConfigError;
use crate::dataset::DatasetError;
use crate::documents::DocumentError;
use linkfeat_sdk::{AuthorId, GraphError};
use linkfeat_text::VocabularyError;
use thiserror::Error;

/// Errors raised while computing features
#[derive(Error, Debug)]
pub enum FeatureError {
    /// Vocabulary construction failed (e.g. empty corpus)
    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// The graph references a document the store does not have
    #[error("Document {key} of author {author} not found")]
    DocumentNotFound { key: String, author: AuthorId },

    /// Any other document store failure
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Graph backend failure
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Pair table failure
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FeatureError {
    /// Fatal errors stop the whole run; everything else only fails one split.
    pub fn is_fatal(&self) -> bool {
        match self {
            FeatureError::Graph(e) => e.is_unavailable(),
            FeatureError::Document(DocumentError::StoreUnavailable(_)) => true,
            FeatureError::Config(_) => true,
            _ => false,
        }
    }
}

pub type FeatureResult<T> = Result<T, FeatureError>;
