//! Error types for the Linkfeat SDK

use crate::models::AuthorId;
use thiserror::Error;

/// Errors that can occur when talking to the graph
#[derive(Error, Debug)]
pub enum GraphError {
    /// Query rejected or failed on the server
    #[error("Query error: {0}")]
    QueryError(String),

    /// Backend unreachable, unauthorized or unhealthy
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O error (snapshot loading)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A result row did not have the expected shape
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    /// No link-prediction scores were returned for a pair
    #[error("No link features for pair ({node1}, {node2})")]
    MissingLinkFeatures { node1: AuthorId, node2: AuthorId },
}

impl GraphError {
    /// True when the backend itself is unusable, as opposed to one bad query.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, GraphError::ConnectionError(_) | GraphError::HttpError(_))
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
