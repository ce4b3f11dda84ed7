//! Paper text storage
//!
//! Papers live as JSON files under `{input_dir}/dataset/{key}.json` with a
//! `metadata.title` string and an `abstract` list of `{ "text": ... }`
//! segments.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Document store errors
#[derive(Error, Debug)]
pub enum DocumentError {
    /// No document with this key
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Key would escape the store (path separators, `..`, empty)
    #[error("Invalid document key: {0:?}")]
    InvalidKey(String),

    /// File exists but is not a valid paper document
    #[error("Malformed document {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// File could not be read
    #[error("I/O error reading {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The store itself is missing or unreadable
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),
}

/// A paper: title and abstract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub key: String,
    pub title: String,
    pub abstract_segments: Vec<String>,
}

impl Document {
    /// Title and joined abstract, separated by one space
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.abstract_segments.join(" "))
    }
}

/// Source of paper text
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Document, DocumentError>;
}

#[derive(Deserialize)]
struct PaperFile {
    metadata: PaperMetadata,
    #[serde(rename = "abstract", default)]
    abstract_segments: Vec<AbstractSegment>,
}

#[derive(Deserialize)]
struct PaperMetadata {
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
struct AbstractSegment {
    text: String,
}

/// Reads paper JSON files from disk
#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    dataset_dir: PathBuf,
}

impl JsonDocumentStore {
    /// Store rooted at `{input_dir}/dataset`, without checking it exists
    pub fn new(input_dir: impl AsRef<Path>) -> Self {
        Self {
            dataset_dir: input_dir.as_ref().join("dataset"),
        }
    }

    /// Store rooted at `{input_dir}/dataset`, failing if that directory is missing
    pub fn open(input_dir: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let store = Self::new(input_dir);
        if !store.dataset_dir.is_dir() {
            return Err(DocumentError::StoreUnavailable(format!(
                "{} is not a directory",
                store.dataset_dir.display()
            )));
        }
        Ok(store)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DocumentError> {
        let invalid = key.is_empty()
            || key == "."
            || key.contains("..")
            || key.contains('/')
            || key.contains('\\')
            || key.contains('\0');
        if invalid {
            return Err(DocumentError::InvalidKey(key.to_string()));
        }
        Ok(self.dataset_dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn fetch(&self, key: &str) -> Result<Document, DocumentError> {
        let path = self.path_for(key)?;
        debug!(key, path = %path.display(), "reading document");

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocumentError::NotFound(key.to_string()))
            }
            Err(source) => {
                return Err(DocumentError::Io {
                    key: key.to_string(),
                    source,
                })
            }
        };

        let paper: PaperFile = serde_json::from_str(&raw).map_err(|source| DocumentError::Malformed {
            key: key.to_string(),
            source,
        })?;

        Ok(Document {
            key: key.to_string(),
            title: paper.metadata.title,
            abstract_segments: paper.abstract_segments.into_iter().map(|s| s.text).collect(),
        })
    }
}

/// In-memory document store
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: HashMap<String, Document>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, S>(&mut self, key: &str, title: &str, abstract_segments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents.insert(
            key.to_string(),
            Document {
                key: key.to_string(),
                title: title.to_string(),
                abstract_segments: abstract_segments.into_iter().map(Into::into).collect(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch(&self, key: &str) -> Result<Document, DocumentError> {
        self.documents
            .get(key)
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(key.to_string()))
    }
}
