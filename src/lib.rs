//! Linkfeat
//!
//! Text-similarity features for link prediction on co-authorship graphs.
//!
//! Given labeled author pairs (`node1`, `node2`, `label`), the pipeline adds
//! one column per vocabulary holding the Jaccard index of the two authors'
//! term sets:
//!
//! - `similarity_tfidf`: terms from the split's TF-IDF vocabulary, built from
//!   the papers of the training authors
//! - `similarity_top_{k}`: terms from the union of the top `k` tags of every
//!   paper community
//!
//! Optionally the graph database's own link-prediction scores are appended
//! as well.
//!
//! # Architecture
//!
//! - `linkfeat-text`: tokenization, vocabulary selection, Jaccard
//! - `linkfeat-sdk`: graph clients (Neo4j over HTTP, embedded snapshot)
//! - this crate: document store, pair tables, term extraction, the
//!   enrichment driver and its configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use linkfeat::{MemoryDocumentStore, PairScorer, TermExtractor};
//! use linkfeat_sdk::EmbeddedClient;
//! use linkfeat_text::Vocabulary;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let graph = EmbeddedClient::new()
//!     .with_author(1, ["d1"])
//!     .with_author(2, ["d2"]);
//!
//! let mut documents = MemoryDocumentStore::new();
//! documents.insert("d1", "graph neural", Vec::<String>::new());
//! documents.insert("d2", "graph network", Vec::<String>::new());
//!
//! let extractor = TermExtractor::new(&graph, &documents);
//! let scorer = PairScorer::new(&extractor, 100);
//! let vocabulary: Vocabulary = ["graph", "neural", "network"].into_iter().collect();
//!
//! let scores = scorer.score_pairs(&[(1, 2)], &vocabulary).await.unwrap();
//! assert!((scores[0] - 1.0 / 3.0).abs() < 1e-12);
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod dataset;
pub mod documents;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod scorer;

// Re-export main types for convenience
pub use backend::connect_graph;

pub use config::{ConfigError, GraphBackendConfig, PipelineConfig, SplitConfig, PASSWORD_ENV};

pub use dataset::{enriched_path, DatasetError, PairRecord, PairTable};

pub use documents::{
    Document, DocumentError, DocumentStore, JsonDocumentStore, MemoryDocumentStore,
};

pub use driver::{
    top_terms_column, Corpus, EnrichmentDriver, RunContext, RunSummary, SplitFailure,
    SplitReport, TFIDF_COLUMN,
};

pub use error::{FeatureError, FeatureResult};

pub use extractor::TermExtractor;

pub use scorer::{PairScorer, DEFAULT_CACHE_CAPACITY};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.3.0");
    }
}
