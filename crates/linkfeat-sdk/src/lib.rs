//! Linkfeat SDK: graph database clients for link-prediction feature pipelines
//!
//! Provides two client implementations:
//!
//! - **`RemoteClient`**: talks to a Neo4j server over its HTTP transactional
//!   endpoint. Every user-provided value travels as a query parameter.
//!
//! - **`EmbeddedClient`**: in-process graph loaded from a JSON snapshot. Answers
//!   the same questions with the same ordering rules. Ideal for tests and
//!   offline runs.
//!
//! Both implement the `GraphClient` trait.
//!
//! # Quick Start
//!
//! ```rust
//! use linkfeat_sdk::{EmbeddedClient, GraphClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = EmbeddedClient::new()
//!         .with_author(1, ["paper-a"])
//!         .with_paper("paper-a", Some(3), ["graph", "neural"]);
//!
//!     let papers = client.author_documents(1).await.unwrap();
//!     assert_eq!(papers, vec!["paper-a".to_string()]);
//! }
//! ```

pub mod client;
pub mod embedded;
pub mod error;
pub mod models;
pub mod queries;
pub mod remote;

pub use client::GraphClient;
pub use embedded::{EmbeddedClient, GraphSnapshot};
pub use error::{GraphError, GraphResult};
pub use models::{
    AuthorId, CommunityDocuments, CommunityId, LinkFeatures, QueryResult, TagEntry,
};
pub use remote::{RemoteClient, RemoteConfig};
