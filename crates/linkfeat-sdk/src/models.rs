//! Data models for the Linkfeat SDK
//!
//! These types are returned by both EmbeddedClient and RemoteClient.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub use linkfeat_text::CommunityId;

/// Author node identifier
pub type AuthorId = u64;

/// A community tag with the two keys it is ranked by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagEntry {
    /// Normalized word
    pub word: String,
    /// Importance score of the word (PageRank in the word graph)
    pub score: f64,
    /// Number of papers of the community that include the word
    pub degree: u64,
}

impl TagEntry {
    /// Ranking order: degree desc, score desc, then word for determinism
    pub fn ranking_order(a: &TagEntry, b: &TagEntry) -> Ordering {
        b.degree
            .cmp(&a.degree)
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.word.cmp(&b.word))
    }
}

/// Documents belonging to one community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityDocuments {
    pub community: CommunityId,
    pub documents: Vec<String>,
}

/// Link-prediction scores computed by the graph database for a pair of authors.
///
/// Consumed as opaque numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkFeatures {
    pub adamic_adar: f64,
    pub common_neighbors: f64,
    pub preferential_attachment: f64,
    pub total_neighbors: f64,
}

impl LinkFeatures {
    /// Column names, aligned with [`LinkFeatures::values`]
    pub const COLUMNS: [&'static str; 4] = [
        "adamic_adar",
        "common_neighbors",
        "preferential_attachment",
        "total_neighbors",
    ];

    pub fn values(&self) -> [f64; 4] {
        [
            self.adamic_adar,
            self.common_neighbors,
            self.preferential_attachment,
            self.total_neighbors,
        ]
    }
}

/// Result of executing a Cypher statement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Tabular result rows
    pub records: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    /// Number of result records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
