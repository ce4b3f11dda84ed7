//! GraphClient trait: the unified interface for embedded and remote modes

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

use crate::error::GraphResult;
use crate::models::{AuthorId, CommunityDocuments, CommunityId, LinkFeatures, TagEntry};

/// Everything the feature pipeline needs to know about the co-authorship graph.
///
/// Implemented by:
/// - `EmbeddedClient`: in-process snapshot, no network
/// - `RemoteClient`: Neo4j over HTTP
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Document keys (paper filenames) authored by `author`.
    ///
    /// Unknown authors yield an empty list, not an error.
    async fn author_documents(&self, author: AuthorId) -> GraphResult<Vec<String>>;

    /// Ranked tags of every community.
    ///
    /// Only words shared by more than one paper of the community are listed,
    /// ordered by co-occurrence degree desc, then importance score desc.
    async fn community_tags(&self) -> GraphResult<BTreeMap<CommunityId, Vec<TagEntry>>>;

    /// Documents of every community, largest community first
    async fn community_documents(&self) -> GraphResult<Vec<CommunityDocuments>>;

    /// Map of document key -> community
    async fn document_communities(&self) -> GraphResult<HashMap<String, CommunityId>>;

    /// Precomputed link-prediction scores, one per pair, in input order
    async fn link_features(&self, pairs: &[(AuthorId, AuthorId)]) -> GraphResult<Vec<LinkFeatures>>;

    /// Check that the backend answers
    async fn ping(&self) -> GraphResult<()>;
}
