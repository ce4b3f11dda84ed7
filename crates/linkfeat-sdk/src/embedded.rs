//! EmbeddedClient: in-process co-authorship graph
//!
//! Holds authors, papers (with their words and community) and precomputed
//! link features in memory. Loaded from a JSON snapshot or built directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::client::GraphClient;
use crate::error::{GraphError, GraphResult};
use crate::models::{AuthorId, CommunityDocuments, CommunityId, LinkFeatures, TagEntry};

/// Serialized form of an embedded graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub authors: Vec<AuthorRecord>,
    #[serde(default)]
    pub papers: Vec<PaperRecord>,
    /// Word importance scores
    #[serde(default)]
    pub word_scores: HashMap<String, f64>,
    #[serde(default)]
    pub link_features: Vec<LinkFeatureRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub id: AuthorId,
    #[serde(default)]
    pub papers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperRecord {
    pub filename: String,
    #[serde(default)]
    pub community: Option<CommunityId>,
    #[serde(default)]
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFeatureRecord {
    pub node1: AuthorId,
    pub node2: AuthorId,
    #[serde(flatten)]
    pub features: LinkFeatures,
}

/// In-process graph client.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedClient {
    authors: HashMap<AuthorId, Vec<String>>,
    papers: Vec<PaperRecord>,
    word_scores: HashMap<String, f64>,
    link_features: HashMap<(AuthorId, AuthorId), LinkFeatures>,
}

impl EmbeddedClient {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut client = Self {
            word_scores: snapshot.word_scores,
            papers: snapshot.papers,
            ..Self::default()
        };
        for author in snapshot.authors {
            client.authors.entry(author.id).or_default().extend(author.papers);
        }
        for record in snapshot.link_features {
            client
                .link_features
                .insert((record.node1, record.node2), record.features);
        }
        client
    }

    /// Load a JSON snapshot from disk
    pub fn from_path(path: impl AsRef<Path>) -> GraphResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let snapshot: GraphSnapshot = serde_json::from_str(&raw)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Add papers to an author
    pub fn with_author<I, S>(mut self, id: AuthorId, papers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors
            .entry(id)
            .or_default()
            .extend(papers.into_iter().map(Into::into));
        self
    }

    /// Add a paper with its community and the words it includes
    pub fn with_paper<I, S>(mut self, filename: &str, community: Option<CommunityId>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.papers.push(PaperRecord {
            filename: filename.to_string(),
            community,
            words: words.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_word_score(mut self, word: &str, score: f64) -> Self {
        self.word_scores.insert(word.to_string(), score);
        self
    }

    pub fn with_link_features(mut self, node1: AuthorId, node2: AuthorId, features: LinkFeatures) -> Self {
        self.link_features.insert((node1, node2), features);
        self
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    pub fn paper_count(&self) -> usize {
        self.papers.len()
    }
}

#[async_trait]
impl GraphClient for EmbeddedClient {
    async fn author_documents(&self, author: AuthorId) -> GraphResult<Vec<String>> {
        Ok(self.authors.get(&author).cloned().unwrap_or_default())
    }

    async fn community_tags(&self) -> GraphResult<BTreeMap<CommunityId, Vec<TagEntry>>> {
        // Degree of a word in a community = number of its papers including it
        let mut degrees: BTreeMap<CommunityId, HashMap<&str, u64>> = BTreeMap::new();
        for paper in &self.papers {
            let Some(community) = paper.community else {
                continue;
            };
            let words: HashSet<&str> = paper.words.iter().map(String::as_str).collect();
            let counts = degrees.entry(community).or_default();
            for word in words {
                *counts.entry(word).or_insert(0) += 1;
            }
        }

        let mut tags = BTreeMap::new();
        for (community, counts) in degrees {
            let mut entries: Vec<TagEntry> = counts
                .into_iter()
                .filter(|&(_, degree)| degree > 1)
                .map(|(word, degree)| TagEntry {
                    word: word.to_string(),
                    score: self.word_scores.get(word).copied().unwrap_or(0.0),
                    degree,
                })
                .collect();
            if entries.is_empty() {
                continue;
            }
            entries.sort_by(TagEntry::ranking_order);
            tags.insert(community, entries);
        }

        Ok(tags)
    }

    async fn community_documents(&self) -> GraphResult<Vec<CommunityDocuments>> {
        let mut grouped: BTreeMap<CommunityId, Vec<String>> = BTreeMap::new();
        for paper in &self.papers {
            if let Some(community) = paper.community {
                grouped.entry(community).or_default().push(paper.filename.clone());
            }
        }

        let mut result: Vec<CommunityDocuments> = grouped
            .into_iter()
            .map(|(community, documents)| CommunityDocuments { community, documents })
            .collect();
        // Stable sort keeps community order among equal sizes
        result.sort_by(|a, b| b.documents.len().cmp(&a.documents.len()));
        Ok(result)
    }

    async fn document_communities(&self) -> GraphResult<HashMap<String, CommunityId>> {
        Ok(self
            .papers
            .iter()
            .filter_map(|p| p.community.map(|c| (p.filename.clone(), c)))
            .collect())
    }

    async fn link_features(&self, pairs: &[(AuthorId, AuthorId)]) -> GraphResult<Vec<LinkFeatures>> {
        pairs
            .iter()
            .map(|&(node1, node2)| {
                self.link_features
                    .get(&(node1, node2))
                    .or_else(|| self.link_features.get(&(node2, node1)))
                    .copied()
                    .ok_or(GraphError::MissingLinkFeatures { node1, node2 })
            })
            .collect()
    }

    async fn ping(&self) -> GraphResult<()> {
        Ok(())
    }
}
