//! Author term extraction
//!
//! Maps an author to the vocabulary terms that occur in their papers.

use crate::documents::{DocumentError, DocumentStore};
use crate::error::{FeatureError, FeatureResult};
use linkfeat_sdk::{AuthorId, GraphClient};
use linkfeat_text::{whitespace_tokens, Vocabulary};
use std::collections::HashSet;
use tracing::debug;

/// Resolves authors to their papers and papers to text
pub struct TermExtractor<'a> {
    graph: &'a dyn GraphClient,
    documents: &'a dyn DocumentStore,
}

impl<'a> TermExtractor<'a> {
    pub fn new(graph: &'a dyn GraphClient, documents: &'a dyn DocumentStore) -> Self {
        Self { graph, documents }
    }

    /// Document keys of an author; empty for unknown authors
    pub async fn author_documents(&self, author: AuthorId) -> FeatureResult<Vec<String>> {
        Ok(self.graph.author_documents(author).await?)
    }

    /// Full text of one of `author`'s documents
    pub async fn document_text(&self, author: AuthorId, key: &str) -> FeatureResult<String> {
        match self.documents.fetch(key).await {
            Ok(doc) => Ok(doc.text()),
            Err(DocumentError::NotFound(key)) => Err(FeatureError::DocumentNotFound { key, author }),
            Err(e) => Err(e.into()),
        }
    }

    /// Vocabulary terms present in any of the author's papers.
    ///
    /// Papers are lowercased and split on whitespace only; tokens are then
    /// kept if the vocabulary contains them verbatim.
    pub async fn extract_author_terms(
        &self,
        author: AuthorId,
        vocabulary: &Vocabulary,
    ) -> FeatureResult<HashSet<String>> {
        let keys = self.author_documents(author).await?;
        if keys.is_empty() {
            debug!(author, "author has no documents");
            return Ok(HashSet::new());
        }

        let mut terms = HashSet::new();
        for key in &keys {
            let text = self.document_text(author, key).await?;
            terms.extend(whitespace_tokens(&text).filter(|t| vocabulary.contains(t)));
        }

        debug!(author, documents = keys.len(), terms = terms.len(), "extracted author terms");
        Ok(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::MemoryDocumentStore;
    use linkfeat_sdk::EmbeddedClient;

    fn fixtures() -> (EmbeddedClient, MemoryDocumentStore) {
        let graph = EmbeddedClient::new()
            .with_author(1, ["d1", "d2"])
            .with_author(2, ["d3", "gone"]);

        let mut docs = MemoryDocumentStore::new();
        docs.insert("d1", "Graph Neural", ["models for GRAPH data"]);
        docs.insert("d2", "Neural", ["networks, again"]);
        docs.insert("d3", "Protein", ["folding"]);
        (graph, docs)
    }

    fn vocab(terms: &[&str]) -> Vocabulary {
        terms.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_extract_terms() {
        let (graph, docs) = fixtures();
        let extractor = TermExtractor::new(&graph, &docs);

        let terms = extractor
            .extract_author_terms(1, &vocab(&["graph", "neural", "networks", "protein"]))
            .await
            .unwrap();

        let expected: HashSet<String> = ["graph", "neural"].iter().map(|s| s.to_string()).collect();
        // "networks," keeps its comma under whitespace splitting
        assert_eq!(terms, expected);
    }

    #[tokio::test]
    async fn test_unknown_author_is_empty() {
        let (graph, docs) = fixtures();
        let extractor = TermExtractor::new(&graph, &docs);

        for v in [vocab(&[]), vocab(&["graph"]), vocab(&["protein", "folding"])] {
            assert!(extractor.extract_author_terms(99, &v).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_document_propagates() {
        let (graph, docs) = fixtures();
        let extractor = TermExtractor::new(&graph, &docs);

        let err = extractor
            .extract_author_terms(2, &vocab(&["protein"]))
            .await
            .unwrap_err();
        assert!(matches!(err, FeatureError::DocumentNotFound { ref key, author: 2 } if key == "gone"));
    }
}
