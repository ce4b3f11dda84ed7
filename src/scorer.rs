//! Pairwise similarity scoring

use crate::error::FeatureResult;
use crate::extractor::TermExtractor;
use linkfeat_sdk::AuthorId;
use linkfeat_text::{jaccard_similarity, Vocabulary};
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

/// Default number of author term sets kept during one scoring pass
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Scores author pairs by the Jaccard index of their term sets
pub struct PairScorer<'a> {
    extractor: &'a TermExtractor<'a>,
    cache_capacity: NonZeroUsize,
}

impl<'a> PairScorer<'a> {
    pub fn new(extractor: &'a TermExtractor<'a>, cache_capacity: usize) -> Self {
        let cache_capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            extractor,
            cache_capacity,
        }
    }

    /// One score per pair, in input order.
    ///
    /// The term cache lives only for this call, so results never carry over
    /// to another vocabulary.
    pub async fn score_pairs(
        &self,
        pairs: &[(AuthorId, AuthorId)],
        vocabulary: &Vocabulary,
    ) -> FeatureResult<Vec<f64>> {
        let mut cache: LruCache<AuthorId, Arc<HashSet<String>>> = LruCache::new(self.cache_capacity);
        let mut hits = 0usize;
        let mut scores = Vec::with_capacity(pairs.len());

        for &(a, b) in pairs {
            let terms_a = self.terms(&mut cache, &mut hits, a, vocabulary).await?;
            let terms_b = self.terms(&mut cache, &mut hits, b, vocabulary).await?;
            scores.push(jaccard_similarity(&*terms_a, &*terms_b));
        }

        debug!(
            pairs = pairs.len(),
            vocabulary = vocabulary.len(),
            cache_hits = hits,
            "scored pairs"
        );
        Ok(scores)
    }

    async fn terms(
        &self,
        cache: &mut LruCache<AuthorId, Arc<HashSet<String>>>,
        hits: &mut usize,
        author: AuthorId,
        vocabulary: &Vocabulary,
    ) -> FeatureResult<Arc<HashSet<String>>> {
        if let Some(terms) = cache.get(&author) {
            *hits += 1;
            return Ok(Arc::clone(terms));
        }
        let terms = Arc::new(self.extractor.extract_author_terms(author, vocabulary).await?);
        cache.put(author, Arc::clone(&terms));
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
            .with_author(1, ["d1"])
            .with_author(2, ["d2"])
            .with_author(3, ["d3"]);

        let mut docs = MemoryDocumentStore::new();
        docs.insert("d1", "graph neural", Vec::<String>::new());
        docs.insert("d2", "graph network", Vec::<String>::new());
        docs.insert("d3", "protein folding", Vec::<String>::new());
        (graph, docs)
    }

    #[tokio::test]
    async fn test_scores_in_input_order() {
        let (graph, docs) = fixtures();
        let extractor = TermExtractor::new(&graph, &docs);
        let scorer = PairScorer::new(&extractor, 2);
        let vocab: Vocabulary = ["graph", "neural", "network", "protein"].into_iter().collect();

        let pairs = vec![(1, 2), (1, 3), (2, 1), (1, 1), (4, 1), (3, 3)];
        let scores = scorer.score_pairs(&pairs, &vocab).await.unwrap();

        assert_eq!(scores.len(), pairs.len());
        assert!((scores[0] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(scores[1], 0.0);
        assert_eq!(scores[2], scores[0]);
        assert_eq!(scores[3], 1.0);
        assert_eq!(scores[4], 0.0);
        assert_eq!(scores[5], 1.0);
    }

    #[tokio::test]
    async fn test_cache_does_not_leak_across_vocabularies() {
        let (graph, docs) = fixtures();
        let extractor = TermExtractor::new(&graph, &docs);
        let scorer = PairScorer::new(&extractor, 16);

        let wide: Vocabulary = ["graph", "neural", "network"].into_iter().collect();
        let narrow: Vocabulary = ["graph"].into_iter().collect();

        let first = scorer.score_pairs(&[(1, 2)], &wide).await.unwrap();
        let second = scorer.score_pairs(&[(1, 2)], &narrow).await.unwrap();
        assert!((first[0] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(second[0], 1.0);
    }

    #[tokio::test]
    async fn test_empty_pairs() {
        let (graph, docs) = fixtures();
        let extractor = TermExtractor::new(&graph, &docs);
        let scorer = PairScorer::new(&extractor, 0);
        assert!(scorer.score_pairs(&[], &Vocabulary::new()).await.unwrap().is_empty());
    }
}
