//! TF-IDF vocabulary selection
//!
//! Fits term-frequency / inverse-document-frequency weights over a corpus and
//! keeps the highest-ranked terms.
//!
//! Weights follow the usual smoothed formulation:
//! `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, raw counts as term frequency,
//! and every document row L2-normalized. A term's corpus score is the sum of
//! its normalized weights over all documents.

use super::tokenize::Tokenizer;
use super::vocabulary::{Vocabulary, VocabularyError, VocabularyResult};
use rayon::prelude::*;
use std::collections::HashMap;

/// How terms are ranked before the `max_features` cut
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TermRanking {
    /// Sum of L2-normalized TF-IDF weights across documents
    #[default]
    TfidfScore,
    /// Total number of occurrences across the corpus
    CorpusFrequency,
}

/// TF-IDF selection settings
#[derive(Debug, Clone)]
pub struct TfidfConfig {
    /// Number of terms to keep
    pub max_features: usize,
    /// Ranking used for the cut
    pub ranking: TermRanking,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            max_features: 2000,
            ranking: TermRanking::TfidfScore,
        }
    }
}

/// A term with its corpus score
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermScore {
    pub term: String,
    pub score: f64,
}

/// Rank every term of the corpus, best first.
///
/// Ties are broken by term so the ranking is deterministic.
pub fn rank_tfidf_terms<S>(
    corpus: &[S],
    tokenizer: &Tokenizer,
    ranking: TermRanking,
) -> VocabularyResult<Vec<TermScore>>
where
    S: AsRef<str> + Sync,
{
    if corpus.is_empty() {
        return Err(VocabularyError::EmptyCorpus);
    }

    // 1. Term counts per document
    let counts: Vec<HashMap<String, usize>> = corpus
        .par_iter()
        .map(|doc| {
            let mut tf = HashMap::new();
            for token in tokenizer.tokenize(doc.as_ref()) {
                *tf.entry(token).or_insert(0) += 1;
            }
            tf
        })
        .collect();

    if counts.iter().all(HashMap::is_empty) {
        return Err(VocabularyError::EmptyCorpus);
    }

    // 2. Document frequencies
    let mut df: HashMap<&str, usize> = HashMap::new();
    for tf in &counts {
        for term in tf.keys() {
            *df.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    // 3. Corpus scores
    let mut scores: HashMap<&str, f64> = HashMap::with_capacity(df.len());
    match ranking {
        TermRanking::TfidfScore => {
            let n = counts.len() as f64;
            let idf: HashMap<&str, f64> = df
                .iter()
                .map(|(&term, &d)| (term, ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0))
                .collect();

            for tf in &counts {
                let weights: Vec<(&str, f64)> = tf
                    .iter()
                    .map(|(term, &c)| (term.as_str(), c as f64 * idf[term.as_str()]))
                    .collect();
                let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm == 0.0 {
                    continue;
                }
                for (term, w) in weights {
                    *scores.entry(term).or_insert(0.0) += w / norm;
                }
            }
        }
        TermRanking::CorpusFrequency => {
            for tf in &counts {
                for (term, &c) in tf {
                    *scores.entry(term.as_str()).or_insert(0.0) += c as f64;
                }
            }
        }
    }

    // 4. Rank
    let mut ranked: Vec<TermScore> = scores
        .into_iter()
        .map(|(term, score)| TermScore {
            term: term.to_string(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));

    Ok(ranked)
}

/// Select the `max_features` best terms of the corpus.
pub fn select_tfidf_vocabulary<S>(
    corpus: &[S],
    tokenizer: &Tokenizer,
    config: &TfidfConfig,
) -> VocabularyResult<Vocabulary>
where
    S: AsRef<str> + Sync,
{
    if config.max_features == 0 {
        return Err(VocabularyError::InvalidSize(0));
    }

    let ranked = rank_tfidf_terms(corpus, tokenizer, config.ranking)?;
    Ok(ranked
        .into_iter()
        .take(config.max_features)
        .map(|ts| ts.term)
        .collect())
}
