//! Dataset enrichment driver
//!
//! For every configured split the driver reads the train and test pair
//! tables, builds the split's TF-IDF vocabulary from the training authors'
//! papers, scores every pair against that vocabulary and against each
//! community vocabulary, and writes the enriched tables next to the inputs.
//!
//! Community tags are the same for every split, so they are fetched once into
//! a [`RunContext`] that the splits share read-only.

use crate::config::{PipelineConfig, SplitConfig};
use crate::dataset::{enriched_path, PairRecord, PairTable};
use crate::documents::DocumentStore;
use crate::error::FeatureResult;
use crate::extractor::TermExtractor;
use crate::scorer::PairScorer;
use futures::stream::{self, StreamExt};
use linkfeat_sdk::{AuthorId, CommunityId, GraphClient, LinkFeatures};
use linkfeat_text::{
    select_community_vocabulary, select_tfidf_vocabulary, CommunityVocabulary, TfidfConfig,
    Tokenizer, TopTerms,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Column holding the TF-IDF similarity
pub const TFIDF_COLUMN: &str = "similarity_tfidf";

/// Column holding the similarity over the top `k` tags of every community
pub fn top_terms_column(k: usize) -> String {
    format!("similarity_top_{}", k)
}

/// Run-wide state shared by all splits
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    community_vocabularies: Vec<(usize, CommunityVocabulary)>,
    document_communities: HashMap<String, CommunityId>,
}

impl RunContext {
    /// Fetch community tags once and select one vocabulary per `top_terms` entry
    pub async fn load(graph: &dyn GraphClient, top_terms: &[usize]) -> FeatureResult<Self> {
        let tags = graph.community_tags().await?;
        let ranked: BTreeMap<CommunityId, Vec<String>> = tags
            .into_iter()
            .map(|(community, entries)| (community, entries.into_iter().map(|t| t.word).collect()))
            .collect();

        let community_vocabularies: Vec<(usize, CommunityVocabulary)> = top_terms
            .iter()
            .map(|&k| (k, select_community_vocabulary(&ranked, TopTerms::Limit(k))))
            .collect();

        for (k, vocabulary) in &community_vocabularies {
            info!(
                top_terms = k,
                communities = vocabulary.per_community.len(),
                vocabulary = vocabulary.union.len(),
                "community vocabulary selected"
            );
        }

        let document_communities = graph.document_communities().await?;

        Ok(Self {
            community_vocabularies,
            document_communities,
        })
    }

    pub fn community_vocabularies(&self) -> &[(usize, CommunityVocabulary)] {
        &self.community_vocabularies
    }

    pub fn community_vocabulary(&self, top_terms: usize) -> Option<&CommunityVocabulary> {
        self.community_vocabularies
            .iter()
            .find(|(k, _)| *k == top_terms)
            .map(|(_, v)| v)
    }

    pub fn community_of(&self, key: &str) -> Option<CommunityId> {
        self.document_communities.get(key).copied()
    }
}

/// Documents of a split's training authors, one entry per document key
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    keys: Vec<String>,
    texts: Vec<String>,
}

impl Corpus {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Outcome of a successful split
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub split: String,
    pub corpus_documents: usize,
    pub tfidf_terms: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub columns: Vec<String>,
    pub train_output: PathBuf,
    pub test_output: PathBuf,
}

/// A split that failed without stopping the run
#[derive(Debug, Clone, Serialize)]
pub struct SplitFailure {
    pub split: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub succeeded: Vec<SplitReport>,
    pub failed: Vec<SplitFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct EnrichmentDriver {
    config: PipelineConfig,
    graph: Arc<dyn GraphClient>,
    documents: Arc<dyn DocumentStore>,
    tokenizer: Tokenizer,
}

impl EnrichmentDriver {
    pub fn new(
        config: PipelineConfig,
        graph: Arc<dyn GraphClient>,
        documents: Arc<dyn DocumentStore>,
    ) -> FeatureResult<Self> {
        config.validate()?;
        let tokenizer = Tokenizer::new(config.tokenizer.clone());
        Ok(Self {
            config,
            graph,
            documents,
            tokenizer,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Enrich every configured split.
    ///
    /// A split that fails is recorded in the summary and the run moves on.
    /// Backend failures end the run with `Err`.
    pub async fn run(&self) -> FeatureResult<RunSummary> {
        self.graph.ping().await?;
        let ctx = RunContext::load(self.graph.as_ref(), &self.config.top_terms).await?;
        let ctx = &ctx;

        info!(
            splits = self.config.splits.len(),
            concurrency = self.config.concurrency,
            "starting enrichment"
        );

        let mut results = std::pin::pin!(stream::iter(&self.config.splits)
            .map(move |split| async move { (split.display_name(), self.process_split(ctx, split).await) })
            .buffered(self.config.concurrency));

        let mut summary = RunSummary::default();
        while let Some((split, result)) = results.next().await {
            match result {
                Ok(report) => {
                    info!(
                        split = %split,
                        train_rows = report.train_rows,
                        test_rows = report.test_rows,
                        "split enriched"
                    );
                    summary.succeeded.push(report);
                }
                Err(e) if e.is_fatal() => {
                    error!(split = %split, error = %e, "backend unavailable, aborting run");
                    return Err(e);
                }
                Err(e) => {
                    warn!(split = %split, error = %e, "split failed");
                    summary.failed.push(SplitFailure {
                        split,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            "enrichment finished"
        );
        Ok(summary)
    }

    /// Enrich one split. Nothing is written unless every column succeeds.
    pub async fn process_split(&self, ctx: &RunContext, split: &SplitConfig) -> FeatureResult<SplitReport> {
        let name = split.display_name();
        info!(split = %name, train = %split.train.display(), test = %split.test.display(), "processing split");

        let mut train = PairTable::read_csv(&split.train)?;
        let mut test = PairTable::read_csv(&split.test)?;
        let train_pairs = pair_ids(&train.pairs()?);
        let test_pairs = pair_ids(&test.pairs()?);

        let corpus = self.build_corpus(&train_pairs).await?;
        let covered = corpus
            .keys()
            .iter()
            .filter(|k| ctx.community_of(k).is_some())
            .count();
        debug!(split = %name, documents = corpus.len(), in_communities = covered, "corpus built");

        let tfidf_config = TfidfConfig {
            max_features: self.config.tfidf_max_features,
            ranking: self.config.tfidf_ranking,
        };
        let tfidf = select_tfidf_vocabulary(corpus.texts(), &self.tokenizer, &tfidf_config)?;
        info!(split = %name, vocabulary = tfidf.len(), "tf-idf vocabulary selected");

        let extractor = TermExtractor::new(self.graph.as_ref(), self.documents.as_ref());
        let scorer = PairScorer::new(&extractor, self.config.term_cache_capacity);
        let mut added = vec![TFIDF_COLUMN.to_string()];

        train.append_column(TFIDF_COLUMN, &scorer.score_pairs(&train_pairs, &tfidf).await?)?;
        test.append_column(TFIDF_COLUMN, &scorer.score_pairs(&test_pairs, &tfidf).await?)?;

        for (k, vocabulary) in ctx.community_vocabularies() {
            let column = top_terms_column(*k);
            train.append_column(&column, &scorer.score_pairs(&train_pairs, &vocabulary.union).await?)?;
            test.append_column(&column, &scorer.score_pairs(&test_pairs, &vocabulary.union).await?)?;
            added.push(column);
        }

        if self.config.graph_features {
            added.extend(self.append_link_features(&mut train, &train_pairs).await?);
            self.append_link_features(&mut test, &test_pairs).await?;
        }

        let train_output = enriched_path(&split.train, &self.config.output_suffix);
        let test_output = enriched_path(&split.test, &self.config.output_suffix);
        train.write_csv(&train_output)?;
        test.write_csv(&test_output)?;

        Ok(SplitReport {
            split: name,
            corpus_documents: corpus.len(),
            tfidf_terms: tfidf.len(),
            train_rows: train.len(),
            test_rows: test.len(),
            columns: added,
            train_output,
            test_output,
        })
    }

    /// Texts of every document written by an author of `pairs`.
    ///
    /// Authors are visited in order of first appearance and each document
    /// contributes once even when several authors share it.
    pub async fn build_corpus(&self, pairs: &[(AuthorId, AuthorId)]) -> FeatureResult<Corpus> {
        let extractor = TermExtractor::new(self.graph.as_ref(), self.documents.as_ref());
        let mut seen_authors = HashSet::new();
        let mut seen_keys = HashSet::new();
        let mut corpus = Corpus::default();

        for author in pairs.iter().flat_map(|&(a, b)| [a, b]) {
            if !seen_authors.insert(author) {
                continue;
            }
            for key in extractor.author_documents(author).await? {
                if !seen_keys.insert(key.clone()) {
                    continue;
                }
                let text = extractor.document_text(author, &key).await?;
                corpus.keys.push(key);
                corpus.texts.push(text);
            }
        }

        Ok(corpus)
    }

    /// Corpus of a split's training table
    pub async fn split_corpus(&self, split: &SplitConfig) -> FeatureResult<Corpus> {
        let train = PairTable::read_csv(&split.train)?;
        self.build_corpus(&pair_ids(&train.pairs()?)).await
    }

    /// Append the graph's link-prediction columns the table does not have yet
    async fn append_link_features(
        &self,
        table: &mut PairTable,
        pairs: &[(AuthorId, AuthorId)],
    ) -> FeatureResult<Vec<String>> {
        let missing: Vec<(usize, &str)> = LinkFeatures::COLUMNS
            .iter()
            .enumerate()
            .filter(|(_, column)| !table.has_column(column))
            .map(|(i, column)| (i, *column))
            .collect();
        if missing.is_empty() {
            debug!("link features already present");
            return Ok(Vec::new());
        }

        let features = self.graph.link_features(pairs).await?;
        let mut added = Vec::with_capacity(missing.len());
        for (i, column) in missing {
            let values: Vec<f64> = features.iter().map(|f| f.values()[i]).collect();
            table.append_column(column, &values)?;
            added.push(column.to_string());
        }
        Ok(added)
    }
}

fn pair_ids(records: &[PairRecord]) -> Vec<(AuthorId, AuthorId)> {
    records.iter().map(PairRecord::ids).collect()
}
