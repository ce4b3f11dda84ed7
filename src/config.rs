//! Pipeline configuration
//!
//! Loaded from YAML. Everything except `input_dir` and `graph` has a default
//! matching the reference experiments (2000 TF-IDF terms, community top-k of
//! 5, 100 and 250).

use crate::scorer::DEFAULT_CACHE_CAPACITY;
use linkfeat_sdk::RemoteConfig;
use linkfeat_text::{TermRanking, TokenizerConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable consulted when the remote password is not in the file
pub const PASSWORD_ENV: &str = "LINKFEAT_GRAPH_PASSWORD";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the graph lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum GraphBackendConfig {
    /// Neo4j over HTTP
    Remote(RemoteConfig),
    /// JSON snapshot loaded into an embedded graph
    Snapshot { path: PathBuf },
}

/// One train/test split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Display name; defaults to the train file stem
    #[serde(default)]
    pub name: Option<String>,
    pub train: PathBuf,
    pub test: PathBuf,
}

impl SplitConfig {
    pub fn new(train: impl Into<PathBuf>, test: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            train: train.into(),
            test: test.into(),
        }
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.train
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.train.display().to_string())
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the document store (`{input_dir}/dataset/{key}.json`)
    pub input_dir: PathBuf,

    #[serde(default)]
    pub splits: Vec<SplitConfig>,

    #[serde(default = "default_tfidf_max_features")]
    pub tfidf_max_features: usize,

    #[serde(default)]
    pub tfidf_ranking: TermRanking,

    /// One `similarity_top_{k}` column per entry
    #[serde(default = "default_top_terms")]
    pub top_terms: Vec<usize>,

    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    #[serde(default = "default_term_cache_capacity")]
    pub term_cache_capacity: usize,

    /// Splits processed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Also append the database's link-prediction scores
    #[serde(default)]
    pub graph_features: bool,

    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    pub graph: GraphBackendConfig,
}

fn default_tfidf_max_features() -> usize {
    2000
}

fn default_top_terms() -> Vec<usize> {
    vec![5, 100, 250]
}

fn default_term_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_concurrency() -> usize {
    1
}

fn default_output_suffix() -> String {
    "_enriched".to_string()
}

impl PipelineConfig {
    /// Configuration with every default and no splits
    pub fn new(input_dir: impl Into<PathBuf>, graph: GraphBackendConfig) -> Self {
        Self {
            input_dir: input_dir.into(),
            splits: Vec::new(),
            tfidf_max_features: default_tfidf_max_features(),
            tfidf_ranking: TermRanking::default(),
            top_terms: default_top_terms(),
            tokenizer: TokenizerConfig::default(),
            term_cache_capacity: default_term_cache_capacity(),
            concurrency: default_concurrency(),
            graph_features: false,
            output_suffix: default_output_suffix(),
            graph,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&raw)?;

        // Relative paths in the file are relative to the file
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.input_dir);
        for split in &mut self.splits {
            resolve(&mut split.train);
            resolve(&mut split.test);
        }
        if let GraphBackendConfig::Snapshot { path } = &mut self.graph {
            resolve(path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.tfidf_max_features == 0 {
            return invalid("tfidf_max_features must be positive".to_string());
        }
        if self.term_cache_capacity == 0 {
            return invalid("term_cache_capacity must be positive".to_string());
        }
        if self.concurrency == 0 {
            return invalid("concurrency must be positive".to_string());
        }
        if self.output_suffix.is_empty() {
            return invalid("output_suffix must not be empty (inputs would be overwritten)".to_string());
        }

        let mut seen = HashSet::new();
        for &k in &self.top_terms {
            if k == 0 {
                return invalid("top_terms entries must be positive".to_string());
            }
            if !seen.insert(k) {
                return invalid(format!("duplicate top_terms entry {}", k));
            }
        }

        let mut names = HashSet::new();
        for split in &self.splits {
            let name = split.display_name();
            if !names.insert(name.clone()) {
                return invalid(format!("duplicate split name {}", name));
            }
        }

        Ok(())
    }

    /// Remote password from the file, else from [`PASSWORD_ENV`]
    pub fn resolved_graph(&self) -> GraphBackendConfig {
        match &self.graph {
            GraphBackendConfig::Remote(remote) if remote.password.is_none() => {
                let mut remote = remote.clone();
                remote.password = std::env::var(PASSWORD_ENV).ok();
                GraphBackendConfig::Remote(remote)
            }
            other => other.clone(),
        }
    }
}
