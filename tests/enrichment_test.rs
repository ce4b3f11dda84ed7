use async_trait::async_trait;
use linkfeat::{
    connect_graph, EnrichmentDriver, FeatureError, GraphBackendConfig, JsonDocumentStore, PairTable,
    PipelineConfig, SplitConfig,
};
use linkfeat_sdk::{
    AuthorId, CommunityDocuments, CommunityId, EmbeddedClient, GraphClient, GraphError, GraphResult,
    LinkFeatures, TagEntry,
};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const EPS: f64 = 1e-9;

fn write_paper(root: &Path, key: &str, title: &str) {
    let dataset = root.join("dataset");
    std::fs::create_dir_all(&dataset).unwrap();
    let body = serde_json::json!({
        "paper_id": key,
        "metadata": { "title": title, "authors": [] },
        "abstract": []
    });
    std::fs::write(dataset.join(format!("{}.json", key)), body.to_string()).unwrap();
}

fn write_csv(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

/// Three papers, one community where "graph" is shared by 3 papers and
/// "neural" by 2.
fn graph() -> EmbeddedClient {
    EmbeddedClient::new()
        .with_author(1, ["d1"])
        .with_author(2, ["d2"])
        .with_author(3, ["d3"])
        .with_author(5, ["gone"])
        .with_paper("d1", Some(1), ["graph", "neural"])
        .with_paper("d2", Some(1), ["graph", "neural"])
        .with_paper("d3", Some(1), ["graph"])
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_paper(dir.path(), "d1", "graph neural");
        write_paper(dir.path(), "d2", "graph network");
        write_paper(dir.path(), "d3", "protein folding");
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn split(&self, name: &str, train: &str, test: &str) -> SplitConfig {
        let train_path = self.root().join(name).join("train.csv");
        let test_path = self.root().join(name).join("test.csv");
        write_csv(&train_path, train);
        write_csv(&test_path, test);
        SplitConfig {
            name: Some(name.to_string()),
            train: train_path,
            test: test_path,
        }
    }

    fn config(&self, splits: Vec<SplitConfig>) -> PipelineConfig {
        let mut config = PipelineConfig::new(
            self.root(),
            GraphBackendConfig::Snapshot {
                path: self.root().join("graph.json"),
            },
        );
        config.top_terms = vec![1, 5];
        config.splits = splits;
        config
    }

    fn driver(&self, config: PipelineConfig, graph: impl GraphClient + 'static) -> EnrichmentDriver {
        let documents = JsonDocumentStore::open(self.root()).unwrap();
        EnrichmentDriver::new(config, Arc::new(graph), Arc::new(documents)).unwrap()
    }
}

fn float_column(path: &Path, name: &str) -> Vec<f64> {
    let table = PairTable::read_csv(path).unwrap();
    table
        .column(name)
        .unwrap_or_else(|| panic!("missing column {}", name))
        .iter()
        .map(|v| v.parse().unwrap())
        .collect()
}

const TRAIN: &str = "node1,node2,label,source\n1,2,1,\"a,b\"\n1,3,0,c\n";
const TEST: &str = "node1,node2,label\n2,3,0\n1,4,0\n";

#[tokio::test]
async fn test_enrich_split_end_to_end() {
    let fx = Fixture::new();
    let split = fx.split("dataset1", TRAIN, TEST);
    let train_in = split.train.clone();
    let test_in = split.test.clone();
    let driver = fx.driver(fx.config(vec![split]), graph());

    let summary = driver.run().await.unwrap();
    assert!(summary.is_success());
    assert_eq!(summary.succeeded.len(), 1);

    let report = &summary.succeeded[0];
    assert_eq!(report.corpus_documents, 3);
    assert_eq!(report.tfidf_terms, 5);
    assert_eq!(
        report.columns,
        vec!["similarity_tfidf", "similarity_top_1", "similarity_top_5"]
    );

    // Inputs untouched, outputs next to them
    assert_eq!(std::fs::read_to_string(&train_in).unwrap(), TRAIN);
    let train_out = fx.root().join("dataset1").join("train_enriched.csv");
    let test_out = fx.root().join("dataset1").join("test_enriched.csv");
    assert_eq!(report.train_output, train_out);

    let train = PairTable::read_csv(&train_out).unwrap();
    assert_eq!(
        train.columns(),
        &["node1", "node2", "label", "source", "similarity_tfidf", "similarity_top_1", "similarity_top_5"]
    );
    assert_eq!(train.len(), 2);
    assert_eq!(train.column("source").unwrap(), vec!["a,b", "c"]);

    // {graph, neural} vs {graph, network}
    let tfidf = float_column(&train_out, "similarity_tfidf");
    assert!((tfidf[0] - 1.0 / 3.0).abs() < EPS);
    assert_eq!(tfidf[1], 0.0);

    // Top-1 tags: {graph}; author 3 has none of them
    assert_eq!(float_column(&train_out, "similarity_top_1"), vec![1.0, 0.0]);
    // Top-5 tags: {graph, neural}
    let top5 = float_column(&train_out, "similarity_top_5");
    assert!((top5[0] - 0.5).abs() < EPS);

    // Test pairs scored with the train vocabulary; author 4 is unknown
    let test = PairTable::read_csv(&test_out).unwrap();
    assert_eq!(test.len(), 2);
    assert_eq!(float_column(&test_out, "similarity_tfidf"), vec![0.0, 0.0]);
    assert_eq!(std::fs::read_to_string(&test_in).unwrap(), TEST);
}

#[tokio::test]
async fn test_missing_document_fails_only_its_split() {
    let fx = Fixture::new();
    let good = fx.split("good", TRAIN, TEST);
    let bad = fx.split("bad", "node1,node2,label\n1,5,1\n", TEST);
    let driver = fx.driver(fx.config(vec![bad, good]), graph());

    let summary = driver.run().await.unwrap();
    assert!(!summary.is_success());
    assert_eq!(summary.succeeded.len(), 1);
    assert_eq!(summary.succeeded[0].split, "good");
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].split, "bad");
    assert!(summary.failed[0].error.contains("gone"));

    assert!(!fx.root().join("bad").join("train_enriched.csv").exists());
    assert!(!fx.root().join("bad").join("test_enriched.csv").exists());
    assert!(fx.root().join("good").join("test_enriched.csv").exists());
}

#[tokio::test]
async fn test_empty_corpus_fails_split() {
    let fx = Fixture::new();
    let split = fx.split("orphans", "node1,node2,label\n7,8,1\n", TEST);
    let driver = fx.driver(fx.config(vec![split]), graph());

    let summary = driver.run().await.unwrap();
    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0].error.contains("empty corpus"));
}

#[tokio::test]
async fn test_concurrent_splits_keep_order() {
    let fx = Fixture::new();
    let splits = vec![
        fx.split("s1", TRAIN, TEST),
        fx.split("s2", TEST, TRAIN),
        fx.split("s3", TRAIN, TRAIN),
    ];
    let mut config = fx.config(splits);
    config.concurrency = 3;
    let driver = fx.driver(config, graph());

    let summary = driver.run().await.unwrap();
    let names: Vec<&str> = summary.succeeded.iter().map(|r| r.split.as_str()).collect();
    assert_eq!(names, vec!["s1", "s2", "s3"]);
}

#[tokio::test]
async fn test_graph_features_appended() {
    let fx = Fixture::new();
    let split = fx.split("dataset1", TRAIN, TEST);
    let mut config = fx.config(vec![split]);
    config.graph_features = true;

    let lf = |x: f64| LinkFeatures {
        adamic_adar: x,
        common_neighbors: 2.0 * x,
        preferential_attachment: 3.0 * x,
        total_neighbors: 4.0 * x,
    };
    let graph = graph()
        .with_link_features(1, 2, lf(0.5))
        .with_link_features(1, 3, lf(1.0))
        .with_link_features(3, 2, lf(1.5))
        .with_link_features(1, 4, lf(2.0));

    let summary = fx.driver(config, graph).run().await.unwrap();
    assert!(summary.is_success());

    let train_out = fx.root().join("dataset1").join("train_enriched.csv");
    let test_out = fx.root().join("dataset1").join("test_enriched.csv");
    assert_eq!(float_column(&train_out, "adamic_adar"), vec![0.5, 1.0]);
    assert_eq!(float_column(&train_out, "total_neighbors"), vec![2.0, 4.0]);
    assert_eq!(float_column(&test_out, "common_neighbors"), vec![3.0, 4.0]);
}

#[tokio::test]
async fn test_run_from_yaml_and_snapshot() {
    let fx = Fixture::new();
    write_csv(&fx.root().join("data").join("train_balanced.csv"), TRAIN);
    write_csv(&fx.root().join("data").join("test_balanced.csv"), TEST);
    std::fs::write(
        fx.root().join("graph.json"),
        serde_json::json!({
            "authors": [
                {"id": 1, "papers": ["d1"]},
                {"id": 2, "papers": ["d2"]},
                {"id": 3, "papers": ["d3"]}
            ],
            "papers": [
                {"filename": "d1", "community": 1, "words": ["graph", "neural"]},
                {"filename": "d2", "community": 1, "words": ["graph", "neural"]},
                {"filename": "d3", "community": 1, "words": ["graph"]}
            ]
        })
        .to_string(),
    )
    .unwrap();

    let config_path = fx.root().join("pipeline.yaml");
    std::fs::write(
        &config_path,
        "input_dir: .\n\
         top_terms: [1]\n\
         output_suffix: _features\n\
         splits:\n  - train: data/train_balanced.csv\n    test: data/test_balanced.csv\n\
         graph:\n  backend: snapshot\n  path: graph.json\n",
    )
    .unwrap();

    let config = PipelineConfig::from_path(&config_path).unwrap();
    let graph = connect_graph(&config.resolved_graph()).await.unwrap();
    let documents = JsonDocumentStore::open(&config.input_dir).unwrap();
    let driver = EnrichmentDriver::new(config, graph, Arc::new(documents)).unwrap();

    let summary = driver.run().await.unwrap();
    assert_eq!(summary.succeeded[0].split, "train_balanced");

    let out: PathBuf = fx.root().join("data").join("train_balanced_features.csv");
    assert_eq!(float_column(&out, "similarity_top_1"), vec![1.0, 0.0]);
}

/// Answers metadata queries but cannot reach the author index
struct FlakyGraph;

#[async_trait]
impl GraphClient for FlakyGraph {
    async fn author_documents(&self, _author: AuthorId) -> GraphResult<Vec<String>> {
        Err(GraphError::ConnectionError("connection reset".to_string()))
    }

    async fn community_tags(&self) -> GraphResult<BTreeMap<CommunityId, Vec<TagEntry>>> {
        Ok(BTreeMap::new())
    }

    async fn community_documents(&self) -> GraphResult<Vec<CommunityDocuments>> {
        Ok(Vec::new())
    }

    async fn document_communities(&self) -> GraphResult<HashMap<String, CommunityId>> {
        Ok(HashMap::new())
    }

    async fn link_features(&self, _pairs: &[(AuthorId, AuthorId)]) -> GraphResult<Vec<LinkFeatures>> {
        Ok(Vec::new())
    }

    async fn ping(&self) -> GraphResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_backend_failure_aborts_run() {
    let fx = Fixture::new();
    let splits = vec![fx.split("s1", TRAIN, TEST), fx.split("s2", TRAIN, TEST)];
    let driver = fx.driver(fx.config(splits), FlakyGraph);

    let err = driver.run().await.unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, FeatureError::Graph(GraphError::ConnectionError(_))));
    assert!(!fx.root().join("s1").join("train_enriched.csv").exists());
}
