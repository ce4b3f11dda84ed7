//! RemoteClient: network client for a running Neo4j server
//!
//! Talks to the HTTP transactional endpoint (`/db/{database}/tx/commit`).
//! Statements come from [`crate::queries`] and carry their values as
//! parameters.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::client::GraphClient;
use crate::error::{GraphError, GraphResult};
use crate::models::{AuthorId, CommunityDocuments, CommunityId, LinkFeatures, QueryResult, TagEntry};
use crate::queries;

/// Pairs sent per link-feature statement
const LINK_FEATURE_BATCH: usize = 500;

/// Connection settings for a remote graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// HTTP base URL, e.g. `http://localhost:7474`
    pub url: String,
    /// Database name
    #[serde(default = "default_database")]
    pub database: String,
    /// Basic-auth user
    #[serde(default)]
    pub user: Option<String>,
    /// Basic-auth password
    #[serde(default)]
    pub password: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl RemoteConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            database: default_database(),
            user: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Network client for a Neo4j server.
pub struct RemoteClient {
    commit_url: String,
    auth: Option<(String, Option<String>)>,
    http_client: Client,
}

impl RemoteClient {
    /// Create a client without contacting the server.
    pub fn new(config: &RemoteConfig) -> GraphResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GraphError::ConnectionError(e.to_string()))?;

        let commit_url = format!(
            "{}/db/{}/tx/commit",
            config.url.trim_end_matches('/'),
            config.database
        );
        let auth = config
            .user
            .clone()
            .map(|user| (user, config.password.clone()));

        Ok(Self {
            commit_url,
            auth,
            http_client,
        })
    }

    /// Create a client and verify the server answers.
    ///
    /// The error carries the reason the backend is unusable; callers decide
    /// whether that aborts their run.
    pub async fn connect(config: &RemoteConfig) -> GraphResult<Self> {
        let client = Self::new(config)?;
        client.ping().await?;
        Ok(client)
    }

    /// Execute one parameterized statement
    pub async fn run(&self, statement: &str, parameters: Value) -> GraphResult<QueryResult> {
        let body = json!({
            "statements": [{ "statement": statement, "parameters": parameters }]
        });

        let mut request = self.http_client.post(&self.commit_url).json(&body);
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || status.is_server_error()
        {
            return Err(GraphError::ConnectionError(format!(
                "{} returned {}",
                self.commit_url, status
            )));
        }
        if !status.is_success() {
            return Err(GraphError::QueryError(format!("Server returned {}", status)));
        }

        let body: TxResponse = response.json().await?;
        parse_tx_response(body)
    }
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    columns: Vec<String>,
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

fn parse_tx_response(body: TxResponse) -> GraphResult<QueryResult> {
    if let Some(err) = body.errors.first() {
        return Err(GraphError::QueryError(format!("{}: {}", err.code, err.message)));
    }

    let result = body.results.into_iter().next().ok_or_else(|| {
        GraphError::UnexpectedResult("response contained no statement result".to_string())
    })?;

    Ok(QueryResult {
        columns: result.columns,
        records: result.data.into_iter().map(|d| d.row).collect(),
    })
}

fn cell<'a>(row: &'a [Value], idx: usize) -> GraphResult<&'a Value> {
    row.get(idx)
        .ok_or_else(|| GraphError::UnexpectedResult(format!("missing column {}", idx)))
}

fn as_i64(v: &Value) -> GraphResult<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .ok_or_else(|| GraphError::UnexpectedResult(format!("expected integer, got {}", v)))
}

fn as_f64(v: &Value) -> GraphResult<f64> {
    match v {
        Value::Null => Ok(0.0),
        _ => v
            .as_f64()
            .ok_or_else(|| GraphError::UnexpectedResult(format!("expected number, got {}", v))),
    }
}

fn as_string(v: &Value) -> GraphResult<String> {
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| GraphError::UnexpectedResult(format!("expected string, got {}", v)))
}

fn as_strings(v: &Value) -> GraphResult<Vec<String>> {
    v.as_array()
        .ok_or_else(|| GraphError::UnexpectedResult(format!("expected list, got {}", v)))?
        .iter()
        .map(as_string)
        .collect()
}

fn parse_tags(v: &Value) -> GraphResult<Vec<TagEntry>> {
    let entries = v
        .as_array()
        .ok_or_else(|| GraphError::UnexpectedResult(format!("expected tag list, got {}", v)))?;

    entries
        .iter()
        .map(|entry| {
            let triple = entry.as_array().map(Vec::as_slice).unwrap_or_default();
            Ok(TagEntry {
                word: as_string(cell(triple, 0)?)?,
                score: as_f64(cell(triple, 1)?)?,
                degree: as_i64(cell(triple, 2)?)? as u64,
            })
        })
        .collect()
}

#[async_trait]
impl GraphClient for RemoteClient {
    async fn author_documents(&self, author: AuthorId) -> GraphResult<Vec<String>> {
        let result = self
            .run(queries::AUTHOR_DOCUMENTS, json!({ "author_id": author }))
            .await?;

        match result.records.first() {
            Some(row) => as_strings(cell(row, 1)?),
            None => Ok(Vec::new()),
        }
    }

    async fn community_tags(&self) -> GraphResult<BTreeMap<CommunityId, Vec<TagEntry>>> {
        let result = self.run(queries::COMMUNITY_TAGS, json!({})).await?;

        let mut tags = BTreeMap::new();
        for row in &result.records {
            let community = cell(row, 0)?;
            if community.is_null() {
                continue;
            }
            tags.insert(as_i64(community)?, parse_tags(cell(row, 1)?)?);
        }
        Ok(tags)
    }

    async fn community_documents(&self) -> GraphResult<Vec<CommunityDocuments>> {
        let result = self.run(queries::COMMUNITY_DOCUMENTS, json!({})).await?;

        result
            .records
            .iter()
            .map(|row| {
                Ok(CommunityDocuments {
                    community: as_i64(cell(row, 0)?)?,
                    documents: as_strings(cell(row, 1)?)?,
                })
            })
            .collect()
    }

    async fn document_communities(&self) -> GraphResult<HashMap<String, CommunityId>> {
        let result = self.run(queries::DOCUMENT_COMMUNITIES, json!({})).await?;

        result
            .records
            .iter()
            .map(|row| Ok((as_string(cell(row, 0)?)?, as_i64(cell(row, 1)?)?)))
            .collect()
    }

    async fn link_features(&self, pairs: &[(AuthorId, AuthorId)]) -> GraphResult<Vec<LinkFeatures>> {
        let mut features = Vec::with_capacity(pairs.len());

        for batch in pairs.chunks(LINK_FEATURE_BATCH) {
            let params: Vec<[AuthorId; 2]> = batch.iter().map(|&(a, b)| [a, b]).collect();
            let result = self
                .run(queries::LINK_FEATURES, json!({ "pairs": params }))
                .await?;

            let mut by_pair: HashMap<(AuthorId, AuthorId), LinkFeatures> = HashMap::new();
            for row in &result.records {
                let key = (as_i64(cell(row, 0)?)? as AuthorId, as_i64(cell(row, 1)?)? as AuthorId);
                by_pair.insert(
                    key,
                    LinkFeatures {
                        adamic_adar: as_f64(cell(row, 2)?)?,
                        common_neighbors: as_f64(cell(row, 3)?)?,
                        preferential_attachment: as_f64(cell(row, 4)?)?,
                        total_neighbors: as_f64(cell(row, 5)?)?,
                    },
                );
            }

            // UNWIND drops pairs whose authors are missing, so re-align by key
            for &(node1, node2) in batch {
                let f = by_pair
                    .get(&(node1, node2))
                    .copied()
                    .ok_or(GraphError::MissingLinkFeatures { node1, node2 })?;
                features.push(f);
            }
        }

        Ok(features)
    }

    async fn ping(&self) -> GraphResult<()> {
        self.run(queries::PING, json!({})).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: Value) -> GraphResult<QueryResult> {
        parse_tx_response(serde_json::from_value(body).unwrap())
    }

    #[test]
    fn test_commit_url() {
        let mut config = RemoteConfig::new("http://localhost:7474/");
        config.database = "coauthors".to_string();
        let client = RemoteClient::new(&config).unwrap();
        assert_eq!(client.commit_url, "http://localhost:7474/db/coauthors/tx/commit");
    }

    #[test]
    fn test_parse_rows() {
        let result = parse(json!({
            "results": [{
                "columns": ["author", "files"],
                "data": [{"row": [42, ["a1", "b2"]], "meta": [null, null]}]
            }],
            "errors": []
        }))
        .unwrap();

        assert_eq!(result.columns, vec!["author", "files"]);
        assert_eq!(result.len(), 1);
        assert_eq!(as_strings(&result.records[0][1]).unwrap(), vec!["a1", "b2"]);
    }

    #[test]
    fn test_parse_server_error() {
        let err = parse(json!({
            "results": [],
            "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]
        }))
        .unwrap_err();

        assert!(matches!(err, GraphError::QueryError(ref m) if m.contains("SyntaxError")));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_parse_tags_keeps_order() {
        let tags = parse_tags(&json!([["graph", 0.9, 4], ["neural", null, 2]])).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].word, "graph");
        assert_eq!(tags[0].degree, 4);
        assert_eq!(tags[1].score, 0.0);
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(as_i64(&json!(7)).unwrap(), 7);
        assert_eq!(as_i64(&json!(7.0)).unwrap(), 7);
        assert!(as_i64(&json!(7.5)).is_err());
        assert!(as_i64(&json!("7")).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let mut config = RemoteConfig::new("http://127.0.0.1:9");
        config.timeout_secs = 2;
        let err = RemoteClient::connect(&config).await.err().unwrap();
        assert!(err.is_unavailable());
    }
}
