//! Graph backend construction

use crate::config::GraphBackendConfig;
use crate::error::FeatureResult;
use linkfeat_sdk::{EmbeddedClient, GraphClient, GraphError, RemoteClient};
use std::sync::Arc;
use tracing::info;

/// Connect to the configured backend.
///
/// A remote backend is pinged before it is returned; a snapshot that cannot be
/// loaded counts as an unavailable backend.
pub async fn connect_graph(config: &GraphBackendConfig) -> FeatureResult<Arc<dyn GraphClient>> {
    match config {
        GraphBackendConfig::Remote(remote) => {
            let client = RemoteClient::connect(remote).await?;
            info!(url = %remote.url, database = %remote.database, "connected to graph");
            Ok(Arc::new(client))
        }
        GraphBackendConfig::Snapshot { path } => {
            let client = EmbeddedClient::from_path(path).map_err(|e| {
                GraphError::ConnectionError(format!("cannot load snapshot {}: {}", path.display(), e))
            })?;
            info!(
                path = %path.display(),
                authors = client.author_count(),
                papers = client.paper_count(),
                "loaded graph snapshot"
            );
            Ok(Arc::new(client))
        }
    }
}
