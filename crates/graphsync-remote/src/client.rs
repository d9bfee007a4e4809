//! HTTP client for the remote store

use crate::protocol::{
    Endpoint, FileResponse, ManifestResponse, RagRequest, RagResponse, StatusResponse,
    SyncResponse,
};
use crate::transport::Transport;
use async_trait::async_trait;
use graphsync_config::{HeaderConfig, RemoteConfig};
use graphsync_types::{
    ChangeBatch, GraphStatus, Manifest, RelativePath, RemoteStore, Result, SyncCounts,
    WorkspaceId,
};
use std::time::Duration;
use tracing::info;

/// Remote client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL the endpoint paths are resolved against
    pub base_url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        RemoteConfig::default().into()
    }
}

impl From<RemoteConfig> for ClientConfig {
    fn from(remote_config: RemoteConfig) -> Self {
        Self {
            connect_timeout: remote_config.connect_timeout(),
            request_timeout: remote_config.request_timeout(),
            base_url: remote_config.base_url,
        }
    }
}

impl ClientConfig {
    /// Point at the header-comment service, keeping the remote store timeouts
    pub fn for_header_service(remote_config: RemoteConfig, header_config: &HeaderConfig) -> Self {
        Self {
            base_url: header_config.base_url.clone(),
            ..Self::from(remote_config)
        }
    }
}

/// [`RemoteStore`] speaking JSON over HTTP
///
/// Each operation is one request with no retry. Connection failures and
/// timeouts map to transport errors, non-2xx answers to [`Error::Http`], and
/// undecodable bodies to [`Error::Protocol`].
///
/// [`Error::Http`]: graphsync_types::Error::Http
/// [`Error::Protocol`]: graphsync_types::Error::Protocol
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    transport: Transport,
}

impl HttpRemoteStore {
    /// Create a client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
        })
    }

    /// Client configuration
    pub const fn config(&self) -> &ClientConfig {
        self.transport.config()
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_manifest(&self, workspace_id: &WorkspaceId) -> Result<Manifest> {
        let request = self
            .transport
            .get(Endpoint::Manifest)
            .query(&[("workspaceId", workspace_id.as_str())]);

        let response: ManifestResponse = self.transport.execute(Endpoint::Manifest, request).await?;
        let manifest = response.manifest.unwrap_or_default();
        info!(
            "Remote manifest for workspace {} lists {} files",
            workspace_id,
            manifest.len()
        );
        Ok(manifest)
    }

    async fn fetch_file_content(
        &self,
        workspace_id: &WorkspaceId,
        path: &RelativePath,
    ) -> Result<String> {
        let request = self.transport.get(Endpoint::File).query(&[
            ("workspaceId", workspace_id.as_str()),
            ("path", path.as_str()),
        ]);

        let response: FileResponse = self.transport.execute(Endpoint::File, request).await?;
        Ok(response.content.unwrap_or_default())
    }

    async fn submit(&self, batch: &ChangeBatch) -> Result<SyncCounts> {
        info!(
            "Submitting {} changes for workspace {} (replace: {})",
            batch.changes.len(),
            batch.workspace_id,
            batch.replace
        );
        let request = self.transport.post(Endpoint::Sync).json(batch);

        let response: SyncResponse = self.transport.execute(Endpoint::Sync, request).await?;
        Ok(response.counts.unwrap_or_default())
    }

    async fn ask(&self, question: &str, workspace_id: &WorkspaceId) -> Result<String> {
        let body = RagRequest {
            question,
            workspace_id,
        };
        let request = self.transport.post(Endpoint::Rag).json(&body);

        let response: RagResponse = self.transport.execute(Endpoint::Rag, request).await?;
        Ok(response.answer.unwrap_or_default())
    }

    async fn status(&self) -> Result<GraphStatus> {
        let request = self.transport.get(Endpoint::Status);
        let response: StatusResponse = self.transport.execute(Endpoint::Status, request).await?;
        Ok(response)
    }
}
