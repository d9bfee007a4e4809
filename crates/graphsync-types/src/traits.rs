//! Core traits for graphsync operations
//!
//! The remote store is the seam the sync engine is generic over and the
//! header generator the one the header documenter is generic over: HTTP
//! clients implement both for real runs, tests substitute in-memory fakes.

#[cfg(feature = "async")]
use crate::{
    ChangeBatch, GraphStatus, Manifest, RelativePath, Result, ServiceHealth, SyncCounts,
    WorkspaceId,
};

#[cfg(feature = "async")]
use async_trait::async_trait;

/// Remote store holding the manifest of record for each workspace
///
/// Every operation is a single stateless round trip. Implementations never
/// retry; any failure is returned to the caller as-is.
#[cfg(feature = "async")]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the path-to-hash manifest the store currently holds.
    ///
    /// An unknown workspace yields an empty manifest, not an error.
    async fn fetch_manifest(&self, workspace_id: &WorkspaceId) -> Result<Manifest>;

    /// Fetch the stored text of one file; missing content yields `""`
    async fn fetch_file_content(
        &self,
        workspace_id: &WorkspaceId,
        path: &RelativePath,
    ) -> Result<String>;

    /// Submit a change batch and return the store's aggregate counters
    async fn submit(&self, batch: &ChangeBatch) -> Result<SyncCounts>;

    /// Ask a natural-language question scoped to the workspace
    async fn ask(&self, question: &str, workspace_id: &WorkspaceId) -> Result<String>;

    /// Node counts of the store's graph
    async fn status(&self) -> Result<GraphStatus>;
}

/// Service that writes documentation header comments for source files
#[cfg(feature = "async")]
#[async_trait]
pub trait HeaderGenerator: Send + Sync {
    /// Return `content` with a generated header comment placed above it
    async fn generate_header(&self, content: &str, filename: &str) -> Result<String>;

    /// Health report of the service
    async fn health(&self) -> Result<ServiceHealth>;
}
