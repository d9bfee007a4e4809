//! Wire protocol of the remote store
//!
//! All endpoints speak JSON and are resolved relative to the configured base
//! URL. Response bodies are lenient: a missing field, a `null` field, a
//! `null` body and an empty body all decode to the field's empty value.

use graphsync_types::{
    Error, GraphStatus, Manifest, Result, ServiceHealth, SyncCounts, WorkspaceId,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Endpoints exposed by the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET manifest?workspaceId=<id>`
    Manifest,
    /// `GET file?workspaceId=<id>&path=<relPath>`
    File,
    /// `POST sync`
    Sync,
    /// `POST rag`
    Rag,
    /// `GET status`
    Status,
    /// `POST api/generate-header` on the header-comment service
    GenerateHeader,
    /// `GET health` on the header-comment service
    Health,
}

impl Endpoint {
    /// Path segment relative to the base URL
    pub const fn path(self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::File => "file",
            Self::Sync => "sync",
            Self::Rag => "rag",
            Self::Status => "status",
            Self::GenerateHeader => "api/generate-header",
            Self::Health => "health",
        }
    }

    /// Resolve the endpoint against a base URL
    pub fn url(self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Body of `GET manifest`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestResponse {
    /// Path-to-hash mapping; absent for unknown workspaces
    pub manifest: Option<Manifest>,
}

/// Body of `GET file`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResponse {
    /// Stored text of the file
    pub content: Option<String>,
}

/// Body of `POST sync`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncResponse {
    /// Success flag some store versions send alongside the counts
    pub success: Option<bool>,
    /// Aggregate counters; absent counts are reported as all zero
    pub counts: Option<SyncCounts>,
}

/// Body sent to `POST rag`
#[derive(Debug, Clone, Serialize)]
pub struct RagRequest<'a> {
    /// Natural-language question
    pub question: &'a str,
    /// Workspace the question is scoped to
    #[serde(rename = "workspaceId")]
    pub workspace_id: &'a WorkspaceId,
}

/// Body of `POST rag`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagResponse {
    /// Free-text answer
    pub answer: Option<String>,
}

/// Body of `GET status`
pub type StatusResponse = GraphStatus;

/// Body sent to `POST api/generate-header`
#[derive(Debug, Clone, Serialize)]
pub struct HeaderRequest<'a> {
    /// Full text of the source file
    pub content: &'a str,
    /// File name, used by the service to infer the language
    pub filename: &'a str,
    /// Explicit language; the service infers it from `filename` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
}

/// Generated header parts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderComment {
    /// What the file is for
    pub purpose: String,
    /// Usage example
    pub example: String,
    /// Related types
    pub related_classes: String,
}

/// Body of `POST api/generate-header`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderResponse {
    /// Whether generation succeeded
    pub success: Option<bool>,
    /// The header parts
    pub header_comment: Option<HeaderComment>,
    /// Header comment followed by the original content
    pub modified_content: Option<String>,
    /// Language the service detected
    pub language: Option<String>,
    /// Error message sent alongside `success: false`
    pub error: Option<String>,
}

/// Body of `GET health`
pub type HealthResponse = ServiceHealth;

/// Decode a response body; an empty or `null` body decodes as `{}`
pub fn decode_body<T>(endpoint: Endpoint, body: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let body = body.trim();
    if body.is_empty() || body == "null" {
        return Ok(T::default());
    }

    serde_json::from_str(body).map_err(|e| {
        Error::protocol(format!("Malformed response from '{}': {}", endpoint, e))
    })
}
