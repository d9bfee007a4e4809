//! Core data types for graphsync
//!
//! These are the values that cross component boundaries during a sync run:
//! identifiers, manifests, change records and the counters the remote store
//! reports back. With the `serde` feature enabled they serialize to exactly
//! the JSON shapes the remote store speaks.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path};

/// Number of hex characters kept in a [`WorkspaceId`]
pub const WORKSPACE_ID_LEN: usize = 16;

/// Short deterministic identifier scoping all remote state to one local root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Build an id from a hex digest, keeping the first [`WORKSPACE_ID_LEN`] characters
    pub fn from_digest(hex_digest: &str) -> Self {
        let end = hex_digest
            .char_indices()
            .nth(WORKSPACE_ID_LEN)
            .map_or(hex_digest.len(), |(index, _)| index);
        Self(hex_digest[..end].to_string())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Forward-slash path relative to the workspace root
///
/// This is the join key between local and remote state; two paths are equal
/// iff their normalized string forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RelativePath(String);

impl RelativePath {
    /// Normalize a path string: backslashes become `/`, a leading `./` is dropped
    pub fn new<S: AsRef<str>>(path: S) -> Self {
        let normalized = path.as_ref().replace('\\', "/");
        let trimmed = normalized.trim_start_matches("./");
        Self(trimmed.to_string())
    }

    /// Build from a filesystem path that is already relative to the root
    pub fn from_relative(path: &Path) -> Self {
        let parts: Vec<String> = path
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Self(parts.join("/"))
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelativePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Hex-encoded digest of a file's raw bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ContentHash(String);

impl ContentHash {
    /// Wrap an already hex-encoded digest
    pub fn from_hex<S: Into<String>>(hex_digest: S) -> Self {
        Self(hex_digest.into())
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot mapping of relative paths to content hashes
///
/// Used both for the manifest held by the remote store and for the one
/// computed from disk. Ordered, so iteration is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Manifest(BTreeMap<RelativePath, ContentHash>);

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the hash for a path, returning the previous one if any
    pub fn insert(&mut self, path: RelativePath, hash: ContentHash) -> Option<ContentHash> {
        self.0.insert(path, hash)
    }

    /// Remove a path from the manifest
    pub fn remove(&mut self, path: &RelativePath) -> Option<ContentHash> {
        self.0.remove(path)
    }

    /// Look up the hash recorded for a path
    pub fn get(&self, path: &RelativePath) -> Option<&ContentHash> {
        self.0.get(path)
    }

    /// Whether the manifest tracks the given path
    pub fn contains(&self, path: &RelativePath) -> bool {
        self.0.contains_key(path)
    }

    /// Number of tracked paths
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no path is tracked
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(path, hash)` pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&RelativePath, &ContentHash)> {
        self.0.iter()
    }

    /// Iterate over tracked paths in order
    pub fn paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.0.keys()
    }
}

impl FromIterator<(RelativePath, ContentHash)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (RelativePath, ContentHash)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Manifest {
    type Item = (RelativePath, ContentHash);
    type IntoIter = std::collections::btree_map::IntoIter<RelativePath, ContentHash>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Classification of a changed path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChangeStatus {
    /// Present locally, unknown to the remote store
    Added,
    /// Present on both sides with different content
    Modified,
    /// Known to the remote store, gone locally
    Deleted,
}

impl ChangeStatus {
    /// Whether records of this status carry file content
    pub fn carries_content(self) -> bool {
        matches!(self, Self::Added | Self::Modified)
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        };
        f.pad(label)
    }
}

/// How the content of a change record is transferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransferMode {
    /// The whole file text is sent
    Full,
    /// Reserved by the wire format; never produced
    Patch,
}

/// One classified path, the unit of a sync batch
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeRecord {
    /// Path relative to the workspace root
    pub path: RelativePath,
    /// Change classification
    pub status: ChangeStatus,
    /// Transfer mode, present iff content is present
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub mode: Option<TransferMode>,
    /// Full file text for added and modified paths
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub content: Option<String>,
    /// Reserved patch payload
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub patch: Option<String>,
}

impl ChangeRecord {
    /// Record for a path the remote store has never seen
    pub fn added(path: RelativePath, content: String) -> Self {
        Self::with_content(path, ChangeStatus::Added, content)
    }

    /// Record for a path whose content changed
    pub fn modified(path: RelativePath, content: String) -> Self {
        Self::with_content(path, ChangeStatus::Modified, content)
    }

    /// Record for a path that disappeared locally
    pub fn deleted(path: RelativePath) -> Self {
        Self {
            path,
            status: ChangeStatus::Deleted,
            mode: None,
            content: None,
            patch: None,
        }
    }

    fn with_content(path: RelativePath, status: ChangeStatus, content: String) -> Self {
        Self {
            path,
            status,
            mode: Some(TransferMode::Full),
            content: Some(content),
            patch: None,
        }
    }

    /// Content is present iff the status is added or modified
    pub fn is_well_formed(&self) -> bool {
        self.status.carries_content() == self.content.is_some()
            && self.content.is_some() == self.mode.is_some()
    }
}

/// Batch of change records submitted in one request
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeBatch {
    /// Workspace the batch applies to
    #[cfg_attr(feature = "serde", serde(rename = "workspaceId"))]
    pub workspace_id: WorkspaceId,
    /// Ordered change records
    pub changes: Vec<ChangeRecord>,
    /// Treat the batch as the complete initial state
    #[cfg_attr(feature = "serde", serde(default))]
    pub replace: bool,
}

impl ChangeBatch {
    /// Create a new batch
    pub fn new(workspace_id: WorkspaceId, changes: Vec<ChangeRecord>, replace: bool) -> Self {
        Self {
            workspace_id,
            changes,
            replace,
        }
    }

    /// Whether the batch carries no change
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Aggregate counters reported by the remote store after a submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SyncCounts {
    /// Paths stored for the first time
    pub added: u64,
    /// Paths whose stored content was replaced
    pub modified: u64,
    /// Paths removed from the store
    pub deleted: u64,
    /// Files re-indexed by the store
    pub upserts: u64,
}

impl SyncCounts {
    /// Whether every counter is zero
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Node counts of the remote store's graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GraphStatus {
    /// File nodes
    pub files: u64,
    /// Class nodes
    pub classes: u64,
    /// Function nodes
    pub functions: u64,
}

/// Health report of the header-comment service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ServiceHealth {
    /// `healthy` when the service is up
    pub status: String,
    /// Service name
    pub service: String,
}

impl ServiceHealth {
    /// Whether the service reported itself healthy
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
