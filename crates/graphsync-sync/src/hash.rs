//! Content hashing and workspace identification

use graphsync_types::{ContentHash, Error, Result, WorkspaceId};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// SHA-256 digest of raw file bytes, hex encoded
pub fn content_hash(bytes: &[u8]) -> ContentHash {
    ContentHash::from_hex(hex::encode(Sha256::digest(bytes)))
}

/// Identifier of the workspace rooted at `root`.
///
/// Relative roots are resolved against the current directory first, so `.`
/// and the absolute spelling of the same directory share an id.
pub fn workspace_id(root: &Path) -> Result<WorkspaceId> {
    let absolute = absolute_root(root)?;
    Ok(workspace_id_for(&absolute.to_string_lossy()))
}

/// Identifier derived from an already absolute root path string
pub fn workspace_id_for(absolute_root: &str) -> WorkspaceId {
    let digest = hex::encode(Sha256::digest(absolute_root.as_bytes()));
    WorkspaceId::from_digest(&digest)
}

/// Make `root` absolute without touching the filesystem.
///
/// `.` components are dropped; `..` and symlinks are kept as written.
pub fn absolute_root(root: &Path) -> Result<PathBuf> {
    let joined = if root.is_absolute() {
        root.to_path_buf()
    } else {
        let current_dir = std::env::current_dir()
            .map_err(|e| Error::io(format!("Failed to resolve current directory: {}", e)))?;
        current_dir.join(root)
    };

    Ok(joined.components().collect())
}
