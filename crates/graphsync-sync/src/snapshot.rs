//! Local manifest construction

use crate::hash::content_hash;
use crate::progress::ProgressReporter;
use crate::walker::SkippedFile;
use futures::stream::{self, StreamExt};
use graphsync_types::{ContentHash, Manifest, RelativePath};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Hashes and text of the readable files under a workspace root
#[derive(Debug, Clone, Default)]
pub struct LocalSnapshot {
    manifest: Manifest,
    contents: HashMap<RelativePath, String>,
    skipped: Vec<SkippedFile>,
}

impl LocalSnapshot {
    /// Read and hash `files`, at most `max_concurrent` at a time.
    ///
    /// Files that cannot be read are left out of the manifest and recorded
    /// as skipped; they are never hashed as empty.
    pub async fn capture(
        root: &Path,
        files: Vec<PathBuf>,
        max_concurrent: usize,
        reporter: &ProgressReporter,
    ) -> Self {
        let mut snapshot = Self::default();

        let mut reads = stream::iter(files)
            .map(|path| async move {
                let bytes = tokio::fs::read(&path).await;
                (path, bytes)
            })
            .buffer_unordered(max_concurrent.max(1));

        while let Some((path, bytes)) = reads.next().await {
            let relative = match path.strip_prefix(root) {
                Ok(relative) => RelativePath::from_relative(relative),
                Err(_) => {
                    snapshot
                        .skip(path, "outside the workspace root", reporter)
                        .await;
                    continue;
                }
            };

            match bytes {
                Ok(bytes) => {
                    let hash = content_hash(&bytes);
                    debug!("Hashed {} -> {}", relative, hash);
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    snapshot.insert(relative, hash, text);
                    reporter.file_scanned(path).await;
                }
                Err(e) => {
                    warn!(
                        target: "graphsync_sync::walker",
                        "Skipping unreadable file '{}': {}",
                        path.display(),
                        e
                    );
                    snapshot.skip(path, e.to_string(), reporter).await;
                }
            }
        }

        snapshot
    }

    /// Record a file's hash and text
    pub fn insert(&mut self, path: RelativePath, hash: ContentHash, text: String) {
        self.manifest.insert(path.clone(), hash);
        self.contents.insert(path, text);
    }

    /// Record entries the walk could not read
    pub fn extend_skipped<I: IntoIterator<Item = SkippedFile>>(&mut self, skipped: I) {
        self.skipped.extend(skipped);
    }

    async fn skip<S: Into<String>>(&mut self, path: PathBuf, reason: S, reporter: &ProgressReporter) {
        let reason = reason.into();
        reporter.file_skipped(path.clone(), reason.clone()).await;
        self.skipped.push(SkippedFile::new(path, reason));
    }

    /// Local path-to-hash manifest
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Text of a scanned file
    pub fn content(&self, path: &RelativePath) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    /// Files and directories left out of this snapshot
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Number of files hashed
    pub fn len(&self) -> usize {
        self.manifest.len()
    }

    /// Whether no file was hashed
    pub fn is_empty(&self) -> bool {
        self.manifest.is_empty()
    }
}
