//! Workspace tree enumeration with exclusion rules

use graphsync_config::ScanConfig;
use graphsync_types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A path left out of the local manifest for this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    /// Absolute path of the file or directory
    pub path: PathBuf,
    /// Why it was skipped
    pub reason: String,
}

impl SkippedFile {
    /// Create a new skipped entry
    pub fn new<S: Into<String>>(path: PathBuf, reason: S) -> Self {
        Self {
            path,
            reason: reason.into(),
        }
    }
}

/// Files found by a walk, plus the entries that could not be read
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// Absolute paths of regular files, in walk order
    pub files: Vec<PathBuf>,
    /// Directories or entries the walk could not read
    pub skipped: Vec<SkippedFile>,
}

/// Recursive walker applying directory-name and path-substring exclusions
#[derive(Debug, Clone)]
pub struct TreeWalker {
    excluded_dirs: HashSet<String>,
    banned_substrings: Vec<String>,
    follow_symlinks: bool,
}

impl TreeWalker {
    /// Create a walker from scan configuration
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            excluded_dirs: config.excluded_dirs.iter().cloned().collect(),
            banned_substrings: config
                .banned_substrings
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            follow_symlinks: config.follow_symlinks,
        }
    }

    /// Enumerate every regular file under `root`.
    ///
    /// Fails only when `root` is not a readable directory; unreadable
    /// entries below it are logged and reported in [`WalkOutput::skipped`].
    pub async fn walk(&self, root: &Path) -> Result<WalkOutput> {
        let walker = self.clone();
        let root = root.to_path_buf();

        tokio::task::spawn_blocking(move || walker.walk_blocking(&root))
            .await
            .map_err(|e| Error::other(format!("Tree walk task failed: {}", e)))?
    }

    /// Blocking variant of [`TreeWalker::walk`]
    pub fn walk_blocking(&self, root: &Path) -> Result<WalkOutput> {
        let metadata = std::fs::metadata(root).map_err(|e| {
            Error::io(format!(
                "Cannot read workspace root '{}': {}",
                root.display(),
                e
            ))
        })?;
        if !metadata.is_dir() {
            return Err(Error::io(format!(
                "Workspace root is not a directory: {}",
                root.display()
            )));
        }

        let mut output = WalkOutput::default();
        let entries = WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .into_iter()
            .filter_entry(|entry| self.admits(entry));

        for entry in entries {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    output.files.push(entry.into_path());
                }
                Ok(entry) if entry.path_is_symlink() && !self.follow_symlinks => {
                    // Linked files are read through the link; linked directories are not descended.
                    match std::fs::metadata(entry.path()) {
                        Ok(target) if target.is_file() => output.files.push(entry.into_path()),
                        Ok(_) => debug!("Not descending into symlink: {}", entry.path().display()),
                        Err(e) => {
                            warn!(
                                target: "graphsync_sync::walker",
                                "Skipping dangling symlink '{}': {}",
                                entry.path().display(),
                                e
                            );
                            output
                                .skipped
                                .push(SkippedFile::new(entry.into_path(), e.to_string()));
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    warn!(
                        target: "graphsync_sync::walker",
                        "Skipping unreadable entry '{}': {}",
                        path.display(),
                        e
                    );
                    output.skipped.push(SkippedFile::new(path, e.to_string()));
                }
            }
        }

        debug!(
            "Walked '{}': {} files, {} unreadable entries",
            root.display(),
            output.files.len(),
            output.skipped.len()
        );
        Ok(output)
    }

    /// Whether the walk descends into or yields `entry`; the root is always admitted
    fn admits(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        if entry.file_type().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                if self.excluded_dirs.contains(name) {
                    debug!("Excluded directory: {}", entry.path().display());
                    return false;
                }
            }
        }

        !self.is_banned(entry.path())
    }

    /// Whether the full path contains a banned substring, ignoring case
    pub fn is_banned(&self, path: &Path) -> bool {
        let lowered = path.to_string_lossy().to_lowercase();
        self.banned_substrings
            .iter()
            .any(|banned| lowered.contains(banned.as_str()))
    }
}
