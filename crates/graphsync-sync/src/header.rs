//! Documentation header comments for workspace source files
//!
//! Headers are produced by a [`HeaderGenerator`] and recognized afterwards by
//! a marker word on a single-line comment near the top of the file. Files
//! that already carry a header are left alone; clearing removes everything up
//! to and including the marker and the comment fragments that follow it.

use crate::walker::{SkippedFile, TreeWalker};
use graphsync_config::{HeaderConfig, ScanConfig};
use graphsync_types::{Error, HeaderGenerator, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Leading lines searched for the marker when clearing a header
pub const CLEAR_SEARCH_LINES: usize = 50;

/// Single-line comment prefix of the supported languages
pub fn comment_prefix(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "py" => Some("#"),
        "java" | "cpp" | "c" | "cs" | "js" | "ts" | "php" => Some("//"),
        _ => None,
    }
}

/// Whether headers can be generated for `path`
pub fn is_code_file(path: &Path) -> bool {
    comment_prefix(path).is_some()
}

/// Whether one of the first `search_lines` lines is a single-line comment
/// carrying `marker`
pub fn has_header_comment(content: &str, marker: &str, search_lines: usize) -> bool {
    content.split('\n').take(search_lines).any(|line| {
        let line = line.trim();
        line.contains(marker) && (line.starts_with('#') || line.starts_with("//"))
    })
}

/// Content with its generated header removed, or `None` when no line within
/// [`CLEAR_SEARCH_LINES`] carries `marker`.
///
/// Everything before the marker line is dropped, as are the empty lines and
/// comment fragments (`*/`, `*`, `//`) directly after it.
pub fn strip_header(content: &str, marker: &str) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let marker_line = lines
        .iter()
        .take(CLEAR_SEARCH_LINES)
        .position(|line| line.contains(marker))?;

    let code_start = lines[marker_line + 1..]
        .iter()
        .position(|line| {
            let line = line.trim();
            !(line.is_empty() || line == "*/" || line.starts_with("//") || line.starts_with('*'))
        })
        .map_or(lines.len(), |offset| marker_line + 1 + offset);

    Some(lines[code_start..].join("\n"))
}

/// Which files a header operation covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderScope {
    /// One file
    File(PathBuf),
    /// Code files directly inside a directory
    Folder(PathBuf),
    /// Code files anywhere below a workspace root, minus excluded directories
    Workspace(PathBuf),
}

impl HeaderScope {
    /// File scope for a file path, folder or workspace scope for a directory
    pub fn for_path<P: AsRef<Path>>(path: P, recursive: bool) -> Self {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            Self::File(path)
        } else if recursive {
            Self::Workspace(path)
        } else {
            Self::Folder(path)
        }
    }
}

/// Per-file results of a header operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderReport {
    /// Files rewritten
    pub updated: Vec<PathBuf>,
    /// Files that needed no change
    pub unchanged: Vec<PathBuf>,
    /// Files that could not be processed
    pub failed: Vec<SkippedFile>,
}

impl HeaderReport {
    /// Files handled without error
    pub fn succeeded(&self) -> usize {
        self.updated.len() + self.unchanged.len()
    }

    /// Whether every file was handled
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail(&mut self, path: PathBuf, error: &Error) {
        warn!("Header operation on '{}' failed: {}", path.display(), error);
        self.failed.push(SkippedFile::new(path, error.to_string()));
    }
}

enum FileAction {
    Updated,
    Unchanged,
}

/// Adds and removes generated header comments
#[derive(Debug)]
pub struct HeaderDocumenter<G> {
    generator: G,
    walker: TreeWalker,
    marker: String,
    search_lines: usize,
}

impl<G: HeaderGenerator> HeaderDocumenter<G> {
    /// Create a documenter with default settings
    pub fn new(generator: G) -> Self {
        Self::with_config(generator, &HeaderConfig::default(), &ScanConfig::default())
    }

    /// Create a documenter; `scan` supplies the workspace exclusions
    pub fn with_config(generator: G, header: &HeaderConfig, scan: &ScanConfig) -> Self {
        Self {
            generator,
            walker: TreeWalker::new(scan),
            marker: header.marker.clone(),
            search_lines: header.search_lines,
        }
    }

    /// Header service the documenter talks to
    pub const fn generator(&self) -> &G {
        &self.generator
    }

    /// Code files covered by `scope`, sorted by path
    pub async fn targets(&self, scope: &HeaderScope) -> Result<Vec<PathBuf>> {
        let mut files = match scope {
            HeaderScope::File(path) => {
                if !is_code_file(path) {
                    return Err(Error::config(format!(
                        "Unsupported file type: {}",
                        path.display()
                    )));
                }
                vec![path.clone()]
            }
            HeaderScope::Folder(dir) => {
                let mut files = Vec::new();
                let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
                    Error::io(format!("Cannot read folder '{}': {}", dir.display(), e))
                })?;
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();
                    if entry.file_type().await?.is_file() && is_code_file(&path) {
                        files.push(path);
                    }
                }
                files
            }
            HeaderScope::Workspace(root) => {
                let walk = self.walker.walk(root).await?;
                for skipped in &walk.skipped {
                    debug!("Not documenting '{}': {}", skipped.path.display(), skipped.reason);
                }
                walk.files.into_iter().filter(|f| is_code_file(f)).collect()
            }
        };
        files.sort();
        Ok(files)
    }

    /// Generate headers for every code file in `scope` that lacks one
    pub async fn generate(&self, scope: &HeaderScope) -> Result<HeaderReport> {
        let targets = self.targets(scope).await?;
        info!("Generating headers for {} files", targets.len());

        let mut report = HeaderReport::default();
        for path in targets {
            match self.generate_file(&path).await {
                Ok(FileAction::Updated) => report.updated.push(path),
                Ok(FileAction::Unchanged) => report.unchanged.push(path),
                Err(e) => report.fail(path, &e),
            }
        }

        info!(
            "Header generation finished: {} updated, {} unchanged, {} failed",
            report.updated.len(),
            report.unchanged.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Remove generated headers from every code file in `scope`
    pub async fn clear(&self, scope: &HeaderScope) -> Result<HeaderReport> {
        let targets = self.targets(scope).await?;
        info!("Clearing headers from {} files", targets.len());

        let mut report = HeaderReport::default();
        for path in targets {
            match self.clear_file(&path).await {
                Ok(FileAction::Updated) => report.updated.push(path),
                Ok(FileAction::Unchanged) => report.unchanged.push(path),
                Err(e) => report.fail(path, &e),
            }
        }

        info!(
            "Header clearing finished: {} updated, {} unchanged, {} failed",
            report.updated.len(),
            report.unchanged.len(),
            report.failed.len()
        );
        Ok(report)
    }

    async fn generate_file(&self, path: &Path) -> Result<FileAction> {
        let content = read_text(path).await?;
        if has_header_comment(&content, &self.marker, self.search_lines) {
            debug!("'{}' already has a header", path.display());
            return Ok(FileAction::Unchanged);
        }

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let modified = self.generator.generate_header(&content, &filename).await?;
        write_text(path, &modified).await?;
        debug!("Wrote header to '{}'", path.display());
        Ok(FileAction::Updated)
    }

    async fn clear_file(&self, path: &Path) -> Result<FileAction> {
        let content = read_text(path).await?;
        if !has_header_comment(&content, &self.marker, self.search_lines) {
            return Ok(FileAction::Unchanged);
        }

        let stripped = strip_header(&content, &self.marker).ok_or_else(|| {
            Error::sync(format!(
                "Could not locate header marker in '{}'",
                path.display()
            ))
        })?;
        write_text(path, &stripped).await?;
        debug!("Removed header from '{}'", path.display());
        Ok(FileAction::Updated)
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(format!("Failed to read '{}': {}", path.display(), e)))
}

async fn write_text(path: &Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| Error::io(format!("Failed to write '{}': {}", path.display(), e)))
}
