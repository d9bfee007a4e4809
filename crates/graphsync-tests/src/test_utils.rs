//! Workspace fixtures shared by the integration tests

use graphsync_remote::{ClientConfig, HttpHeaderGenerator, HttpRemoteStore};
use graphsync_sync::{HeaderDocumenter, SyncEngine};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Source files of a small Python project
pub const SAMPLE_PROJECT: &[(&str, &str)] = &[
    ("main.py", "from pkg.util import greet\n\ndef main():\n    greet()\n"),
    (
        "pkg/util.py",
        "class Greeter:\n    pass\n\ndef greet():\n    print('hi')\n",
    ),
    ("pkg/__init__.py", ""),
    ("README.md", "# sample\n"),
];

/// Write `content` at `relative` below `root`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Remove a file below `root`
pub fn remove_file(root: &Path, relative: &str) {
    fs::remove_file(root.join(relative)).expect("Failed to remove test file");
}

/// Create a temporary workspace holding `files`
pub fn create_workspace(files: &[(&str, &str)]) -> TempDir {
    let workspace = TempDir::new().expect("Failed to create temp dir");
    for (relative, content) in files {
        write_file(workspace.path(), relative, content);
    }
    workspace
}

/// Create a temporary workspace holding [`SAMPLE_PROJECT`]
pub fn create_sample_workspace() -> TempDir {
    create_workspace(SAMPLE_PROJECT)
}

/// Client configuration pointed at `base_url` with short timeouts
pub fn client_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
    }
}

/// HTTP client pointed at `base_url` with short timeouts
pub fn http_store(base_url: &str) -> HttpRemoteStore {
    HttpRemoteStore::with_config(client_config(base_url)).expect("Failed to build HTTP client")
}

/// Header service client pointed at `root_url` with short timeouts
pub fn http_header_generator(root_url: &str) -> HttpHeaderGenerator {
    HttpHeaderGenerator::with_config(client_config(root_url))
        .expect("Failed to build HTTP client")
}

/// Header documenter talking HTTP to the service at `root_url`
pub fn http_documenter(root_url: &str) -> HeaderDocumenter<HttpHeaderGenerator> {
    HeaderDocumenter::new(http_header_generator(root_url))
}

/// Sync engine talking HTTP to `base_url`
pub fn http_engine(base_url: &str) -> SyncEngine<HttpRemoteStore> {
    SyncEngine::new(http_store(base_url))
}
