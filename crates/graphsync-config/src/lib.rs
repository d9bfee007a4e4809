//! Configuration management system for graphsync
//!
//! Exclusion lists, service addresses and logging preferences are explicit
//! values handed to the tree walker and the HTTP clients at construction
//! time. This crate loads them from layered sources:
//!
//! - **Defaults**: every field has a sensible default
//! - **Files**: YAML, TOML or JSON configuration files
//! - **Environment overrides**: `GRAPHSYNC__REMOTE__BASE_URL` and friends
//! - **Validation**: bad values are rejected before any sync starts
//!
//! # Examples
//!
//! ```rust,no_run
//! use graphsync_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_source_file("graphsync.yaml")
//!     .add_env_prefix("GRAPHSYNC")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Remote store: {}", config.remote.base_url);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Main configuration structure for graphsync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote store connection settings
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Local tree scan settings
    #[serde(default)]
    pub scan: ScanConfig,
    /// Header-comment service settings
    #[serde(default)]
    pub header: HeaderConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote store connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL the endpoint paths are resolved against
    pub base_url: String,
    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl RemoteConfig {
    /// Connection establishment timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Whole-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/graph".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 300, // 5 minutes
        }
    }
}

/// Local tree scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names skipped with all their descendants
    pub excluded_dirs: Vec<String>,
    /// Case-insensitive substrings that exclude any path containing them
    pub banned_substrings: Vec<String>,
    /// Bookkeeping file never treated as workspace content
    pub reserved_manifest_file: String,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Maximum number of files read and hashed at once
    pub max_concurrent_reads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
            banned_substrings: vec!["site-packages".to_string(), "dist-info".to_string()],
            reserved_manifest_file: ".graphrag-manifest.json".to_string(),
            follow_symlinks: false,
            max_concurrent_reads: 32,
        }
    }
}

fn default_excluded_dirs() -> Vec<String> {
    [
        ".git",
        "node_modules",
        ".venv",
        "venv",
        "env",
        "ENV",
        ".python_packages",
        "dist",
        "build",
        "out",
        "__pycache__",
        "Lib",
        "lib",
        "site-packages",
        "Include",
        "Scripts",
        "bin",
    ]
    .iter()
    .map(|name| (*name).to_string())
    .collect()
}

/// Header-comment service settings
///
/// The service lives at the server root (`/api/generate-header`, `/health`),
/// not under the graph API prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Base URL of the header-comment service
    pub base_url: String,
    /// Identifier written into every generated header
    pub marker: String,
    /// Leading lines searched for the marker
    pub search_lines: usize,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            marker: "NeuroDoc".to_string(),
            search_lines: 20,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}
