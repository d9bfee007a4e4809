//! JSON-over-HTTP client for the graphsync remote store
//!
//! This crate implements [`graphsync_types::RemoteStore`] against the remote
//! store's HTTP API, and [`graphsync_types::HeaderGenerator`] against the
//! header-comment service:
//!
//! - **Manifest fetch**: the path-to-hash mapping the store holds for a workspace
//! - **Change submission**: one batch per sync run, answered with aggregate counts
//! - **Question answering**: a RAG query scoped to a workspace
//! - **Inspection**: stored file content and graph node counts
//! - **Header comments**: generated documentation headers and a health check
//!
//! There is no retry logic; every failure surfaces to the caller with the
//! HTTP status when one was received.
//!
//! # Examples
//!
//! ```rust,no_run
//! use graphsync_remote::{ClientConfig, HttpRemoteStore};
//! use graphsync_types::{RemoteStore, WorkspaceId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HttpRemoteStore::with_config(ClientConfig::default())?;
//! let manifest = store.fetch_manifest(&WorkspaceId::from_digest("0123456789abcdef")).await?;
//! println!("{} files known remotely", manifest.len());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod header;
pub mod protocol;
mod transport;

pub use client::{ClientConfig, HttpRemoteStore};
pub use header::HttpHeaderGenerator;
pub use protocol::Endpoint;
