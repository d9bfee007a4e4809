//! Content-addressed workspace synchronization for graphsync
//!
//! This crate mirrors a local file tree into a remote store that keeps a
//! path-to-hash manifest per workspace:
//!
//! - **Content Hashing**: SHA-256 over raw file bytes, and a short workspace id derived from the root path
//! - **Tree Walking**: recursive enumeration with directory-name and path-substring exclusions
//! - **Difference Detection**: classification of every path as added, modified or deleted
//! - **Change Submission**: one batch per run carrying full text for added and modified files
//! - **Progress Tracking**: phase changes published over a channel while a run is in flight
//! - **Header Comments**: generated documentation headers added to and cleared from code files
//!
//! A run against an unchanged tree sends nothing. Only whole files are
//! transferred; there is no patch mode, no conflict resolution and no local
//! hash cache.
//!
//! # Examples
//!
//! ```rust,no_run
//! use graphsync_sync::{SyncEngine, SyncRequest};
//! # use graphsync_types::RemoteStore;
//!
//! # async fn example<S: RemoteStore>(store: S) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = SyncEngine::new(store);
//! let result = engine.sync(SyncRequest::new(".")).await?;
//! println!("{} changes, counts: {:?}", result.changes.len(), result.outcome.counts());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod diff;
pub mod engine;
pub mod hash;
pub mod header;
pub mod progress;
pub mod snapshot;
pub mod submit;
pub mod walker;

#[cfg(test)]
mod testing;

pub use diff::{DiffEngine, FileChange};
pub use engine::{SyncEngine, SyncOptions, SyncOutcome, SyncRequest, SyncResult};
pub use hash::{absolute_root, content_hash, workspace_id};
pub use header::{
    comment_prefix, has_header_comment, is_code_file, strip_header, HeaderDocumenter,
    HeaderReport, HeaderScope,
};
pub use progress::{ProgressEvent, ProgressReporter, SyncPhase, SyncProgress};
pub use snapshot::LocalSnapshot;
pub use submit::{build_batch, is_bootstrap, ChangeSubmitter, SubmitOutcome};
pub use walker::{SkippedFile, TreeWalker, WalkOutput};
