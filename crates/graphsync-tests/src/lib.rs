//! graphsync end-to-end test support
//!
//! Provides an in-process HTTP graph store and workspace fixtures so the
//! integration tests can drive the full sync engine over real sockets.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// In-process HTTP graph store
pub mod fake_server;

/// Workspace fixtures
pub mod test_utils;

pub use fake_server::{FakeGraphServer, RecordedRequest};
