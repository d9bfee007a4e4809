//! Core type system and error handling for graphsync
//!
//! This crate provides the foundational types shared by every graphsync crate:
//!
//! - **Error handling**: one error enum covering transport, protocol and local I/O failures
//! - **Core types**: workspace ids, relative paths, content hashes, manifests and change records
//! - **Traits**: the async `RemoteStore` and `HeaderGenerator` service seams
//!
//! # Features
//!
//! - `std` (default): Convert `std::io::Error` into [`Error::Io`]
//! - `async`: Enable async trait definitions
//! - `serde`: Enable serialization in the remote store's wire format
//!
//! # Examples
//!
//! ```rust
//! use graphsync_types::{ChangeRecord, ChangeStatus, RelativePath};
//!
//! let record = ChangeRecord::added(RelativePath::new("src/app.py"), "print(1)".to_string());
//! assert_eq!(record.status, ChangeStatus::Added);
//! assert!(record.is_well_formed());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use traits::*;
pub use types::*;
