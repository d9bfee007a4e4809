//! Result type alias for graphsync operations

use crate::Error;

/// Result type alias for graphsync operations
pub type Result<T> = std::result::Result<T, Error>;
