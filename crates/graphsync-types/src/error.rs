//! Error types and handling for graphsync
//!
//! The taxonomy follows the three failure families a sync run can hit:
//! transport failures talking to the remote store (fatal to the run),
//! protocol failures decoding its responses (equally fatal), and local I/O
//! failures while walking the workspace (file-local skips, fatal only when
//! the workspace root itself is unusable).

/// Main error type for graphsync operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// Local I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Connection-level failure talking to the remote store
    #[error("Transport error: {message}")]
    Transport {
        /// Error message describing the transport failure
        message: String,
    },

    /// The remote store answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code returned by the remote store
        status: u16,
        /// Status reason or response body excerpt
        message: String,
    },

    /// The remote store answered with a body that could not be decoded
    #[error("Protocol error: {message}")]
    Protocol {
        /// Error message describing the decoding failure
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {seconds} seconds")]
    Timeout {
        /// Number of seconds after which the operation timed out
        seconds: u64,
    },

    /// Synchronization invariant violated
    #[error("Synchronization error: {message}")]
    Sync {
        /// Error message describing the synchronization issue
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local I/O errors
    Io,
    /// Configuration errors
    Config,
    /// Transport errors, including timeouts and non-2xx responses
    Transport,
    /// Malformed responses
    Protocol,
    /// Synchronization errors
    Sync,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::Config { .. } => ErrorKind::Config,
            Self::Transport { .. } | Self::Http { .. } | Self::Timeout { .. } => {
                ErrorKind::Transport
            }
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::Sync { .. } => ErrorKind::Sync,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// HTTP status code carried by the error, when the remote store sent one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error aborts a whole sync run.
    ///
    /// Only local I/O errors are survivable, and only for individual files;
    /// the walker decides that before the error ever reaches the engine.
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Io)
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new HTTP status error
    pub fn http<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a new protocol error
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a new sync error
    pub fn sync<S: Into<String>>(message: S) -> Self {
        Self::Sync {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
