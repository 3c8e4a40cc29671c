//! Error types and handling for sendq
//!
//! Item-level failures (`SourceNotFound`, `DirectoryCreate`, `Transfer`) are recorded on the
//! work item that produced them and never abort a batch. `Connection` errors are advisory
//! signals raised by the transfer client.

use std::path::PathBuf;

/// Main error type for sendq operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// Local source of a work item does not exist
    #[error("{} not found", .path.display())]
    SourceNotFound {
        /// Local path that was not found
        path: PathBuf,
    },

    /// Remote directory could not be created
    #[error("Failed to create remote directory '{path}': {message}")]
    DirectoryCreate {
        /// Remote directory path
        path: String,
        /// Error message reported by the server
        message: String,
    },

    /// Byte transfer, listing or stat failed
    #[error("Transfer error: {message}")]
    Transfer {
        /// Error message describing the transfer failure
        message: String,
    },

    /// Connection-level failure
    #[error("Connection error: {message}")]
    Connection {
        /// Error message describing the connection issue
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
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
    /// I/O related errors
    Io,
    /// Missing local source
    SourceNotFound,
    /// Remote directory creation errors
    DirectoryCreate,
    /// Transfer errors
    Transfer,
    /// Connection errors
    Connection,
    /// Configuration errors
    Config,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::DirectoryCreate { .. } => ErrorKind::DirectoryCreate,
            Self::Transfer { .. } => ErrorKind::Transfer,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Config { .. } => ErrorKind::Config,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Check whether this error is scoped to a single work item
    ///
    /// Item errors are recorded on the item and the batch moves on.
    pub fn is_item_error(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::SourceNotFound { .. }
                | Self::DirectoryCreate { .. }
                | Self::Transfer { .. }
        )
    }

    /// Create a new source-not-found error
    pub fn source_not_found<P: Into<PathBuf>>(path: P) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Create a new directory creation error
    pub fn directory_create<P: Into<String>, S: Into<String>>(path: P, message: S) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new transfer error
    pub fn transfer<S: Into<String>>(message: S) -> Self {
        Self::Transfer {
            message: message.into(),
        }
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
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

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
