//! Result type alias for sendq operations

use crate::Error;

/// Result type alias for sendq operations
pub type Result<T> = std::result::Result<T, Error>;
