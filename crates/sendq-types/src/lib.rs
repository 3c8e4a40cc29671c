//! Core type system and error handling for sendq
//!
//! This crate provides the value types and error handling shared by every sendq crate:
//!
//! - **Error handling**: one error enum with helper constructors and kinds
//! - **Core types**: item identifiers and status, collision behavior, credentials,
//!   file descriptors and aggregate transfer status
//!
//! # Features
//!
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use sendq_types::{Behavior, FileDescriptor, Result};
//!
//! fn describe() -> Result<FileDescriptor> {
//!     let behavior: Behavior = "verify".parse()?;
//!     assert_eq!(behavior, Behavior::Verify);
//!     Ok(FileDescriptor::file("/data/a.bin", "/upload/a.bin", 1024))
//! }
//! # describe().unwrap();
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use types::*;
