//! Transfer clients for sendq
//!
//! This crate defines the contract the uploader drives and ships one implementation:
//!
//! - **`TransferClient`**: connect, stat, list, recursive mkdir and resumable upload
//! - **`TransferSource`**: a local byte stream with a shared running byte count
//! - **`LocalFsClient`**: serves a local directory as the remote file system
//! - **`path`**: `/`-separated remote path helpers
//!
//! # Examples
//!
//! ```rust
//! use sendq_client::{LocalFsClient, TransferClient, TransferSource};
//! use sendq_types::Credentials;
//!
//! # async fn example() -> sendq_types::Result<()> {
//! let mut client = LocalFsClient::new("/srv/ftp");
//! client.connect(&Credentials::new("localhost", 21, "anonymous", "")).await?;
//!
//! let source = TransferSource::open("report.pdf", None).await?;
//! client.mkdir_recursive("/upload").await?;
//! client.upload(source, "/upload/report.pdf", None).await?;
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod local;
pub mod path;
pub mod source;

pub use client::TransferClient;
pub use local::LocalFsClient;
pub use source::{ByteCounter, TransferSource};
