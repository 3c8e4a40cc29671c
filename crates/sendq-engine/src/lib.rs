//! Sequential resumable upload engine for sendq
//!
//! This crate provides the orchestrator that drives uploads through a
//! [`TransferClient`](sendq_client::TransferClient), one item at a time.
//!
//! # Features
//!
//! - **Ordered queue**: insertion order is the upload order, reads are snapshots
//! - **Collision policy**: overwrite, skip or size-based resume per [`Behavior`](sendq_types::Behavior)
//! - **Progress**: polled byte counts with a sliding-window speed average
//! - **Hooks**: lifecycle notifications for items, connection signals and batches
//!
//! # Examples
//!
//! ```rust,no_run
//! use sendq_client::LocalFsClient;
//! use sendq_engine::{Uploader, UploaderConfig};
//! use sendq_types::{Behavior, Credentials, FileDescriptor};
//!
//! # async fn example() {
//! let config = UploaderConfig::new(Credentials::new("localhost", 21, "anonymous", ""), Behavior::Verify);
//! let mut uploader = Uploader::new(config, LocalFsClient::new("/srv/ftp"), ());
//!
//! uploader
//!     .submit(vec![FileDescriptor::file("report.pdf", "/upload/report.pdf", 1024)])
//!     .await;
//! println!("{:?}", uploader.transfer_status());
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod hooks;
pub mod item;
pub mod policy;
pub mod queue;
pub mod speed;
pub mod uploader;

pub use hooks::{Progress, UploadHooks};
pub use item::WorkItem;
pub use policy::TransferPlan;
pub use queue::{Queue, QueueEvent};
pub use speed::SpeedMeter;
pub use uploader::{Submitter, Uploader, UploaderConfig};
