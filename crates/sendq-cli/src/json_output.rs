//! JSON output structures for the sendq CLI

use sendq_engine::WorkItem;
use sendq_types::{Behavior, ItemStatus, TransferStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::display::uploaded_bytes;

/// Complete JSON output of a push
#[derive(Debug, Serialize, Deserialize)]
pub struct PushResultJson {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Batch statistics
    pub stats: PushStatsJson,
    /// Every queued item in upload order
    pub items: Vec<ItemJson>,
    /// Overall result
    pub result: OperationResult,
}

/// Operation metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// sendq version
    pub version: String,
    /// Operation type
    pub operation: String,
    /// Timestamp when the operation finished
    pub timestamp: String,
    /// Remote directory receiving the sources
    pub remote_dir: String,
    /// Collision policy in effect
    pub behavior: Behavior,
}

/// Batch statistics in JSON format
#[derive(Debug, Serialize, Deserialize)]
pub struct PushStatsJson {
    /// Number of queued items
    pub total: usize,
    /// Number of completed items
    pub completed: usize,
    /// Number of failed items
    pub failed: usize,
    /// Bytes of completed files
    pub bytes_uploaded: u64,
    /// Duration in seconds
    pub duration_seconds: f64,
}

/// One item in JSON format
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemJson {
    /// Display name
    pub name: String,
    /// Local source path
    pub local_path: String,
    /// Remote destination path
    pub server_path: String,
    /// Whether the item is a directory
    pub is_directory: bool,
    /// Declared size in bytes
    pub size: u64,
    /// Bytes transferred
    pub transferred: u64,
    /// Final status
    pub status: ItemStatus,
    /// Failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Overall operation result
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationResult {
    /// Whether every item completed
    pub success: bool,
    /// Result message
    pub message: String,
}

impl PushResultJson {
    /// Build the output of a finished push
    pub fn new(
        remote_dir: &str,
        behavior: Behavior,
        status: &TransferStatus,
        items: &[WorkItem],
        elapsed: Duration,
    ) -> Self {
        let success = status.error_count == 0;
        let message = if success {
            format!("Uploaded {} items", status.finished_count)
        } else {
            format!(
                "Upload completed with {} errors out of {} items",
                status.error_count, status.total
            )
        };

        Self {
            metadata: OperationMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                operation: "push".to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                remote_dir: remote_dir.to_string(),
                behavior,
            },
            stats: PushStatsJson {
                total: status.total,
                completed: status.finished_count,
                failed: status.error_count,
                bytes_uploaded: uploaded_bytes(items),
                duration_seconds: elapsed.as_secs_f64(),
            },
            items: items.iter().map(ItemJson::from).collect(),
            result: OperationResult { success, message },
        }
    }
}

impl From<&WorkItem> for ItemJson {
    fn from(item: &WorkItem) -> Self {
        Self {
            name: item.name.clone(),
            local_path: item.local_path.display().to_string(),
            server_path: item.server_path.clone(),
            is_directory: item.is_directory,
            size: item.size,
            transferred: item.transferred,
            status: item.status,
            error: item.error.clone(),
        }
    }
}
