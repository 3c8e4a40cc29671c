//! Work items tracked by the upload queue

use sendq_types::{FileDescriptor, ItemId, ItemStatus};
use std::path::PathBuf;

/// One file or directory to upload, with its progress and status
///
/// Values handed out by [`Queue`](crate::Queue) accessors are snapshots: changing them
/// has no effect on the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkItem {
    /// Unique, time-ordered identifier
    pub id: ItemId,
    /// Whether the local source is a directory
    pub is_directory: bool,
    /// Display name
    pub name: String,
    /// Local source path
    pub local_path: PathBuf,
    /// Destination path on the server
    pub server_path: String,
    /// Declared size in bytes
    pub size: u64,
    /// Bytes confirmed transferred
    pub transferred: u64,
    /// Last failure message
    pub error: Option<String>,
    /// Current status
    pub status: ItemStatus,
}

impl WorkItem {
    /// Create a ready item from a descriptor
    pub fn new(descriptor: FileDescriptor) -> Self {
        Self {
            id: ItemId::new(),
            is_directory: descriptor.is_directory,
            name: descriptor.name,
            local_path: descriptor.local_path,
            server_path: descriptor.server_path,
            size: descriptor.size,
            transferred: 0,
            error: None,
            status: ItemStatus::Ready,
        }
    }

    /// Completion percentage, 0.0 to 100.0
    pub fn progress(&self) -> f64 {
        if self.size > 0 {
            (self.transferred.min(self.size) as f64 / self.size as f64) * 100.0
        } else if self.status == ItemStatus::Complete {
            100.0
        } else {
            0.0
        }
    }

    /// Descriptor this item was created from
    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            is_directory: self.is_directory,
            name: self.name.clone(),
            local_path: self.local_path.clone(),
            server_path: self.server_path.clone(),
            size: self.size,
        }
    }
}

impl From<FileDescriptor> for WorkItem {
    fn from(descriptor: FileDescriptor) -> Self {
        Self::new(descriptor)
    }
}
