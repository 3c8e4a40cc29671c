//! Core data types for sendq
//!
//! This module provides the value types shared by the queue, the uploader and the
//! transfer clients: identifiers, item status, collision behavior, credentials and
//! the descriptors callers submit.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::Error;

/// Unique, time-ordered identifier of a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemId(uuid::Uuid);

impl ItemId {
    /// Create a new item ID
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ItemStatus {
    /// Waiting to be picked up by the scheduling loop
    #[default]
    Ready,
    /// Currently being transferred
    Uploading,
    /// Transferred (or already satisfied on the server)
    Complete,
    /// Failed; the item's error field holds the reason
    Error,
}

impl ItemStatus {
    /// Check if the status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ready => "Ready",
            Self::Uploading => "Uploading",
            Self::Complete => "Complete",
            Self::Error => "Error",
        };
        f.write_str(name)
    }
}

/// Collision policy applied when the remote object already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Behavior {
    /// Always transfer the full file, overwriting remote content
    #[cfg_attr(feature = "serde", serde(alias = "cover"))]
    Cover,
    /// Never transfer data; the remote side is assumed to be satisfied
    #[cfg_attr(feature = "serde", serde(alias = "skip"))]
    Skip,
    /// Compare sizes: full transfer, resume, or nothing
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "verify"))]
    Verify,
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cover => "Cover",
            Self::Skip => "Skip",
            Self::Verify => "Verify",
        };
        f.write_str(name)
    }
}

impl FromStr for Behavior {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cover" => Ok(Self::Cover),
            "skip" => Ok(Self::Skip),
            "verify" => Ok(Self::Verify),
            other => Err(Error::config(format!(
                "unknown behavior '{}', expected one of: cover, skip, verify",
                other
            ))),
        }
    }
}

/// Server credentials
#[derive(Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Credentials {
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login user
    pub user: String,
    /// Login password
    pub password: String,
}

impl Credentials {
    /// Create new credentials
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
        }
    }

    /// `user@host:port`, suitable for logs
    pub fn endpoint(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Descriptor of a local file or directory submitted for upload
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileDescriptor {
    /// Whether the local source is a directory
    pub is_directory: bool,
    /// Display name
    pub name: String,
    /// Local source path
    pub local_path: PathBuf,
    /// Destination path on the server, `/`-separated
    pub server_path: String,
    /// Declared size in bytes (0 for directories)
    pub size: u64,
}

impl FileDescriptor {
    /// Describe a local file
    pub fn file(
        local_path: impl Into<PathBuf>,
        server_path: impl Into<String>,
        size: u64,
    ) -> Self {
        let local_path = local_path.into();
        Self {
            is_directory: false,
            name: display_name(&local_path),
            local_path,
            server_path: server_path.into(),
            size,
        }
    }

    /// Describe a local directory
    pub fn directory(local_path: impl Into<PathBuf>, server_path: impl Into<String>) -> Self {
        let local_path = local_path.into();
        Self {
            is_directory: true,
            name: display_name(&local_path),
            local_path,
            server_path: server_path.into(),
            size: 0,
        }
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Entry of a remote directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemoteEntry {
    /// Entry name (no `.` or `..`)
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Whether the entry is a directory
    pub is_directory: bool,
}

/// Metadata of an existing remote object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemoteStat {
    /// Size in bytes
    pub size: u64,
}

/// Connection-level signal raised by a transfer client
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConnectionEvent {
    /// The connection reported an error
    Error(String),
    /// The server ended the connection
    End,
    /// The connection was closed
    Close,
}

/// Count of terminal items in a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatusCount {
    /// Items with status `Complete`
    pub finished: usize,
    /// Items with status `Error`
    pub error: usize,
}

/// Aggregate status of an uploader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransferStatus {
    /// A batch is being processed
    pub is_uploading: bool,
    /// The last batch ran to completion
    pub is_finished: bool,
    /// Smoothed throughput in bytes per second
    pub speed_average: u64,
    /// Number of items in the queue
    pub total: usize,
    /// Items with status `Complete`
    pub finished_count: usize,
    /// Items with status `Error`
    pub error_count: usize,
}

impl TransferStatus {
    /// Items that reached a terminal status
    pub fn processed(&self) -> usize {
        self.finished_count + self.error_count
    }
}
