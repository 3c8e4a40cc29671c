//! Transfer client contract

use crate::source::TransferSource;
use async_trait::async_trait;
use sendq_types::{ConnectionEvent, Credentials, RemoteEntry, RemoteStat, Result};
use tokio::sync::mpsc::UnboundedReceiver;

/// Protocol client performing the remote operations of an upload
///
/// The uploader owns its client exclusively and drives it from a single task, so
/// every operation takes `&mut self`. Paths are `/`-separated remote paths.
#[async_trait]
pub trait TransferClient: Send {
    /// Open the connection; a no-op when already connected
    async fn connect(&mut self, credentials: &Credentials) -> Result<()>;

    /// Close the connection; a no-op when already disconnected
    async fn disconnect(&mut self) -> Result<()>;

    /// Whether the connection is open
    fn is_connected(&self) -> bool;

    /// Write the bytes of `source` to `remote_path`
    ///
    /// With `resume_offset`, the remote object is continued at that byte position
    /// instead of being replaced. The source's counter advances as bytes are read.
    async fn upload(
        &mut self,
        source: TransferSource,
        remote_path: &str,
        resume_offset: Option<u64>,
    ) -> Result<()>;

    /// Size of the remote object, or `None` when it does not exist
    async fn stat(&mut self, remote_path: &str) -> Result<Option<RemoteStat>>;

    /// Entries of a remote directory; fails when the directory is absent
    async fn list_dir(&mut self, remote_path: &str) -> Result<Vec<RemoteEntry>>;

    /// Create a remote directory and all missing parents
    async fn mkdir_recursive(&mut self, remote_path: &str) -> Result<()>;

    /// Take the stream of connection-level signals
    ///
    /// Returns `None` once taken, or when the client raises no signals.
    fn take_events(&mut self) -> Option<UnboundedReceiver<ConnectionEvent>>;
}
