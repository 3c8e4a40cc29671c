//! Transfer client backed by a local directory
//!
//! [`LocalFsClient`] treats a directory on this machine as the remote file system.
//! It honours the full [`TransferClient`] contract, including resume offsets and
//! connection signals, which makes it the client of choice for dry runs and tests.

use crate::client::TransferClient;
use crate::path;
use crate::source::TransferSource;
use async_trait::async_trait;
use sendq_types::{ConnectionEvent, Credentials, Error, RemoteEntry, RemoteStat, Result};
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

/// Client that uploads into a local directory
#[derive(Debug)]
pub struct LocalFsClient {
    root: PathBuf,
    connected: bool,
    events_tx: UnboundedSender<ConnectionEvent>,
    events_rx: Option<UnboundedReceiver<ConnectionEvent>>,
}

impl LocalFsClient {
    /// Create a client serving `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            root: root.into(),
            connected: false,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Directory served as the remote root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a remote path onto the served directory
    pub fn resolve(&self, remote_path: &str) -> Result<PathBuf> {
        let normalized = path::normalize(remote_path);
        let mut resolved = self.root.clone();

        for component in Path::new(normalized.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(Error::transfer(format!(
                        "Remote path '{}' escapes the served directory",
                        remote_path
                    )))
                }
            }
        }

        Ok(resolved)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(Error::connection("Not connected"))
        }
    }

    fn emit(&self, event: ConnectionEvent) {
        // The receiver may never have been taken or may be gone.
        let _ = self.events_tx.send(event);
    }
}

#[async_trait]
impl TransferClient for LocalFsClient {
    async fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        if self.connected {
            return Ok(());
        }

        let metadata = fs::metadata(&self.root).await.map_err(|e| {
            let error = Error::connection(format!(
                "Cannot open served directory '{}': {}",
                self.root.display(),
                e
            ));
            self.emit(ConnectionEvent::Error(error.to_string()));
            error
        })?;
        if !metadata.is_dir() {
            let error = Error::connection(format!(
                "Served root '{}' is not a directory",
                self.root.display()
            ));
            self.emit(ConnectionEvent::Error(error.to_string()));
            return Err(error);
        }

        self.connected = true;
        info!(
            "Connected as {} to {}",
            credentials.endpoint(),
            self.root.display()
        );
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if !self.connected {
            return Ok(());
        }

        self.connected = false;
        debug!("Disconnected from {}", self.root.display());
        self.emit(ConnectionEvent::Close);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn upload(
        &mut self,
        mut source: TransferSource,
        remote_path: &str,
        resume_offset: Option<u64>,
    ) -> Result<()> {
        self.ensure_connected()?;
        let target = self.resolve(remote_path)?;

        let mut file = match resume_offset {
            Some(offset) => {
                let mut file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&target)
                    .await
                    .map_err(|e| Error::transfer(format!("{}: {}", remote_path, e)))?;
                file.set_len(offset)
                    .await
                    .map_err(|e| Error::transfer(format!("{}: {}", remote_path, e)))?;
                file.seek(SeekFrom::Start(offset))
                    .await
                    .map_err(|e| Error::transfer(format!("{}: {}", remote_path, e)))?;
                file
            }
            None => fs::File::create(&target)
                .await
                .map_err(|e| Error::transfer(format!("{}: {}", remote_path, e)))?,
        };

        let written = tokio::io::copy(&mut source, &mut file)
            .await
            .map_err(|e| Error::transfer(format!("{}: {}", remote_path, e)))?;
        file.flush()
            .await
            .map_err(|e| Error::transfer(format!("{}: {}", remote_path, e)))?;

        debug!(
            "Stored {} bytes at {} (offset {})",
            written,
            remote_path,
            resume_offset.unwrap_or(0)
        );
        Ok(())
    }

    async fn stat(&mut self, remote_path: &str) -> Result<Option<RemoteStat>> {
        self.ensure_connected()?;
        let target = self.resolve(remote_path)?;

        match fs::metadata(&target).await {
            Ok(metadata) => Ok(Some(RemoteStat {
                size: metadata.len(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::transfer(format!("{}: {}", remote_path, e))),
        }
    }

    async fn list_dir(&mut self, remote_path: &str) -> Result<Vec<RemoteEntry>> {
        self.ensure_connected()?;
        let target = self.resolve(remote_path)?;

        let mut reader = fs::read_dir(&target)
            .await
            .map_err(|e| Error::transfer(format!("{}: {}", remote_path, e)))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| Error::transfer(format!("{}: {}", remote_path, e)))?
        {
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| Error::transfer(format!("{}: {}", remote_path, e)))?;
            entries.push(RemoteEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                is_directory: metadata.is_dir(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn mkdir_recursive(&mut self, remote_path: &str) -> Result<()> {
        self.ensure_connected()?;
        let target = self.resolve(remote_path)?;

        fs::create_dir_all(&target)
            .await
            .map_err(|e| Error::directory_create(path::normalize(remote_path), e.to_string()))
    }

    fn take_events(&mut self) -> Option<UnboundedReceiver<ConnectionEvent>> {
        self.events_rx.take()
    }
}
