//! Counting byte sources for uploads

use sendq_types::{Error, Result};
use std::fmt;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt, ReadBuf};

/// Shared running count of bytes read from a [`TransferSource`]
///
/// Clones observe the same counter, so the uploader can poll progress while the
/// client owns the source.
#[derive(Debug, Clone, Default)]
pub struct ByteCounter(Arc<AtomicU64>);

impl ByteCounter {
    /// Create a counter starting at `start`
    pub fn new(start: u64) -> Self {
        Self(Arc::new(AtomicU64::new(start)))
    }

    /// Current count
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Add `bytes` to the count
    pub fn add(&self, bytes: u64) {
        self.0.fetch_add(bytes, Ordering::Relaxed);
    }
}

/// Local byte stream handed to [`TransferClient::upload`](crate::TransferClient::upload)
///
/// The counter starts at the resume offset, so it always reports the position reached
/// in the local file rather than the bytes read in this session.
pub struct TransferSource {
    reader: Pin<Box<dyn AsyncRead + Send>>,
    path: PathBuf,
    offset: u64,
    counter: ByteCounter,
}

impl TransferSource {
    /// Open a local file, positioned at `offset` when resuming
    pub async fn open<P: Into<PathBuf>>(path: P, offset: Option<u64>) -> Result<Self> {
        let path = path.into();
        let mut file = File::open(&path).await.map_err(|e| Error::Io {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        let offset = offset.unwrap_or(0);
        if offset > 0 {
            file.seek(SeekFrom::Start(offset))
                .await
                .map_err(|e| Error::Io {
                    message: format!(
                        "Failed to seek '{}' to byte {}: {}",
                        path.display(),
                        offset,
                        e
                    ),
                })?;
        }

        Ok(Self {
            reader: Box::pin(file),
            path,
            offset,
            counter: ByteCounter::new(offset),
        })
    }

    /// Wrap an arbitrary reader whose first byte sits at `offset`
    pub fn from_reader<R, P>(reader: R, path: P, offset: u64) -> Self
    where
        R: AsyncRead + Send + 'static,
        P: Into<PathBuf>,
    {
        Self {
            reader: Box::pin(reader),
            path: path.into(),
            offset,
            counter: ByteCounter::new(offset),
        }
    }

    /// Local path the bytes come from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset the source starts at
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Handle on the running byte count
    pub fn counter(&self) -> ByteCounter {
        self.counter.clone()
    }

    /// Bytes read so far, including the starting offset
    pub fn bytes_read(&self) -> u64 {
        self.counter.get()
    }
}

impl fmt::Debug for TransferSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferSource")
            .field("path", &self.path)
            .field("offset", &self.offset)
            .field("bytes_read", &self.counter.get())
            .finish_non_exhaustive()
    }
}

impl AsyncRead for TransferSource {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let this = self.as_mut().get_mut();

        match this.reader.as_mut().poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let read = buf.filled().len() - before;
                this.counter.add(read as u64);
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
