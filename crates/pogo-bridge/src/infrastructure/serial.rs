//! Serial line I/O.
//!
//! The serial device is opened as a plain file; line settings (baud rate,
//! raw mode) are expected to be configured beforehand, e.g. with `stty`.
//!
//! Architecture:
//! - [`SerialPort`] owns the write half and implements [`FrameTransport`].
//! - [`spawn_reader`] moves the read half into a task that forwards raw byte
//!   chunks on an `mpsc` channel. Framing happens in the session, not here.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::application::FrameTransport;

/// Bytes requested per read. A full frame is at most 133 bytes.
const READ_CHUNK: usize = 256;

/// Errors opening a device node.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Write half of the serial link.
pub struct SerialPort<W> {
    writer: W,
}

impl<W> SerialPort<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Wraps any async writer, e.g. a tty file or an in-memory pipe.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl SerialPort<File> {
    /// Opens `path` read/write and returns the port plus a separate handle
    /// for the reader task.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Open`] if the device cannot be opened or its
    /// handle cannot be duplicated.
    pub async fn open(path: &Path) -> Result<(Self, File), DeviceError> {
        let open_err = |source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .await
            .map_err(open_err)?;
        let reader = file.try_clone().await.map_err(open_err)?;
        info!("opened serial device {}", path.display());
        Ok((Self::new(file), reader))
    }
}

#[async_trait]
impl<W> FrameTransport for SerialPort<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await
    }
}

/// Spawns a task that reads `reader` until EOF or error and forwards each
/// non-empty chunk on `tx`.
///
/// The task ends when the reader hits EOF, a read fails or the receiver is
/// dropped. Dropping `tx` is how the event loop learns the line is gone.
pub fn spawn_reader<R>(mut reader: R, tx: mpsc::Sender<Vec<u8>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => {
                    debug!("serial reader reached end of stream");
                    break;
                }
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("serial read error: {e}");
                    break;
                }
            }
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
