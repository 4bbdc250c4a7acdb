//! Keyboard report source backed by a Linux hidraw node.
//!
//! Each `read` on a hidraw node returns exactly one input report, so no
//! framing is needed: every successful read is parsed on its own.

use std::path::Path;

use pogo_core::KeyboardReport;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

use super::serial::DeviceError;

/// Largest report accepted; full-speed interrupt endpoints carry 64 bytes.
const MAX_REPORT_LEN: usize = 64;

/// Opens a hidraw node for reading.
///
/// # Errors
///
/// Returns [`DeviceError::Open`] if the node cannot be opened.
pub async fn open(path: &Path) -> Result<File, DeviceError> {
    let file = File::open(path).await.map_err(|source| DeviceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    info!("opened keyboard device {}", path.display());
    Ok(file)
}

/// Spawns a task that parses every report read from `reader` and forwards
/// the keyboard reports on `tx`.
///
/// Reports for another report id and reports too short to parse are skipped.
/// Rollover error reports are forwarded for their modifier byte. The task ends
/// on EOF, read error or when the receiver is dropped.
pub fn spawn_reader<R>(
    mut reader: R,
    report_id: Option<u8>,
    tx: mpsc::Sender<KeyboardReport>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = [0u8; MAX_REPORT_LEN];
        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) => {
                    info!("keyboard device closed");
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    error!("keyboard read error: {e}");
                    break;
                }
            };

            let Some(report) = KeyboardReport::parse(&buf[..n], report_id) else {
                trace!(len = n, "ignoring non-keyboard report");
                continue;
            };
            if report.is_rollover_error() {
                debug!("keyboard reports rollover error");
            } else {
                trace!(keys = ?report.pressed_codes().collect::<Vec<_>>(), "keyboard report");
            }
            if tx.send(report).await.is_err() {
                break;
            }
        }
    })
}
