//! Operator console.
//!
//! Typing `.` (followed by Enter on a line-buffered terminal) aborts the
//! current session. Every other byte is ignored.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Byte that requests an abort.
pub const ABORT_KEY: u8 = b'.';

/// Commands the console can issue to the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Abort,
}

/// Maps one console byte to a command.
pub fn command_for(byte: u8) -> Option<ConsoleCommand> {
    (byte == ABORT_KEY).then_some(ConsoleCommand::Abort)
}

/// Spawns a task that watches `input` (normally stdin) for console commands.
///
/// The task ends on EOF, read error or when the receiver is dropped.
pub fn spawn_listener<R>(mut input: R, tx: mpsc::Sender<ConsoleCommand>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = [0u8; 64];
        loop {
            let n = match input.read(&mut buf).await {
                Ok(0) | Err(_) => {
                    debug!("console input closed");
                    break;
                }
                Ok(n) => n,
            };
            for command in buf[..n].iter().filter_map(|&b| command_for(b)) {
                info!(?command, "console command");
                if tx.send(command).await.is_err() {
                    return;
                }
            }
        }
    })
}
