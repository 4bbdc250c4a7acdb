//! BridgeSession: the single owner of protocol state for one serial link.
//!
//! # Architecture
//!
//! The session is driven entirely from outside. The event loop feeds it serial
//! bytes, keyboard reports and the current time, and calls [`BridgeSession::service`]
//! to flush queued key events and keep-alives. Nothing inside the session
//! spawns tasks or holds locks, so one `&mut` borrow at a time is all the
//! synchronisation it needs.
//!
//! Every transmitted frame is built in the same reusable transmit frame and
//! encoded into the same buffer; a reply is fully written before the next
//! received byte is looked at.

use std::io;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pogo_core::input::{KeyEventQueue, KeyboardReport, PushOutcome, ReportDiffer};
use pogo_core::protocol::{
    build_keep_alive, build_key_report, command_name, CommandDispatcher, Dispatch, Frame,
    FrameDecoder, FrameError, FrameStatus, DEVICE_SYNC, MAX_FRAME_LEN,
};
use pogo_core::{HidKeyCode, KeepAliveTimer, KeycodeTable, SessionMode};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Byte written to the serial line when the session is aborted.
pub const ABORT_MARKER: u8 = 0xFF;

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Writing to the serial line failed.
    #[error("serial transport error: {0}")]
    Transport(#[from] io::Error),

    /// A reply did not fit in a frame.
    #[error("frame encoding error: {0}")]
    Encode(#[from] FrameError),
}

/// Write side of the serial link.
///
/// Infrastructure implements this over a tty; tests record or fail writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameTransport: Send {
    /// Writes all of `bytes`, returning only once they are handed to the OS.
    async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Protocol state for one keyboard ↔ host link.
pub struct BridgeSession<T: FrameTransport> {
    transport: T,
    decoder: FrameDecoder,
    tx_frame: Frame,
    tx_buffer: Vec<u8>,
    mode: SessionMode,
    keep_alive: KeepAliveTimer,
    queue: KeyEventQueue,
    differ: ReportDiffer,
    keycodes: KeycodeTable,
    dispatcher: CommandDispatcher,
}

impl<T: FrameTransport> BridgeSession<T> {
    /// Creates a session in [`SessionMode::Negotiating`].
    pub fn new(transport: T, dispatcher: CommandDispatcher, keep_alive: Duration) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(),
            tx_frame: Frame::default(),
            tx_buffer: Vec::with_capacity(MAX_FRAME_LEN),
            mode: SessionMode::Negotiating,
            keep_alive: KeepAliveTimer::new(keep_alive),
            queue: KeyEventQueue::new(),
            differ: ReportDiffer::new(),
            keycodes: KeycodeTable::new(),
            dispatcher,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn queue(&self) -> &KeyEventQueue {
        &self.queue
    }

    pub fn keep_alive(&self) -> &KeepAliveTimer {
        &self.keep_alive
    }

    // ── Serial input ──────────────────────────────────────────────────────────

    /// Feeds one received serial byte.
    ///
    /// When the byte completes a valid frame the frame is dispatched and any
    /// reply is written before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if writing the reply fails or the reply does
    /// not fit in a frame. Both are fatal for the session.
    pub async fn on_serial_byte(&mut self, byte: u8, now: Instant) -> Result<(), SessionError> {
        match self.decoder.push_byte(byte) {
            FrameStatus::Receiving => Ok(()),
            FrameStatus::Received => self.handle_frame(now).await,
            FrameStatus::InvalidChecksum { expected, actual } => {
                warn!(
                    "dropping frame with bad checksum (expected 0x{expected:02x}, got 0x{actual:02x})"
                );
                Ok(())
            }
            FrameStatus::Oversized { declared } => {
                warn!(declared, "dropping frame with oversized length");
                Ok(())
            }
        }
    }

    /// Feeds a chunk of received serial bytes, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first [`SessionError`]; later bytes are not consumed.
    pub async fn on_serial_bytes(&mut self, bytes: &[u8], now: Instant) -> Result<(), SessionError> {
        for &byte in bytes {
            self.on_serial_byte(byte, now).await?;
        }
        Ok(())
    }

    async fn handle_frame(&mut self, now: Instant) -> Result<(), SessionError> {
        let request = self.decoder.frame();
        debug!(
            "rx {} {}",
            command_name(request.command()),
            request
        );

        match self.dispatcher.dispatch(request, &mut self.tx_frame)? {
            Dispatch::Reply => self.transmit().await,
            Dispatch::EnterKeyboard => {
                self.transmit().await?;
                self.mode = SessionMode::Keyboard;
                self.keep_alive.restart(now);
                info!("host accepted keyboard; entering keyboard mode");
                Ok(())
            }
            Dispatch::Abandoned { .. } | Dispatch::Ignored => Ok(()),
        }
    }

    // ── Keyboard input ────────────────────────────────────────────────────────

    /// Diffs a keyboard report against the previous one and queues the
    /// resulting events.
    ///
    /// Events are dropped while the session is not in keyboard mode or when
    /// the queue is full. Returns the number of events queued.
    pub fn on_keyboard_report(&mut self, report: &KeyboardReport) -> usize {
        let mode = self.mode;
        let queue = &mut self.queue;
        let mut queued = 0;
        self.differ.diff(report, |event| {
            if queue.push(mode, event) == PushOutcome::Queued {
                queued += 1;
            }
        });
        queued
    }

    // ── Periodic work ─────────────────────────────────────────────────────────

    /// Transmits every queued key event, then a keep-alive if one is due.
    ///
    /// Does nothing outside keyboard mode.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transport`] if a write fails. Events popped
    /// before the failure are lost.
    pub async fn service(&mut self, now: Instant) -> Result<(), SessionError> {
        if !self.mode.is_keyboard() {
            return Ok(());
        }

        while let Some(event) = self.queue.pop() {
            let Some(scan_code) = self.keycodes.lookup(event.usage) else {
                trace!(
                    key = ?HidKeyCode::from_u8(event.usage),
                    "no scan code for usage 0x{:02x}; skipping",
                    event.usage
                );
                continue;
            };
            build_key_report(&mut self.tx_frame, event.direction, scan_code);
            self.transmit().await?;
        }

        if self.keep_alive.is_due(now) {
            build_keep_alive(&mut self.tx_frame);
            self.transmit().await?;
            self.keep_alive.restart(now);
        }
        Ok(())
    }

    /// Abandons the link: discards any partial frame, returns to
    /// negotiation, forgets queued and held keys and writes
    /// [`ABORT_MARKER`] to the line.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transport`] if the marker cannot be written.
    /// The state is reset regardless.
    pub async fn abort(&mut self) -> Result<(), SessionError> {
        self.decoder.reset();
        self.mode = SessionMode::Negotiating;
        self.keep_alive.clear();
        self.queue.clear();
        self.differ.reset();
        info!("session aborted; waiting for a new handshake");
        self.transport.write_all(&[ABORT_MARKER]).await?;
        Ok(())
    }

    async fn transmit(&mut self) -> Result<(), SessionError> {
        self.tx_buffer.clear();
        self.tx_frame.encode_into(DEVICE_SYNC, &mut self.tx_buffer);
        debug!(
            "tx {} {}",
            command_name(self.tx_frame.command()),
            self.tx_frame
        );
        self.transport.write_all(&self.tx_buffer).await?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pogo_core::protocol::HOST_SYNC;

    fn request(command: u8, payload: &[u8]) -> Vec<u8> {
        Frame::new(command, payload).unwrap().encode(HOST_SYNC)
    }

    fn broken_pipe() -> io::Error {
        io::Error::new(io::ErrorKind::BrokenPipe, "serial line gone")
    }

    #[tokio::test]
    async fn test_enter_app_write_failure_keeps_negotiating() {
        // Arrange
        let mut transport = MockFrameTransport::new();
        transport
            .expect_write_all()
            .times(1)
            .returning(|_| Err(broken_pipe()));
        let mut session =
            BridgeSession::new(transport, CommandDispatcher::default(), Duration::from_millis(400));

        // Act
        let result = session.on_serial_bytes(&request(0x04, &[]), Instant::now()).await;

        // Assert
        assert!(matches!(result, Err(SessionError::Transport(_))));
        assert_eq!(session.mode(), SessionMode::Negotiating);
        assert_eq!(session.keep_alive().last(), None);
    }

    #[tokio::test]
    async fn test_enter_app_writes_reply_then_switches_mode() {
        // Arrange
        let mut transport = MockFrameTransport::new();
        let expected = Frame::empty(0x04).encode(DEVICE_SYNC);
        transport
            .expect_write_all()
            .withf(move |bytes| bytes == expected.as_slice())
            .times(1)
            .returning(|_| Ok(()));
        let mut session =
            BridgeSession::new(transport, CommandDispatcher::default(), Duration::from_millis(400));
        let now = Instant::now();

        // Act
        session.on_serial_bytes(&request(0x04, &[]), now).await.unwrap();

        // Assert
        assert_eq!(session.mode(), SessionMode::Keyboard);
        assert_eq!(session.keep_alive().last(), Some(now));
    }

    #[tokio::test]
    async fn test_ignored_and_abandoned_commands_write_nothing() {
        // Arrange – any write would panic on an unexpected call
        let transport = MockFrameTransport::new();
        let mut session =
            BridgeSession::new(transport, CommandDispatcher::default(), Duration::from_millis(400));

        // Act
        let now = Instant::now();
        session.on_serial_bytes(&request(0x0F, &[]), now).await.unwrap();
        session.on_serial_bytes(&request(0x20, &[0x99]), now).await.unwrap();

        // Assert
        assert_eq!(session.mode(), SessionMode::Negotiating);
    }

    #[tokio::test]
    async fn test_oversized_reply_is_an_encode_error() {
        let transport = MockFrameTransport::new();
        let mut session =
            BridgeSession::new(transport, CommandDispatcher::default(), Duration::from_millis(400));

        let result = session
            .on_serial_bytes(&request(0x20, &[0x05; 9]), Instant::now())
            .await;

        assert!(matches!(result, Err(SessionError::Encode(FrameError::PayloadOverflow { .. }))));
    }

    #[tokio::test]
    async fn test_abort_writes_marker_even_from_negotiation() {
        let mut transport = MockFrameTransport::new();
        transport
            .expect_write_all()
            .withf(|bytes| bytes == [ABORT_MARKER].as_slice())
            .times(1)
            .returning(|_| Ok(()));
        let mut session =
            BridgeSession::new(transport, CommandDispatcher::default(), Duration::from_millis(400));

        session.abort().await.unwrap();

        assert_eq!(session.mode(), SessionMode::Negotiating);
    }

    #[tokio::test]
    async fn test_service_outside_keyboard_mode_is_silent() {
        let transport = MockFrameTransport::new();
        let mut session =
            BridgeSession::new(transport, CommandDispatcher::default(), Duration::from_millis(400));

        assert_eq!(session.on_keyboard_report(&KeyboardReport::new(0, [0x04, 0, 0, 0, 0, 0])), 0);
        session.service(Instant::now()).await.unwrap();

        assert!(session.queue().is_empty());
    }
}
