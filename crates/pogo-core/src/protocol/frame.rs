//! Byte-level framing for the pogo serial protocol.
//!
//! Wire format:
//! ```text
//! [sync:1][len_lo:1][len_hi:1][command:1][payload:len][checksum:1]
//! ```
//! `len` is a little-endian payload byte count (0–128). The checksum is the
//! two's complement of the byte sum of `len_lo`, `len_hi`, `command` and the
//! payload, so that adding it to that sum yields zero (mod 256).
//!
//! The host opens its frames with [`HOST_SYNC`] (`0x3A`); the keyboard answers
//! with [`DEVICE_SYNC`] (`0x2E`). Everything after the sync byte is identical
//! in both directions.
//!
//! # Receive state machine (for beginners)
//!
//! Serial bytes trickle in one at a time and may start in the middle of a
//! frame (the keyboard was plugged in late, a byte was lost to noise, ...).
//! [`FrameDecoder`] therefore never assumes a frame boundary: it hunts for the
//! sync byte and only then starts interpreting length, command and payload.
//!
//! ```text
//!  Init ──► Sync ──0x3A──► LenLow ──► LenHigh ──► Command ─┬─len=0──► Checksum ──► Init
//!            ▲  │                                         └─len>0─► Data ──┘
//!            └──┘ any other byte
//! ```
//!
//! `Init` is not a "wait" state: the byte that arrives in `Init` clears the
//! pending frame and is then evaluated by `Sync` immediately, so a sync byte
//! arriving right after a completed frame is never lost.

use std::fmt;

use thiserror::Error;

/// Sync byte that opens every host → keyboard frame.
pub const HOST_SYNC: u8 = 0x3A;

/// Sync byte that opens every keyboard → host frame.
pub const DEVICE_SYNC: u8 = 0x2E;

/// Maximum number of payload bytes in a single frame.
pub const MAX_PAYLOAD_LEN: usize = 128;

/// Sync, two length bytes, command and checksum.
pub const FRAME_OVERHEAD: usize = 5;

/// Largest possible encoded frame.
pub const MAX_FRAME_LEN: usize = MAX_PAYLOAD_LEN + FRAME_OVERHEAD;

/// Errors raised while building an outbound frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Writing would push the payload past [`MAX_PAYLOAD_LEN`].
    #[error("payload overflow: need {needed} bytes, capacity is {capacity}")]
    PayloadOverflow { needed: usize, capacity: usize },

    /// A string attribute does not fit its one-byte length prefix.
    #[error("string of {len} bytes does not fit a one-byte length prefix")]
    StringTooLong { len: usize },
}

// ── Frame ─────────────────────────────────────────────────────────────────────

/// One protocol message: a command byte and up to 128 payload bytes.
///
/// The payload lives in a fixed array so a frame can be cleared and rebuilt in
/// place without allocating. The checksum is never stored; it is recomputed
/// from the live bytes by [`Frame::checksum`].
#[derive(Clone)]
pub struct Frame {
    command: u8,
    len: usize,
    payload: [u8; MAX_PAYLOAD_LEN],
}

impl Frame {
    /// Creates an empty frame for `command`.
    pub const fn empty(command: u8) -> Self {
        Self {
            command,
            len: 0,
            payload: [0; MAX_PAYLOAD_LEN],
        }
    }

    /// Creates a frame with the given payload.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PayloadOverflow`] if `payload` is longer than
    /// [`MAX_PAYLOAD_LEN`].
    pub fn new(command: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut frame = Self::empty(command);
        frame.extend(payload)?;
        Ok(frame)
    }

    /// Resets the frame in place: new command, empty payload.
    pub fn clear(&mut self, command: u8) {
        self.command = command;
        self.len = 0;
        self.payload = [0; MAX_PAYLOAD_LEN];
    }

    /// The raw command byte.
    pub fn command(&self) -> u8 {
        self.command
    }

    /// The live payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len]
    }

    /// Number of payload bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes still available before the payload is full.
    pub fn remaining(&self) -> usize {
        MAX_PAYLOAD_LEN - self.len
    }

    /// Fails unless `additional` more bytes fit in the payload.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PayloadOverflow`] when they do not fit.
    pub fn ensure_capacity(&self, additional: usize) -> Result<(), FrameError> {
        let needed = self.len + additional;
        if needed > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadOverflow {
                needed,
                capacity: MAX_PAYLOAD_LEN,
            });
        }
        Ok(())
    }

    /// Appends `bytes` to the payload. Nothing is written if they do not all fit.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PayloadOverflow`] when the payload would exceed
    /// [`MAX_PAYLOAD_LEN`].
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        self.ensure_capacity(bytes.len())?;
        self.payload[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }

    /// Two's-complement checksum over the length bytes, command and payload.
    pub fn checksum(&self) -> u8 {
        let [len_lo, len_hi] = (self.len as u16).to_le_bytes();
        let sum = self
            .payload()
            .iter()
            .fold(len_lo.wrapping_add(len_hi).wrapping_add(self.command), |acc, &b| {
                acc.wrapping_add(b)
            });
        sum.wrapping_neg()
    }

    /// Writes the wire form of this frame into `out`, replacing its contents.
    ///
    /// Exactly `5 + len()` bytes are written.
    pub fn encode_into(&self, sync: u8, out: &mut Vec<u8>) {
        let [len_lo, len_hi] = (self.len as u16).to_le_bytes();
        out.clear();
        out.reserve(FRAME_OVERHEAD + self.len);
        out.push(sync);
        out.push(len_lo);
        out.push(len_hi);
        out.push(self.command);
        out.extend_from_slice(self.payload());
        out.push(self.checksum());
    }

    /// Returns the wire form of this frame.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pogo_core::protocol::frame::{Frame, HOST_SYNC};
    ///
    /// let frame = Frame::new(0x20, &[0x07]).unwrap();
    /// assert_eq!(frame.encode(HOST_SYNC), vec![0x3A, 0x01, 0x00, 0x20, 0x07, 0xD8]);
    /// ```
    pub fn encode(&self, sync: u8) -> Vec<u8> {
        let mut out = Vec::with_capacity(FRAME_OVERHEAD + self.len);
        self.encode_into(sync, &mut out);
        out
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::empty(0)
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.command == other.command && self.payload() == other.payload()
    }
}

impl Eq for Frame {}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("command", &format_args!("0x{:02X}", self.command))
            .field("payload", &self.payload())
            .finish()
    }
}

/// Hex dump used by the frame trace logs: `cmd=0x20 len=1 [07] sum=0xD8`.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd=0x{:02X} len={} [", self.command, self.len)?;
        for (i, byte) in self.payload().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        write!(f, "] sum=0x{:02X}", self.checksum())
    }
}

// ── Receive state machine ─────────────────────────────────────────────────────

/// Receive states, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxState {
    Init,
    Sync,
    LenLow,
    LenHigh,
    Command,
    Data,
    Checksum,
}

/// Result of feeding one byte to a [`FrameDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The byte was consumed; no frame is complete yet.
    Receiving,
    /// A complete frame with a valid checksum is available via [`FrameDecoder::frame`].
    Received,
    /// The frame completed but its checksum did not match; it must be discarded.
    InvalidChecksum { expected: u8, actual: u8 },
    /// The declared payload length exceeds [`MAX_PAYLOAD_LEN`]; the frame was dropped.
    Oversized { declared: usize },
}

/// Incremental, one-byte-at-a-time frame decoder.
///
/// The decoder owns the single receive frame and overwrites it in place for
/// every new frame; the previous frame is only valid until the next byte that
/// starts a new frame is pushed.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    sync: u8,
    state: RxState,
    declared_len: usize,
    counter: usize,
    sum: u8,
    frame: Frame,
}

impl FrameDecoder {
    /// A decoder for host → keyboard traffic (sync byte [`HOST_SYNC`]).
    pub fn new() -> Self {
        Self::with_sync(HOST_SYNC)
    }

    /// A decoder that hunts for an arbitrary sync byte.
    pub fn with_sync(sync: u8) -> Self {
        Self {
            sync,
            state: RxState::Init,
            declared_len: 0,
            counter: 0,
            sum: 0,
            frame: Frame::default(),
        }
    }

    /// Current receive state.
    pub fn state(&self) -> RxState {
        self.state
    }

    /// The most recently decoded frame.
    ///
    /// Only meaningful right after [`FrameStatus::Received`].
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Forces the decoder back to `Init`, discarding any partial frame.
    pub fn reset(&mut self) {
        self.state = RxState::Init;
    }

    /// Feeds one byte into the state machine.
    pub fn push_byte(&mut self, byte: u8) -> FrameStatus {
        match self.state {
            RxState::Init => {
                self.frame.clear(0);
                self.declared_len = 0;
                self.counter = 0;
                self.sum = 0;
                self.state = RxState::Sync;
                self.hunt_sync(byte)
            }
            RxState::Sync => self.hunt_sync(byte),
            RxState::LenLow => {
                self.declared_len = usize::from(byte);
                self.sum = self.sum.wrapping_add(byte);
                self.state = RxState::LenHigh;
                FrameStatus::Receiving
            }
            RxState::LenHigh => {
                self.declared_len |= usize::from(byte) << 8;
                self.sum = self.sum.wrapping_add(byte);
                if self.declared_len > MAX_PAYLOAD_LEN {
                    self.state = RxState::Init;
                    return FrameStatus::Oversized {
                        declared: self.declared_len,
                    };
                }
                self.state = RxState::Command;
                FrameStatus::Receiving
            }
            RxState::Command => {
                self.frame.command = byte;
                self.sum = self.sum.wrapping_add(byte);
                if self.declared_len == 0 {
                    self.state = RxState::Checksum;
                } else {
                    self.counter = 0;
                    self.state = RxState::Data;
                }
                FrameStatus::Receiving
            }
            RxState::Data => {
                self.frame.payload[self.counter] = byte;
                self.sum = self.sum.wrapping_add(byte);
                self.counter += 1;
                self.frame.len = self.counter;
                if self.counter >= self.declared_len {
                    self.state = RxState::Checksum;
                }
                FrameStatus::Receiving
            }
            RxState::Checksum => {
                self.state = RxState::Init;
                let expected = self.sum.wrapping_neg();
                if expected == byte {
                    FrameStatus::Received
                } else {
                    FrameStatus::InvalidChecksum {
                        expected,
                        actual: byte,
                    }
                }
            }
        }
    }

    fn hunt_sync(&mut self, byte: u8) -> FrameStatus {
        if byte == self.sync {
            self.state = RxState::LenLow;
        }
        FrameStatus::Receiving
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
