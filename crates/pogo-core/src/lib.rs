//! # pogo-core
//!
//! Protocol engine for bridging a USB HID keyboard to the pogo serial
//! protocol: framing, attribute encoding, command handling, key code
//! translation and key event bookkeeping.
//!
//! The crate performs no I/O. Bytes, reports and timestamps go in; frames and
//! events come out. The `pogo-bridge` crate wires it to real devices.
//!
//! # Architecture overview (for beginners)
//!
//! The keyboard sits on a docking connector and talks to the host over a
//! serial line. Before the host accepts key presses it runs a short
//! discovery handshake: it reads a few attributes (name, serial number, ...),
//! asks for an authentication key and finally tells the keyboard to enter
//! application mode. From then on the keyboard sends key reports and a
//! periodic "I am alive" frame.
//!
//! - **`protocol`** – The byte framing, the typed attribute encoding used in
//!   handshake replies, and the dispatcher that answers host commands.
//!
//! - **`keymap`** – HID usage IDs and the table that turns them into the
//!   keyboard's row/column scan codes.
//!
//! - **`input`** – Keyboard report parsing, edge detection between successive
//!   reports and the bounded queue that holds events until they are sent.
//!
//! - **`domain`** – Session mode and keep-alive timing.

pub mod domain;
pub mod input;
pub mod keymap;
pub mod protocol;

pub use domain::session::{KeepAliveTimer, SessionMode, DEFAULT_KEEP_ALIVE};
pub use input::{KeyDirection, KeyEvent, KeyEventQueue, KeyboardReport, PushOutcome, ReportDiffer};
pub use keymap::{HidKeyCode, KeycodeTable, ScanCode};
pub use protocol::{
    CommandDispatcher, CommandId, DeviceIdentity, Dispatch, Frame, FrameDecoder, FrameError,
    FrameStatus,
};
