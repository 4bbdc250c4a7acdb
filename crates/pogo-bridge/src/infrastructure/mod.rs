//! Infrastructure layer for the bridge.
//!
//! Contains the OS-facing adapters. Each device gets a reader task that only
//! forwards data over an `mpsc` channel; all protocol state stays in the
//! application layer's session.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `pogo_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`serial`** – Opens the serial device, implements `FrameTransport` on
//!   its write half and spawns the byte reader.
//! - **`hidraw`** – Reads raw HID reports from the keyboard and parses them.
//! - **`console`** – Watches stdin for the operator's abort key.
//! - **`config`** – TOML configuration with per-field defaults.

pub mod config;
pub mod console;
pub mod hidraw;
pub mod serial;
