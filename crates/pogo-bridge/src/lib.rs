//! pogo-bridge library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does pogo-bridge do? (for beginners)
//!
//! It makes an ordinary USB keyboard look like the pogo-connector keyboard a
//! host device expects. The bridge:
//!
//! 1. Listens on the serial line for the host's discovery handshake and
//!    answers it (attributes, auth key, enter application mode).
//! 2. Reads HID reports from the USB keyboard and turns them into
//!    press/release events.
//! 3. Translates each event to the keyboard's scan code and sends it as a
//!    key report frame.
//! 4. Sends a keep-alive frame whenever the line has been quiet too long.

/// Application layer: the protocol session and its transport seam.
pub mod application;

/// Infrastructure layer: serial, hidraw and console adapters, configuration.
pub mod infrastructure;
