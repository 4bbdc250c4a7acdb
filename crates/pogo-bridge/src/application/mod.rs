//! Application layer for the bridge.
//!
//! - **`session`** – [`session::BridgeSession`] owns every piece of protocol
//!   state (receive decoder, transmit frame, mode, keep-alive timer, key
//!   queue, report differ) and exposes the handful of entry points the event
//!   loop calls. Writes go through the [`session::FrameTransport`] trait,
//!   which the infrastructure layer implements for a real serial line and
//!   tests implement with recorders.

pub mod session;

pub use session::{BridgeSession, FrameTransport, SessionError, ABORT_MARKER};
