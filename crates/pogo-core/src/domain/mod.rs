//! Session-level domain state.
//!
//! Pure data with no I/O: which phase the session is in and when the next
//! liveness frame is owed. Time is always passed in by the caller, which keeps
//! these types deterministic under test.

pub mod session;
