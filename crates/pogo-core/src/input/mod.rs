//! Keyboard input: HID report parsing, edge detection and the event queue.
//!
//! # Data flow (for beginners)
//!
//! A USB keyboard does not send "key pressed" messages. It sends a snapshot of
//! everything currently held: a modifier bitmask and up to six key usages.
//! [`differ::ReportDiffer`] compares each snapshot with the previous one and
//! turns the differences into [`event::KeyEvent`]s, which wait in
//! [`queue::KeyEventQueue`] until the session loop translates and transmits
//! them.

pub mod differ;
pub mod event;
pub mod queue;
pub mod report;

pub use differ::ReportDiffer;
pub use event::{KeyDirection, KeyEvent};
pub use queue::{KeyEventQueue, PushOutcome, QUEUE_SLOTS};
pub use report::{KeyboardReport, ModifierFlags, BOOT_REPORT_LEN};
