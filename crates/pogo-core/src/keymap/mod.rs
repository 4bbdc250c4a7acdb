//! Key code translation from USB HID usages to pogo keyboard scan codes.
//!
//! Reports arrive in HID usage IDs (page 0x07, Keyboard/Keypad); the serial
//! protocol wants the keyboard's own matrix scan codes. Translation happens at
//! transmit time, so queued events keep the raw usage.

pub mod hid;
pub mod scancode;

pub use hid::HidKeyCode;
pub use scancode::{KeycodeTable, ScanCode};
