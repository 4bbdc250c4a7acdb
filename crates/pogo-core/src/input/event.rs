//! Press/release events in raw HID usage terms.

use std::fmt;

/// Whether a key went down or came up.
///
/// The discriminant is the bit OR'd into the scan code of a key report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyDirection {
    Up = 0,
    Down = 1,
}

/// A single edge on one key, still in HID usage terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub direction: KeyDirection,
    pub usage: u8,
}

impl KeyEvent {
    pub fn down(usage: u8) -> Self {
        Self {
            direction: KeyDirection::Down,
            usage,
        }
    }

    pub fn up(usage: u8) -> Self {
        Self {
            direction: KeyDirection::Up,
            usage,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.direction {
            KeyDirection::Down => "down",
            KeyDirection::Up => "up",
        };
        write!(f, "0x{:02X} {arrow}", self.usage)
    }
}
