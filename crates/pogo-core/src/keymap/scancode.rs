//! HID usage → pogo keyboard scan code table.
//!
//! The keyboard reports keys by matrix position: `row << 1 | column << 4`.
//! Bit 0 is left clear for the up/down flag that the key report ORs in.

use std::fmt;

use crate::keymap::hid::HidKeyCode;

/// A device-specific key position code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanCode(u8);

impl ScanCode {
    /// Scan code of the key at matrix `row` (0–7) and `column` (0–15).
    pub const fn at(row: u8, column: u8) -> Self {
        Self((row << 1) | (column << 4))
    }

    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScanCode(0x{:02X})", self.0)
    }
}

/// Fixed mapping from every possible usage byte to an optional scan code.
#[derive(Clone)]
pub struct KeycodeTable {
    codes: [Option<ScanCode>; 256],
}

impl KeycodeTable {
    /// Builds the table for the pogo keyboard layout.
    pub fn new() -> Self {
        use HidKeyCode::*;

        let mut table = Self { codes: [None; 256] };
        let entries: &[(HidKeyCode, u8, u8)] = &[
            (KeyA, 3, 14),
            (KeyB, 0, 8),
            (KeyC, 1, 10),
            (KeyD, 0, 10),
            (KeyE, 2, 9),
            (KeyF, 1, 9),
            (KeyG, 1, 8),
            (KeyH, 1, 7),
            (KeyI, 3, 5),
            (KeyJ, 5, 6),
            (KeyK, 4, 5),
            (KeyL, 5, 4),
            (KeyM, 6, 6),
            (KeyN, 0, 7),
            (KeyO, 4, 4),
            (KeyP, 4, 3),
            (KeyQ, 2, 12),
            (KeyR, 2, 10),
            (KeyS, 3, 13),
            (KeyT, 2, 8),
            (KeyU, 4, 6),
            (KeyV, 0, 9),
            (KeyW, 2, 11),
            (KeyX, 0, 11),
            (KeyY, 3, 7),
            (KeyZ, 0, 12),
            (Digit0, 3, 4),
            (Digit1, 4, 12),
            (Digit2, 4, 11),
            (Digit3, 3, 11),
            (Digit4, 3, 10),
            (Digit5, 3, 9),
            (Digit6, 3, 8),
            (Digit7, 2, 7),
            (Digit8, 4, 7),
            (Digit9, 5, 5),
            (ArrowDown, 1, 4),
            (ArrowRight, 0, 3),
            (ArrowUp, 3, 6),
            (ArrowLeft, 2, 5),
            (End, 1, 13),
            (Backspace, 2, 3),
            (Backslash, 2, 4),
            (Enter, 2, 6),
            (Equal, 3, 3),
            (Home, 4, 2),
            (Semicolon, 5, 3),
            (Grave, 5, 7),
            (Tab, 5, 12),
            (Space, 6, 2),
            (Slash, 6, 3),
            (Period, 6, 4),
            (Comma, 6, 5),
            (Apostrophe, 6, 7),
            (CapsLock, 3, 12),
            (ControlLeft, 2, 0),
            (AltLeft, 2, 1),
            (ShiftLeft, 5, 14),
        ];
        for &(key, row, column) in entries {
            table.codes[usize::from(key.as_u8())] = Some(ScanCode::at(row, column));
        }
        table
    }

    /// Scan code for a raw usage byte, `None` if the keyboard has no such key.
    pub fn lookup(&self, usage: u8) -> Option<ScanCode> {
        self.codes[usize::from(usage)]
    }

    /// Number of mapped usages.
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates `(usage, scan_code)` pairs in usage order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, ScanCode)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(usage, code)| code.map(|c| (usage as u8, c)))
    }
}

impl Default for KeycodeTable {
    fn default() -> Self {
        Self::new()
    }
}
