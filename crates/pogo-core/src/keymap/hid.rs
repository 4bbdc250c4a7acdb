//! USB HID usage IDs on the Keyboard/Keypad page (0x07).
//!
//! Keyboards report pressed keys as one-byte usage IDs. The IDs name physical
//! key positions, not characters: `0x04` is the key labelled "A" on a US
//! layout whatever the host's layout setting says. This is exactly what the
//! pogo keyboard wants, since it also reports positions (row/column scan codes).
//!
//! Only the main alphanumeric block, the navigation keys and the modifiers are
//! listed; those are the keys the target keyboard has. Anything else decodes
//! as [`HidKeyCode::Unknown`] and is never forwarded.
//!
//! Reference: USB HID Usage Tables 1.3, section 10.

/// HID usage ID for a keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HidKeyCode {
    /// Placeholder for reserved or unlisted usages (0x00 also means "no key"
    /// in a keyboard report slot).
    Unknown = 0x00,

    // Letters
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digit row
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Whitespace, editing and punctuation
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Apostrophe = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,

    // Navigation
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    // Modifiers. These never appear in the six key slots of a boot report;
    // they are reported through the modifier byte instead.
    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,
}

impl HidKeyCode {
    /// Converts a raw usage byte, returning [`HidKeyCode::Unknown`] for
    /// anything not listed.
    pub fn from_u8(value: u8) -> Self {
        use HidKeyCode::*;
        const LETTERS: [HidKeyCode; 26] = [
            KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN,
            KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
        ];
        const DIGITS: [HidKeyCode; 10] = [
            Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, Digit0,
        ];
        const MODIFIERS: [HidKeyCode; 8] = [
            ControlLeft, ShiftLeft, AltLeft, MetaLeft, ControlRight, ShiftRight, AltRight,
            MetaRight,
        ];

        match value {
            0x04..=0x1D => LETTERS[usize::from(value - 0x04)],
            0x1E..=0x27 => DIGITS[usize::from(value - 0x1E)],
            0xE0..=0xE7 => MODIFIERS[usize::from(value - 0xE0)],
            0x28 => Enter,
            0x29 => Escape,
            0x2A => Backspace,
            0x2B => Tab,
            0x2C => Space,
            0x2D => Minus,
            0x2E => Equal,
            0x2F => BracketLeft,
            0x30 => BracketRight,
            0x31 => Backslash,
            0x33 => Semicolon,
            0x34 => Apostrophe,
            0x35 => Grave,
            0x36 => Comma,
            0x37 => Period,
            0x38 => Slash,
            0x39 => CapsLock,
            0x4A => Home,
            0x4B => PageUp,
            0x4C => Delete,
            0x4D => End,
            0x4E => PageDown,
            0x4F => ArrowRight,
            0x50 => ArrowLeft,
            0x51 => ArrowDown,
            0x52 => ArrowUp,
            _ => Unknown,
        }
    }

    /// Returns the raw usage byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_round_trips_every_listed_usage() {
        for raw in 0..=u8::MAX {
            let code = HidKeyCode::from_u8(raw);
            if code != HidKeyCode::Unknown {
                assert_eq!(code.as_u8(), raw, "0x{raw:02X} decoded as {code:?}");
            }
        }
    }

    #[test]
    fn test_letter_and_digit_ranges() {
        assert_eq!(HidKeyCode::from_u8(0x04), HidKeyCode::KeyA);
        assert_eq!(HidKeyCode::from_u8(0x1D), HidKeyCode::KeyZ);
        assert_eq!(HidKeyCode::from_u8(0x1E), HidKeyCode::Digit1);
        assert_eq!(HidKeyCode::from_u8(0x27), HidKeyCode::Digit0);
    }

    #[test]
    fn test_unlisted_usages_are_unknown() {
        for raw in [0x00, 0x01, 0x03, 0x32, 0x3A, 0x53, 0x65, 0xE8, 0xFF] {
            assert_eq!(HidKeyCode::from_u8(raw), HidKeyCode::Unknown, "0x{raw:02X}");
        }
    }
}
