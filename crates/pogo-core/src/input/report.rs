//! Boot-protocol keyboard reports.
//!
//! ```text
//! [modifiers:1][reserved:1][key0..key5:6]
//! ```
//! Composite devices prefix every report with a one-byte report id.

use crate::keymap::hid::HidKeyCode;

/// Length of a boot keyboard report without a report id.
pub const BOOT_REPORT_LEN: usize = 8;

/// Number of key slots in a boot report.
pub const KEY_SLOTS: usize = 6;

/// Modifier bitmask from byte 0 of a keyboard report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ModifierFlags(u8);

impl ModifierFlags {
    pub const LEFT_CTRL: u8 = 0x01;
    pub const LEFT_SHIFT: u8 = 0x02;
    pub const LEFT_ALT: u8 = 0x04;
    pub const LEFT_GUI: u8 = 0x08;
    pub const RIGHT_CTRL: u8 = 0x10;
    pub const RIGHT_SHIFT: u8 = 0x20;
    pub const RIGHT_ALT: u8 = 0x40;
    pub const RIGHT_GUI: u8 = 0x80;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Either Ctrl key is held.
    pub fn ctrl(self) -> bool {
        self.0 & (Self::LEFT_CTRL | Self::RIGHT_CTRL) != 0
    }

    /// Either Shift key is held.
    pub fn shift(self) -> bool {
        self.0 & (Self::LEFT_SHIFT | Self::RIGHT_SHIFT) != 0
    }

    /// Either Alt key is held.
    pub fn alt(self) -> bool {
        self.0 & (Self::LEFT_ALT | Self::RIGHT_ALT) != 0
    }
}

/// One keyboard state snapshot.
///
/// Unused key slots hold zero. Slot order carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardReport {
    pub modifiers: ModifierFlags,
    pub keys: [u8; KEY_SLOTS],
}

impl KeyboardReport {
    pub fn new(modifiers: u8, keys: [u8; KEY_SLOTS]) -> Self {
        Self {
            modifiers: ModifierFlags::from_bits(modifiers),
            keys,
        }
    }

    /// Parses a raw report as read from a hidraw node.
    ///
    /// With `report_id` set, the first byte must equal it and is stripped.
    /// Returns `None` for reports of another id or too short to hold a boot
    /// report. Trailing bytes are ignored.
    pub fn parse(bytes: &[u8], report_id: Option<u8>) -> Option<Self> {
        let body = match report_id {
            Some(id) => match bytes.split_first() {
                Some((&first, rest)) if first == id => rest,
                _ => return None,
            },
            None => bytes,
        };
        if body.len() < BOOT_REPORT_LEN {
            return None;
        }
        let mut keys = [0u8; KEY_SLOTS];
        keys.copy_from_slice(&body[2..BOOT_REPORT_LEN]);
        Some(Self::new(body[0], keys))
    }

    /// `true` if `usage` occupies one of the key slots. Zero never matches.
    pub fn contains(&self, usage: u8) -> bool {
        usage != 0 && self.keys.contains(&usage)
    }

    /// Non-zero usages in slot order.
    pub fn pressed(&self) -> impl Iterator<Item = u8> + '_ {
        self.keys.iter().copied().filter(|&k| k != 0)
    }

    /// Keyboards report "phantom" state (usage 0x01 in every slot) when too
    /// many keys are held to tell them apart. The modifier byte of such a
    /// report is still valid.
    pub fn is_rollover_error(&self) -> bool {
        self.keys.iter().all(|&k| k == 0x01)
    }

    /// Pressed keys decoded as [`HidKeyCode`], for logging.
    pub fn pressed_codes(&self) -> impl Iterator<Item = HidKeyCode> + '_ {
        self.pressed().map(HidKeyCode::from_u8)
    }
}
