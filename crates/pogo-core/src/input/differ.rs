//! Turns consecutive keyboard snapshots into press/release events.
//!
//! Order of emitted events for one report:
//!
//! 1. presses of keys new in this report, in slot order;
//! 2. releases of keys missing from this report, in previous slot order;
//! 3. Ctrl, Shift, Alt transitions, in that order.
//!
//! Left and right modifiers are merged: the keyboard only has one of each, so
//! holding both and releasing one changes nothing. GUI keys have no
//! counterpart on the keyboard and are not forwarded.

use crate::input::event::KeyEvent;
use crate::input::report::{KeyboardReport, ModifierFlags};
use crate::keymap::hid::HidKeyCode;

/// Edge detector over keyboard reports.
#[derive(Debug, Clone, Default)]
pub struct ReportDiffer {
    previous: KeyboardReport,
}

impl ReportDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares `report` with the previous one, calling `emit` for every edge,
    /// then stores it.
    ///
    /// A rollover error report keeps the previous key slots; only its
    /// modifier byte is taken.
    pub fn diff(&mut self, report: &KeyboardReport, mut emit: impl FnMut(KeyEvent)) {
        let previous = self.previous;
        let report = if report.is_rollover_error() {
            KeyboardReport {
                modifiers: report.modifiers,
                keys: previous.keys,
            }
        } else {
            *report
        };

        for usage in report.pressed().filter(|&u| !previous.contains(u)) {
            emit(KeyEvent::down(usage));
        }
        for usage in previous.pressed().filter(|&u| !report.contains(u)) {
            emit(KeyEvent::up(usage));
        }

        let modifiers: [(fn(ModifierFlags) -> bool, HidKeyCode); 3] = [
            (ModifierFlags::ctrl, HidKeyCode::ControlLeft),
            (ModifierFlags::shift, HidKeyCode::ShiftLeft),
            (ModifierFlags::alt, HidKeyCode::AltLeft),
        ];
        for (held, canonical) in modifiers {
            match (held(previous.modifiers), held(report.modifiers)) {
                (false, true) => emit(KeyEvent::down(canonical.as_u8())),
                (true, false) => emit(KeyEvent::up(canonical.as_u8())),
                _ => {}
            }
        }

        self.previous = report;
    }

    /// Forgets the previous report, as if every key had been released
    /// without emitting the releases.
    pub fn reset(&mut self) {
        self.previous = KeyboardReport::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(differ: &mut ReportDiffer, modifiers: u8, keys: [u8; 6]) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        differ.diff(&KeyboardReport::new(modifiers, keys), |e| events.push(e));
        events
    }

    #[test]
    fn test_press_then_release() {
        // Arrange
        let mut differ = ReportDiffer::new();

        // Act
        let pressed = diff(&mut differ, 0, [0x04, 0, 0, 0, 0, 0]);
        let released = diff(&mut differ, 0, [0; 6]);

        // Assert
        assert_eq!(pressed, vec![KeyEvent::down(0x04)]);
        assert_eq!(released, vec![KeyEvent::up(0x04)]);
    }

    #[test]
    fn test_downs_are_emitted_before_ups() {
        // Arrange
        let mut differ = ReportDiffer::new();
        diff(&mut differ, 0, [0x04, 0x05, 0, 0, 0, 0]);

        // Act
        let events = diff(&mut differ, 0, [0x04, 0x06, 0, 0, 0, 0]);

        // Assert
        assert_eq!(events, vec![KeyEvent::down(0x06), KeyEvent::up(0x05)]);
    }

    #[test]
    fn test_identical_reports_emit_nothing() {
        let mut differ = ReportDiffer::new();
        diff(&mut differ, 0x02, [0x04, 0, 0, 0, 0, 0]);
        assert!(diff(&mut differ, 0x02, [0x04, 0, 0, 0, 0, 0]).is_empty());
    }

    #[test]
    fn test_slot_reordering_is_not_an_edge() {
        let mut differ = ReportDiffer::new();
        diff(&mut differ, 0, [0x04, 0x05, 0, 0, 0, 0]);
        assert!(diff(&mut differ, 0, [0, 0x05, 0, 0x04, 0, 0]).is_empty());
    }

    #[test]
    fn test_left_and_right_ctrl_are_merged() {
        // Arrange
        let mut differ = ReportDiffer::new();
        let left = ModifierFlags::LEFT_CTRL;
        let both = ModifierFlags::LEFT_CTRL | ModifierFlags::RIGHT_CTRL;

        // Act
        let first = diff(&mut differ, left, [0; 6]);
        let second = diff(&mut differ, both, [0; 6]);
        let third = diff(&mut differ, ModifierFlags::RIGHT_CTRL, [0; 6]);
        let fourth = diff(&mut differ, 0, [0; 6]);

        // Assert
        assert_eq!(first, vec![KeyEvent::down(0xE0)]);
        assert!(second.is_empty());
        assert!(third.is_empty());
        assert_eq!(fourth, vec![KeyEvent::up(0xE0)]);
    }

    #[test]
    fn test_modifier_order_and_canonical_codes() {
        let mut differ = ReportDiffer::new();
        let all = ModifierFlags::RIGHT_ALT | ModifierFlags::LEFT_SHIFT | ModifierFlags::RIGHT_CTRL;

        let events = diff(&mut differ, all, [0; 6]);

        assert_eq!(
            events,
            vec![
                KeyEvent::down(0xE0),
                KeyEvent::down(0xE1),
                KeyEvent::down(0xE2)
            ]
        );
    }

    #[test]
    fn test_keys_before_modifiers() {
        let mut differ = ReportDiffer::new();
        let events = diff(&mut differ, ModifierFlags::LEFT_SHIFT, [0x04, 0, 0, 0, 0, 0]);
        assert_eq!(events, vec![KeyEvent::down(0x04), KeyEvent::down(0xE1)]);
    }

    #[test]
    fn test_gui_is_not_forwarded() {
        let mut differ = ReportDiffer::new();
        assert!(diff(&mut differ, ModifierFlags::LEFT_GUI, [0; 6]).is_empty());
        assert!(diff(&mut differ, 0, [0; 6]).is_empty());
    }

    #[test]
    fn test_rollover_keeps_keys_and_tracks_modifiers() {
        // Arrange
        let mut differ = ReportDiffer::new();
        diff(&mut differ, 0, [0x04, 0x05, 0, 0, 0, 0]);

        // Act – phantom state with Shift newly held, then a real report
        let rollover = diff(&mut differ, ModifierFlags::LEFT_SHIFT, [0x01; 6]);
        let recovered = diff(&mut differ, ModifierFlags::LEFT_SHIFT, [0x05, 0, 0, 0, 0, 0]);

        // Assert
        assert_eq!(rollover, vec![KeyEvent::down(0xE1)]);
        assert_eq!(recovered, vec![KeyEvent::up(0x04)]);
    }

    #[test]
    fn test_reset_forgets_held_keys() {
        let mut differ = ReportDiffer::new();
        diff(&mut differ, 0, [0x04, 0, 0, 0, 0, 0]);

        differ.reset();

        assert_eq!(
            diff(&mut differ, 0, [0x04, 0, 0, 0, 0, 0]),
            vec![KeyEvent::down(0x04)]
        );
    }
}
