//! Bounded FIFO of key events awaiting transmission.
//!
//! A fixed ring of [`QUEUE_SLOTS`] slots. One slot always stays empty so that
//! "full" and "empty" can be told apart from the two indices alone, which
//! leaves `QUEUE_SLOTS - 1` usable entries. When full, the newest event is
//! dropped; events already queued are never overwritten.

use tracing::trace;

use crate::domain::session::SessionMode;
use crate::input::event::KeyEvent;

/// Ring size, including the one slot that is never filled.
pub const QUEUE_SLOTS: usize = 10;

/// Result of [`KeyEventQueue::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// The session is not in keyboard mode.
    DroppedNotKeyboard,
    /// No free slot.
    DroppedFull,
}

#[derive(Debug, Clone)]
pub struct KeyEventQueue {
    slots: [Option<KeyEvent>; QUEUE_SLOTS],
    read: usize,
    write: usize,
}

impl KeyEventQueue {
    pub fn new() -> Self {
        Self {
            slots: [None; QUEUE_SLOTS],
            read: 0,
            write: 0,
        }
    }

    /// Appends `event` if the session is in keyboard mode and a slot is free.
    pub fn push(&mut self, mode: SessionMode, event: KeyEvent) -> PushOutcome {
        if !mode.is_keyboard() {
            trace!(%event, %mode, "dropping key event outside keyboard mode");
            return PushOutcome::DroppedNotKeyboard;
        }
        let next = (self.write + 1) % QUEUE_SLOTS;
        if next == self.read {
            trace!(%event, "key event queue full; dropping event");
            return PushOutcome::DroppedFull;
        }
        self.slots[self.write] = Some(event);
        self.write = next;
        PushOutcome::Queued
    }

    /// Removes and returns the oldest event.
    pub fn pop(&mut self) -> Option<KeyEvent> {
        if self.is_empty() {
            return None;
        }
        let event = self.slots[self.read].take();
        self.read = (self.read + 1) % QUEUE_SLOTS;
        event
    }

    pub fn len(&self) -> usize {
        (self.write + QUEUE_SLOTS - self.read) % QUEUE_SLOTS
    }

    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Number of events the queue can hold.
    pub fn capacity(&self) -> usize {
        QUEUE_SLOTS - 1
    }

    pub fn clear(&mut self) {
        self.slots = [None; QUEUE_SLOTS];
        self.read = 0;
        self.write = 0;
    }
}

impl Default for KeyEventQueue {
    fn default() -> Self {
        Self::new()
    }
}
