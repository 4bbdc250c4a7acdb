//! Session mode and keep-alive timing.

use std::fmt;
use std::time::{Duration, Instant};

/// Interval between liveness frames while in keyboard mode.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_millis(400);

/// Phase of the link with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Discovery handshake in progress; key events are discarded.
    #[default]
    Negotiating,
    /// The host accepted the keyboard; key reports and keep-alives flow.
    Keyboard,
}

impl SessionMode {
    pub fn is_keyboard(self) -> bool {
        self == SessionMode::Keyboard
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Negotiating => f.write_str("negotiating"),
            SessionMode::Keyboard => f.write_str("keyboard"),
        }
    }
}

/// Tracks when the last liveness frame was sent.
///
/// A cleared timer (no frame sent yet) is always due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAliveTimer {
    last: Option<Instant>,
    interval: Duration,
}

impl KeepAliveTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            last: None,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Instant of the last restart, if any.
    pub fn last(&self) -> Option<Instant> {
        self.last
    }

    /// Records `now` as the time of the last liveness frame.
    pub fn restart(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// `true` once at least one interval has elapsed since the last restart.
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

impl Default for KeepAliveTimer {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_ALIVE)
    }
}
