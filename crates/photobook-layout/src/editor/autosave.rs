//! Autosave debounce
//!
//! Every mutation pushes the deadline back by the full delay, so a burst of
//! edits produces a single write after the last one.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct AutosaveDebounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl AutosaveDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the timer from `now`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }

    /// True once when the deadline has passed; the timer is then disarmed
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
