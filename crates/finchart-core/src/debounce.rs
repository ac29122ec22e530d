//! Last-writer-wins debounce timer.
//!
//! [`Debouncer`] holds no thread or task of its own. Callers pass the current
//! [`Instant`] into every operation, which keeps the timer deterministic under
//! test and lets a host event loop decide how to wait for [`Debouncer::deadline`].

use std::time::{Duration, Instant};

/// A single-shot timer that is re-armed by every trigger.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Creates an idle debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// The quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// When the timer will fire, if armed.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true if the timer is armed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Cancels any pending firing and arms the timer for `now + delay`.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Cancels a pending firing.
    ///
    /// Returns true if the timer was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Fires the timer if its deadline has passed.
    ///
    /// Returns true at most once per arming.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
