//! Coalescing timer state.
//!
//! The first trigger arms a single fixed-delay timer. Triggers that arrive
//! while it is armed only mark the data stale. When the timer fires, exactly
//! one reconciliation runs against whatever state is current by then.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    delay_ms: u32,
    armed: bool,
    coalesced: u32,
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            armed: false,
            coalesced: 0,
        }
    }

    #[inline]
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.armed
    }

    /// Record a trigger. Returns `Some(delay)` when the caller must schedule
    /// the timer, `None` when one is already pending.
    pub fn trigger(&mut self) -> Option<u32> {
        if self.armed {
            self.coalesced += 1;
            return None;
        }
        self.armed = true;
        Some(self.delay_ms)
    }

    /// Timer callback. Returns true if a reconciliation should run now.
    ///
    /// A timer that fires after [`cancel`](Self::cancel) returns false.
    pub fn fire(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        if self.coalesced > 0 {
            log::trace!("Coalesced {} trigger(s) into one run", self.coalesced);
        }
        self.armed = false;
        self.coalesced = 0;
        true
    }

    pub fn cancel(&mut self) {
        self.armed = false;
        self.coalesced = 0;
    }
}
