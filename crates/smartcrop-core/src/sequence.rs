//! Monotonic tickets for discarding stale responses.

use std::sync::atomic::{AtomicU64, Ordering};

/// A ticket handed out by [`RequestSequencer::issue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Issues increasing tickets; only the most recent one is current.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Make every outstanding ticket stale.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }
}
