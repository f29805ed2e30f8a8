//! Logical event clock.
//!
//! Event timestamps are ordering tokens, not wall-clock time: a single
//! monotonically increasing sequence shared by everything that stamps
//! events. Cloning an `EventClock` yields a handle onto the same
//! sequence, so every event stamped anywhere in one manager is strictly
//! ordered against every other.

use std::cell::Cell;
use std::rc::Rc;

/// Shared monotonic sequence for event timestamps.
#[derive(Debug, Clone, Default)]
pub struct EventClock {
    seq: Rc<Cell<u64>>,
}

impl EventClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next timestamp. The first call returns 1.
    pub fn next(&self) -> u64 {
        let value = self.seq.get() + 1;
        self.seq.set(value);
        value
    }

    /// The most recently issued timestamp, 0 before any issue.
    pub fn last(&self) -> u64 {
        self.seq.get()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn timestamps_are_strictly_increasing() {
        let clock = EventClock::new();
        assert_eq!(clock.last(), 0);
        let a = clock.next();
        let b = clock.next();
        let c = clock.next();
        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(clock.last(), 3);
    }

    #[test]
    fn clones_share_one_sequence() {
        let clock = EventClock::new();
        let other = clock.clone();
        assert_eq!(clock.next(), 1);
        assert_eq!(other.next(), 2);
        assert_eq!(clock.next(), 3);
    }
}
