//! Millisecond timestamps that never repeat or go backwards within a process.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Issues `max(wall clock, previous + 1)` on every reading.
///
/// Gives creations a total order for `created_at DESC` listing and
/// guarantees each update observes a strictly later `updated_at`.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next timestamp in Unix epoch milliseconds.
    pub fn now_millis(&self) -> i64 {
        let wall = wall_clock_millis();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| {
                Some(wall.max(prev + 1))
            })
            // The closure always returns `Some`.
            .unwrap_or_else(|prev| prev);
        wall.max(previous + 1)
    }
}

fn wall_clock_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_strictly_increase() {
        let clock = MonotonicClock::new();
        let mut prev = clock.now_millis();
        for _ in 0..1_000 {
            let next = clock.now_millis();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn readings_track_wall_clock() {
        let clock = MonotonicClock::new();
        let before = wall_clock_millis();
        assert!(clock.now_millis() >= before);
    }

    #[test]
    fn concurrent_readings_are_unique() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let clock = Arc::new(MonotonicClock::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let clock = Arc::clone(&clock);
                std::thread::spawn(move || (0..250).map(|_| clock.now_millis()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for ts in handle.join().unwrap() {
                assert!(seen.insert(ts), "duplicate timestamp {ts}");
            }
        }
    }
}
