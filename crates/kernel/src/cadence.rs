use std::time::{Duration, Instant};

/// Drift-corrected periodic deadline.
///
/// Deadlines advance by whole intervals from the previous deadline, not
/// from "now", so jitter in the surrounding sleep does not accumulate. A
/// stall longer than one interval resynchronizes instead of firing a burst
/// of catch-up ticks.
pub(crate) struct Cadence {
    interval: Duration,
    next: Instant,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now() + interval,
        }
    }

    /// Returns true when the deadline has passed, advancing it.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next < now {
            self.next = now + self.interval;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let interval = Duration::from_millis(50);
        let start = Instant::now();
        let mut cadence = Cadence {
            interval,
            next: start + interval,
        };

        assert!(!cadence.due(start));
        assert!(!cadence.due(start + Duration::from_millis(49)));
        assert!(cadence.due(start + Duration::from_millis(50)));
        assert!(!cadence.due(start + Duration::from_millis(60)));
        assert!(cadence.due(start + Duration::from_millis(100)));
    }

    #[test]
    fn resynchronizes_after_a_stall() {
        let interval = Duration::from_millis(50);
        let start = Instant::now();
        let mut cadence = Cadence {
            interval,
            next: start + interval,
        };

        // A long stall yields one tick, then the schedule restarts from now.
        let late = start + Duration::from_millis(500);
        assert!(cadence.due(late));
        assert!(!cadence.due(late + Duration::from_millis(49)));
        assert!(cadence.due(late + Duration::from_millis(50)));
    }
}
