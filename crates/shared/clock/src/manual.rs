use chrono::Duration;
use std::sync::RwLock;
use vigil_core::Timestamp;
use vigil_ports::Clock;

/// Clock frozen at a given instant
///
/// Only moves when explicitly advanced or set, so tests can walk a market
/// server across session boundaries and trading days.
pub struct ManualClock {
    current_time: RwLock<Timestamp>,
}

impl ManualClock {
    pub fn new(initial_time: Timestamp) -> Self {
        Self {
            current_time: RwLock::new(initial_time),
        }
    }

    /// Advance the time by a specified duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += duration;
    }

    /// Explicitly set the time
    ///
    /// Warning: moving backwards makes cooldown arithmetic negative.
    pub fn set(&self, time: Timestamp) {
        let mut current = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self
            .current_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_manual_clock_is_frozen() {
        let start = Utc.with_ymd_and_hms(2024, 3, 8, 14, 30, 0).unwrap();
        let clock = ManualClock::new(start);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_manual_clock_advance_and_set() {
        let start = Utc.with_ymd_and_hms(2024, 3, 8, 14, 30, 0).unwrap();
        let clock = ManualClock::new(start);

        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), start + Duration::minutes(90));

        let monday = Utc.with_ymd_and_hms(2024, 3, 11, 14, 30, 0).unwrap();
        clock.set(monday);
        assert_eq!(clock.now(), monday);
    }
}
