//! Dashboard clock: the single source of "now" for snapshot computation.
//!
//! RULE: the aggregation engine never reads the wall clock.
//! Callers obtain `now` from a Clock and pass it in explicitly.

use crate::types::Timestamp;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time. Used by the runner when no `--now` is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock frozen at a chosen instant. Only moves when told to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixedClock {
    pub current: Timestamp,
}

impl FixedClock {
    pub fn at(current: Timestamp) -> Self {
        Self { current }
    }

    /// Move the clock forward (or back, for negative durations).
    pub fn advance(&mut self, by: Duration) -> Timestamp {
        self.current += by;
        self.current
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_only_moves_when_advanced() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut clock = FixedClock::at(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);

        let later = clock.advance(Duration::days(2));
        assert_eq!(later, Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
        assert_eq!(clock.now(), later);
    }
}
