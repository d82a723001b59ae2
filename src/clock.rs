use std::sync::Mutex;

use chrono::{NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;

/// Source of the current wall-clock time. Read-only and side-effect-free;
/// tests substitute a manually advanced instance.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Real clock projected into the configured timezone, since prayer and
/// medication times are local wall-clock values.
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }
}

/// Deterministic clock for tests; advances only when told to.
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("Clock lock is never poisoned.");
        *now += delta;
    }

    pub fn set(&self, instant: NaiveDateTime) {
        let mut now = self.now.lock().expect("Clock lock is never poisoned.");
        *now = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("Clock lock is never poisoned.")
    }
}
