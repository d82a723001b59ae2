use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::prayer::PrayerName;

pub type ReminderId = u64;

/// Wall-clock time of day, minute granularity. Seconds and nanoseconds are
/// normalized away so two occurrences within the same minute compare equal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(inner: NaiveTime) -> Self {
        let normalized = inner
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .expect("Will never fail.");
        Self(normalized)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }
}

/// Closed set of schedule shapes a reminder can have. The occurrence
/// calculator matches on this exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderKind {
    /// Fires once per listed time per calendar day. Times are strictly
    /// increasing and there are between one and four of them.
    FixedDaily { times: Vec<TimeOfDay> },
    /// Fires every `every_hours` hours on the grid spanned from `anchor`.
    /// The anchor itself counts as already delivered; the grid never resets
    /// at midnight.
    Interval {
        every_hours: u32,
        anchor: NaiveDateTime,
    },
    /// Fires `offset_minutes` after the named prayer's time of day.
    /// An offset of zero fires at the prayer time itself.
    PrayerLinked {
        prayer: PrayerName,
        offset_minutes: u32,
    },
}

#[derive(Debug, Clone)]
pub struct Reminder {
    pub id: ReminderId,
    pub name: String,
    pub kind: ReminderKind,
    pub enabled: bool,
    /// Identifying instant of the most recent occurrence already delivered.
    /// Never cleared by disabling; advanced by the registry only.
    pub last_fired: Option<NaiveDateTime>,
}
