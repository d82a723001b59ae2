use crate::reminder::TimeOfDay;

/// The five daily prayers in canonical order. Iteration order matters for
/// deterministic seeding and display; the prayers are otherwise independent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub const ALL: [PrayerName; 5] = [
        PrayerName::Fajr,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "fajr",
            PrayerName::Dhuhr => "dhuhr",
            PrayerName::Asr => "asr",
            PrayerName::Maghrib => "maghrib",
            PrayerName::Isha => "isha",
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct PrayerDefinition {
    pub name: PrayerName,
    pub time: TimeOfDay,
}

/// One day's prayer times, externally supplied and immutable for the day.
#[derive(Debug, Clone)]
pub struct PrayerSchedule {
    entries: [PrayerDefinition; 5],
}

impl PrayerSchedule {
    /// Pairs the given times with the canonical prayer order.
    pub fn new(times: [TimeOfDay; 5]) -> Self {
        let [fajr, dhuhr, asr, maghrib, isha] = times;
        Self {
            entries: [
                PrayerDefinition { name: PrayerName::Fajr, time: fajr },
                PrayerDefinition { name: PrayerName::Dhuhr, time: dhuhr },
                PrayerDefinition { name: PrayerName::Asr, time: asr },
                PrayerDefinition { name: PrayerName::Maghrib, time: maghrib },
                PrayerDefinition { name: PrayerName::Isha, time: isha },
            ],
        }
    }

    pub fn time_of(&self, name: PrayerName) -> TimeOfDay {
        self.entries
            .iter()
            .find(|def| def.name == name)
            .expect("All five prayers are present.")
            .time
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrayerDefinition> {
        self.entries.iter()
    }
}

/// Static daily table. A production deployment would resolve this from a
/// prayer-time provider for the configured location instead.
pub fn static_schedule() -> PrayerSchedule {
    let time = |h, m| TimeOfDay::from_hm(h, m).expect("Table entries are valid.");
    PrayerSchedule::new([
        time(4, 45),
        time(12, 15),
        time(15, 30),
        time(18, 45),
        time(20, 0),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_pairs_times_with_canonical_order() {
        let schedule = static_schedule();
        assert_eq!(schedule.time_of(PrayerName::Fajr), TimeOfDay::from_hm(4, 45).unwrap());
        assert_eq!(schedule.time_of(PrayerName::Maghrib), TimeOfDay::from_hm(18, 45).unwrap());
        assert_eq!(schedule.time_of(PrayerName::Isha), TimeOfDay::from_hm(20, 0).unwrap());
    }

    #[test]
    fn iteration_follows_canonical_order() {
        let schedule = static_schedule();
        let names: Vec<_> = schedule.iter().map(|def| def.name).collect();
        assert_eq!(names, PrayerName::ALL);
    }
}
