use std::sync::Mutex;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::occurrence;
use crate::prayer::{PrayerName, PrayerSchedule};
use crate::reminder::{Reminder, ReminderId, ReminderKind};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid reminder definition: {0}")]
    InvalidDefinition(String),
    #[error("no reminder with id {0}")]
    UnknownReminder(ReminderId),
}

/// A reminder that came due, with its occurrence already committed.
#[derive(Debug, Clone)]
pub struct DueEvent {
    pub reminder_id: ReminderId,
    pub kind: ReminderKind,
    pub occurrence: NaiveDateTime,
    pub display_name: String,
}

/// Exclusive owner of all reminder instances. Every read and write goes
/// through one mutex, held only for the duration of the call, never across
/// an await point or a whole scheduler tick.
pub struct ReminderRegistry {
    inner: Mutex<Inner>,
}

struct Inner {
    schedule: PrayerSchedule,
    reminders: Vec<Reminder>,
    next_id: ReminderId,
}

impl ReminderRegistry {
    pub fn new(schedule: PrayerSchedule) -> Self {
        Self {
            inner: Mutex::new(Inner {
                schedule,
                reminders: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Seeds two reminders per prayer: one at the prayer time itself and one
    /// `offset_minutes` after it. Both share the prayer's definition but are
    /// toggled independently. Fajr and isha start enabled, matching the
    /// shipped defaults; the rest start disabled.
    pub fn seed_prayer_reminders(&self, offset_minutes: u32, now: NaiveDateTime) {
        let mut inner = self.lock();
        for name in PrayerName::ALL {
            let enabled = matches!(name, PrayerName::Fajr | PrayerName::Isha);
            inner.insert(
                name.key().to_string(),
                ReminderKind::PrayerLinked {
                    prayer: name,
                    offset_minutes: 0,
                },
                enabled,
                now,
            );
            inner.insert(
                format!("after {}", name.key()),
                ReminderKind::PrayerLinked {
                    prayer: name,
                    offset_minutes,
                },
                enabled,
                now,
            );
        }
    }

    pub fn add_medication(
        &self,
        name: impl Into<String>,
        kind: ReminderKind,
        now: NaiveDateTime,
    ) -> Result<ReminderId, RegistryError> {
        validate_kind(&kind)?;
        let mut inner = self.lock();
        Ok(inner.insert(name.into(), kind, true, now))
    }

    pub fn remove_medication(&self, id: ReminderId) -> Result<(), RegistryError> {
        let mut inner = self.lock();
        let index = inner.index_of(id)?;
        inner.reminders.remove(index);
        Ok(())
    }

    /// Replaces the reminder's schedule. The fired baseline is reset against
    /// the new kind so the change takes effect immediately, without waiting
    /// out the old schedule or replaying a stale past occurrence.
    pub fn edit_medication(
        &self,
        id: ReminderId,
        new_kind: ReminderKind,
        now: NaiveDateTime,
    ) -> Result<(), RegistryError> {
        validate_kind(&new_kind)?;
        let mut inner = self.lock();
        let index = inner.index_of(id)?;
        let baseline = occurrence::most_recent_occurrence(&new_kind, &inner.schedule, now);
        let reminder = &mut inner.reminders[index];
        reminder.kind = new_kind;
        reminder.last_fired = baseline;
        Ok(())
    }

    /// Flips the enabled flag and returns the new state. Disabling keeps
    /// `last_fired` untouched; re-enabling advances the baseline past any
    /// occurrence that elapsed while disabled, so nothing is replayed.
    pub fn toggle(&self, id: ReminderId, now: NaiveDateTime) -> Result<bool, RegistryError> {
        let mut inner = self.lock();
        let index = inner.index_of(id)?;
        let enabled = !inner.reminders[index].enabled;
        if enabled {
            let baseline =
                occurrence::most_recent_occurrence(&inner.reminders[index].kind, &inner.schedule, now);
            let reminder = &mut inner.reminders[index];
            reminder.last_fired = reminder.last_fired.max(baseline);
        }
        inner.reminders[index].enabled = enabled;
        Ok(enabled)
    }

    /// Enabled reminders ordered by next occurrence, ties broken by id.
    pub fn list_upcoming(&self, now: NaiveDateTime) -> Vec<(ReminderId, NaiveDateTime)> {
        let inner = self.lock();
        let mut upcoming: Vec<_> = inner
            .reminders
            .iter()
            .filter(|r| r.enabled)
            .map(|r| (r.id, occurrence::next_occurrence(&r.kind, &inner.schedule, now)))
            .collect();
        upcoming.sort_by_key(|&(id, next)| (next, id));
        upcoming
    }

    /// The scheduler loop's due path. For every due reminder the occurrence
    /// is recorded into `last_fired` before the event leaves this method, so
    /// a crash downstream loses a notification rather than duplicating it.
    pub fn claim_due(&self, now: NaiveDateTime) -> Vec<DueEvent> {
        let mut inner = self.lock();
        let mut events = Vec::new();
        let schedule = inner.schedule.clone();
        for reminder in &mut inner.reminders {
            if !occurrence::is_due(reminder, &schedule, now) {
                continue;
            }
            let instant = occurrence::most_recent_occurrence(&reminder.kind, &schedule, now)
                .expect("A due reminder has a most recent occurrence.");
            reminder.last_fired = Some(instant);
            events.push(DueEvent {
                reminder_id: reminder.id,
                kind: reminder.kind.clone(),
                occurrence: instant,
                display_name: reminder.name.clone(),
            });
        }
        events
    }

    pub fn get(&self, id: ReminderId) -> Option<Reminder> {
        self.lock().reminders.iter().find(|r| r.id == id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("Registry lock is never poisoned.")
    }
}

impl Inner {
    fn insert(
        &mut self,
        name: String,
        kind: ReminderKind,
        enabled: bool,
        now: NaiveDateTime,
    ) -> ReminderId {
        let id = self.next_id;
        self.next_id += 1;
        // Fresh definitions wait for their next future occurrence; a time
        // that already passed today must not fire right after creation.
        let baseline = occurrence::most_recent_occurrence(&kind, &self.schedule, now);
        self.reminders.push(Reminder {
            id,
            name,
            kind,
            enabled,
            last_fired: baseline,
        });
        id
    }

    fn index_of(&self, id: ReminderId) -> Result<usize, RegistryError> {
        self.reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or(RegistryError::UnknownReminder(id))
    }
}

fn validate_kind(kind: &ReminderKind) -> Result<(), RegistryError> {
    match kind {
        ReminderKind::FixedDaily { times } => {
            if times.is_empty() {
                return Err(RegistryError::InvalidDefinition(
                    "fixed daily reminder needs at least one time".to_string(),
                ));
            }
            if times.len() > 4 {
                return Err(RegistryError::InvalidDefinition(format!(
                    "fixed daily reminder allows at most 4 times, got {}",
                    times.len()
                )));
            }
            if times.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(RegistryError::InvalidDefinition(
                    "fixed daily times must be strictly increasing".to_string(),
                ));
            }
            Ok(())
        }
        ReminderKind::Interval { every_hours, .. } => {
            if *every_hours == 0 {
                return Err(RegistryError::InvalidDefinition(
                    "interval must be a positive number of hours".to_string(),
                ));
            }
            Ok(())
        }
        ReminderKind::PrayerLinked { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer::static_schedule;
    use crate::reminder::TimeOfDay;
    use chrono::{NaiveDate, TimeDelta};

    fn at(day: u32, time: (u32, u32, u32)) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(time.0, time.1, time.2)
            .unwrap()
    }

    fn fixed(times: &[(u32, u32)]) -> ReminderKind {
        ReminderKind::FixedDaily {
            times: times
                .iter()
                .map(|&(h, m)| TimeOfDay::from_hm(h, m).unwrap())
                .collect(),
        }
    }

    fn registry() -> ReminderRegistry {
        ReminderRegistry::new(static_schedule())
    }

    #[test]
    fn rejects_invalid_definitions() {
        let registry = registry();
        let now = at(1, (8, 0, 0));

        let empty = registry.add_medication("med", fixed(&[]), now);
        assert!(matches!(empty, Err(RegistryError::InvalidDefinition(_))));

        let too_many = registry.add_medication(
            "med",
            fixed(&[(1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]),
            now,
        );
        assert!(matches!(too_many, Err(RegistryError::InvalidDefinition(_))));

        let unordered = registry.add_medication("med", fixed(&[(9, 0), (9, 0)]), now);
        assert!(matches!(unordered, Err(RegistryError::InvalidDefinition(_))));

        let zero_interval = registry.add_medication(
            "med",
            ReminderKind::Interval { every_hours: 0, anchor: now },
            now,
        );
        assert!(matches!(zero_interval, Err(RegistryError::InvalidDefinition(_))));

        // Nothing was added along the way.
        assert!(registry.list_upcoming(now).is_empty());
    }

    #[test]
    fn unknown_id_is_reported() {
        let registry = registry();
        let now = at(1, (8, 0, 0));
        assert!(matches!(
            registry.toggle(42, now),
            Err(RegistryError::UnknownReminder(42))
        ));
        assert!(matches!(
            registry.remove_medication(42),
            Err(RegistryError::UnknownReminder(42))
        ));
    }

    #[test]
    fn fresh_medication_does_not_fire_for_a_passed_time() {
        let registry = registry();
        // 09:00 already passed when the medication is added at 15:00.
        registry
            .add_medication("amlodipine", fixed(&[(9, 0)]), at(1, (15, 0, 0)))
            .unwrap();
        assert!(registry.claim_due(at(1, (15, 0, 1))).is_empty());

        // It fires the next day at 09:00.
        let events = registry.claim_due(at(2, (9, 0, 0)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].occurrence, at(2, (9, 0, 0)));
    }

    #[test]
    fn claim_commits_and_is_idempotent_within_the_occurrence() {
        let registry = registry();
        let id = registry
            .add_medication("med", fixed(&[(9, 0), (21, 0)]), at(1, (8, 0, 0)))
            .unwrap();

        let events = registry.claim_due(at(1, (9, 0, 0)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reminder_id, id);
        assert_eq!(events[0].occurrence, at(1, (9, 0, 0)));

        // Same occurrence window: committed, so nothing more is due.
        assert!(registry.claim_due(at(1, (9, 0, 0))).is_empty());
        assert!(registry.claim_due(at(1, (9, 30, 0))).is_empty());

        // The next listed time fires independently.
        let events = registry.claim_due(at(1, (21, 0, 15)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].occurrence, at(1, (21, 0, 0)));
    }

    #[test]
    fn gap_in_ticks_coalesces_missed_occurrences() {
        let registry = registry();
        let anchor = at(1, (6, 0, 0));
        registry
            .add_medication(
                "hourly",
                ReminderKind::Interval { every_hours: 1, anchor },
                anchor,
            )
            .unwrap();

        let events = registry.claim_due(at(1, (7, 0, 0)));
        assert_eq!(events.len(), 1);

        // No ticks for three hours: exactly one event, for the latest slot.
        let events = registry.claim_due(at(1, (10, 0, 2)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].occurrence, at(1, (10, 0, 0)));
        assert!(registry.claim_due(at(1, (10, 0, 3))).is_empty());
    }

    #[test]
    fn reenabling_does_not_replay_a_passed_time() {
        let registry = registry();
        let id = registry
            .add_medication("med", fixed(&[(9, 0), (21, 0)]), at(1, (8, 0, 0)))
            .unwrap();

        assert_eq!(registry.claim_due(at(1, (9, 0, 0))).len(), 1);

        // Disabled at 10:00, re-enabled at 12:00: the 09:00 slot stays
        // consumed and nothing fires until 21:00.
        assert!(!registry.toggle(id, at(1, (10, 0, 0))).unwrap());
        assert!(registry.toggle(id, at(1, (12, 0, 0))).unwrap());
        assert!(registry.claim_due(at(1, (12, 0, 1))).is_empty());
        assert_eq!(registry.claim_due(at(1, (21, 0, 0))).len(), 1);
    }

    #[test]
    fn occurrence_passing_while_disabled_is_not_replayed() {
        let registry = registry();
        let id = registry
            .add_medication("med", fixed(&[(9, 0), (21, 0)]), at(1, (8, 0, 0)))
            .unwrap();

        assert!(!registry.toggle(id, at(1, (8, 30, 0))).unwrap());
        // 09:00 passes silently while disabled.
        assert!(registry.claim_due(at(1, (9, 0, 0))).is_empty());
        assert!(registry.toggle(id, at(1, (10, 0, 0))).unwrap());
        assert!(registry.claim_due(at(1, (10, 0, 1))).is_empty());
        assert_eq!(registry.claim_due(at(1, (21, 0, 0))).len(), 1);
    }

    #[test]
    fn removed_medication_stops_firing() {
        let registry = registry();
        let id = registry
            .add_medication("med", fixed(&[(9, 0)]), at(1, (8, 0, 0)))
            .unwrap();
        registry.remove_medication(id).unwrap();
        assert!(registry.get(id).is_none());
        assert!(registry.claim_due(at(1, (9, 0, 0))).is_empty());
    }

    #[test]
    fn disabling_keeps_last_fired() {
        let registry = registry();
        let id = registry
            .add_medication("med", fixed(&[(9, 0)]), at(1, (8, 0, 0)))
            .unwrap();
        registry.claim_due(at(1, (9, 0, 0)));
        registry.toggle(id, at(1, (10, 0, 0))).unwrap();
        assert_eq!(registry.get(id).unwrap().last_fired, Some(at(1, (9, 0, 0))));
    }

    #[test]
    fn edit_resets_the_baseline_to_the_new_schedule() {
        let registry = registry();
        let id = registry
            .add_medication("med", fixed(&[(9, 0)]), at(1, (8, 0, 0)))
            .unwrap();
        registry.claim_due(at(1, (9, 0, 0)));

        // Rescheduled at 10:00 to fire at 11:00 and 22:00.
        registry
            .edit_medication(id, fixed(&[(11, 0), (22, 0)]), at(1, (10, 0, 0)))
            .unwrap();
        assert!(registry.claim_due(at(1, (10, 0, 1))).is_empty());
        let events = registry.claim_due(at(1, (11, 0, 0)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].occurrence, at(1, (11, 0, 0)));
    }

    #[test]
    fn edit_rejecting_leaves_the_reminder_unchanged() {
        let registry = registry();
        let id = registry
            .add_medication("med", fixed(&[(9, 0)]), at(1, (8, 0, 0)))
            .unwrap();
        let before = registry.get(id).unwrap();

        let result = registry.edit_medication(id, fixed(&[]), at(1, (10, 0, 0)));
        assert!(matches!(result, Err(RegistryError::InvalidDefinition(_))));

        let after = registry.get(id).unwrap();
        assert_eq!(after.kind, before.kind);
        assert_eq!(after.last_fired, before.last_fired);
    }

    #[test]
    fn seeded_prayers_come_in_pairs_with_default_toggles() {
        let registry = registry();
        registry.seed_prayer_reminders(15, at(1, (3, 0, 0)));

        // Ten reminders seeded, four enabled (fajr and isha, each twice).
        let upcoming = registry.list_upcoming(at(1, (3, 0, 0)));
        assert_eq!(upcoming.len(), 4);

        // Fajr at 04:45, its follow-up 15 minutes later.
        let events = registry.claim_due(at(1, (4, 45, 0)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].display_name, "fajr");
        let events = registry.claim_due(at(1, (5, 0, 0)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].display_name, "after fajr");
    }

    #[test]
    fn list_upcoming_is_ordered_by_next_occurrence() {
        let registry = registry();
        let now = at(1, (8, 0, 0));
        let late = registry
            .add_medication("late", fixed(&[(21, 0)]), now)
            .unwrap();
        let early = registry
            .add_medication("early", fixed(&[(9, 0)]), now)
            .unwrap();
        let hourly = registry
            .add_medication(
                "hourly",
                ReminderKind::Interval { every_hours: 4, anchor: now },
                now,
            )
            .unwrap();

        let upcoming = registry.list_upcoming(now + TimeDelta::minutes(1));
        let ids: Vec<_> = upcoming.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![early, hourly, late]);
        assert_eq!(upcoming[0].1, at(1, (9, 0, 0)));
        assert_eq!(upcoming[1].1, at(1, (12, 0, 0)));
    }
}
