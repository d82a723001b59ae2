//! Pure occurrence arithmetic for every reminder kind. No clocks, no locks;
//! the registry and scheduler loop feed `now` in explicitly.

use chrono::{NaiveDateTime, TimeDelta};

use crate::prayer::PrayerSchedule;
use crate::reminder::{Reminder, ReminderKind, TimeOfDay};

/// The next occurrence strictly after `now`.
pub fn next_occurrence(
    kind: &ReminderKind,
    schedule: &PrayerSchedule,
    now: NaiveDateTime,
) -> NaiveDateTime {
    match kind {
        ReminderKind::FixedDaily { times } => next_fixed(times, now),
        ReminderKind::Interval { every_hours, anchor } => {
            next_on_grid(*every_hours, *anchor, now)
        }
        ReminderKind::PrayerLinked { prayer, offset_minutes } => {
            // Day rollover is resolved on the prayer time alone, then the
            // offset is added in absolute time. An offset crossing midnight
            // stays on the rolled prayer's calendar day.
            let prayer_time = schedule.time_of(*prayer);
            next_fixed(&[prayer_time], now) + TimeDelta::minutes(*offset_minutes as i64)
        }
    }
}

/// The latest occurrence at or before `now`, if any exists yet.
/// For an interval reminder this includes the anchor itself; `is_due`
/// separately treats the anchor as already delivered.
pub fn most_recent_occurrence(
    kind: &ReminderKind,
    schedule: &PrayerSchedule,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    match kind {
        ReminderKind::FixedDaily { times } => most_recent_fixed(times, now),
        ReminderKind::Interval { every_hours, anchor } => {
            grid_at_or_before(*every_hours, *anchor, now)
        }
        ReminderKind::PrayerLinked { prayer, offset_minutes } => {
            // Resolving in the frame shifted back by the offset keeps the
            // result at or before `now` for any offset size.
            let prayer_time = schedule.time_of(*prayer);
            let offset = TimeDelta::minutes(*offset_minutes as i64);
            most_recent_fixed(&[prayer_time], now - offset).map(|base| base + offset)
        }
    }
}

/// True iff the reminder is enabled and its most recent occurrence has not
/// been delivered yet. Any number of missed occurrences coalesce into one
/// due answer; only the most recent instant is ever reported.
pub fn is_due(reminder: &Reminder, schedule: &PrayerSchedule, now: NaiveDateTime) -> bool {
    if !reminder.enabled {
        return false;
    }
    let Some(recent) = most_recent_occurrence(&reminder.kind, schedule, now) else {
        return false;
    };
    match fired_baseline(reminder) {
        Some(baseline) => recent > baseline,
        None => true,
    }
}

/// The instant up to which occurrences count as delivered: `last_fired`,
/// or the anchor for an interval reminder that has never fired.
pub fn fired_baseline(reminder: &Reminder) -> Option<NaiveDateTime> {
    reminder.last_fired.or(match &reminder.kind {
        ReminderKind::Interval { anchor, .. } => Some(*anchor),
        _ => None,
    })
}

fn next_fixed(times: &[TimeOfDay], now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date();
    // Ties between equal listed times resolve to the earlier-declared one.
    if let Some(t) = times.iter().find(|t| t.time() > now.time()) {
        return today.and_time(t.time());
    }
    let tomorrow = today
        .succ_opt()
        .expect("Not realistic to overflow");
    let earliest = times
        .iter()
        .min_by_key(|t| t.time())
        .expect("Times are never empty.");
    tomorrow.and_time(earliest.time())
}

fn most_recent_fixed(times: &[TimeOfDay], now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now.date();
    if let Some(t) = times
        .iter()
        .filter(|t| t.time() <= now.time())
        .max_by_key(|t| t.time())
    {
        return Some(today.and_time(t.time()));
    }
    // Nothing has passed today yet; the previous occurrence was yesterday's
    // latest listed time.
    let yesterday = today.pred_opt()?;
    let latest = times.iter().max_by_key(|t| t.time())?;
    Some(yesterday.and_time(latest.time()))
}

fn next_on_grid(every_hours: u32, anchor: NaiveDateTime, now: NaiveDateTime) -> NaiveDateTime {
    let step_seconds = every_hours as i64 * 3600;
    let elapsed = (now - anchor).num_seconds();
    // Snap to the anchor grid rather than "now + every", so repeated
    // recomputation can never drift.
    let k = if elapsed < 0 { 0 } else { elapsed.div_euclid(step_seconds) };
    anchor + TimeDelta::seconds((k + 1) * step_seconds)
}

fn grid_at_or_before(
    every_hours: u32,
    anchor: NaiveDateTime,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    if now < anchor {
        return None;
    }
    let step_seconds = every_hours as i64 * 3600;
    let k = (now - anchor).num_seconds().div_euclid(step_seconds);
    Some(anchor + TimeDelta::seconds(k * step_seconds))
}
