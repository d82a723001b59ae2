use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::appsettings::{Language, TimeFormat};
use crate::format;
use crate::registry::DueEvent;
use crate::reminder::{ReminderKind, TimeOfDay};

/// Downstream sink for due reminders. Implementations must tolerate the
/// occurrence already being committed: a failed delivery is a missed
/// notification, never a retried one.
#[async_trait]
pub trait ReminderDeliveryChannel: Send + Sync {
    async fn send_reminder_notification(&self, event: &DueEvent);
}

/// Bridges the due-event stream onto an mpsc channel for whatever
/// presentation layer is listening.
pub struct MpscDeliveryChannel {
    sender: mpsc::Sender<DueEvent>,
}

impl MpscDeliveryChannel {
    pub fn new(sender: mpsc::Sender<DueEvent>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ReminderDeliveryChannel for MpscDeliveryChannel {
    async fn send_reminder_notification(&self, event: &DueEvent) {
        if self.sender.send(event.clone()).await.is_err() {
            log::warn!(
                "Due event receiver dropped, notification lost. [reminder_id = {}]",
                event.reminder_id
            );
        }
    }
}

/// Logs each due reminder with its occurrence rendered in the user's
/// configured time format and language.
pub struct LogDeliveryChannel {
    time_format: TimeFormat,
    language: Language,
}

impl LogDeliveryChannel {
    pub fn new(time_format: TimeFormat, language: Language) -> Self {
        Self {
            time_format,
            language,
        }
    }
}

#[async_trait]
impl ReminderDeliveryChannel for LogDeliveryChannel {
    async fn send_reminder_notification(&self, event: &DueEvent) {
        let time = format::format_time(
            TimeOfDay::new(event.occurrence.time()),
            self.time_format,
            self.language,
        );
        let name = match &event.kind {
            ReminderKind::PrayerLinked { prayer, .. } => {
                format::prayer_display_name(*prayer, self.language)
            }
            _ => event.display_name.as_str(),
        };
        log::info!(
            "Reminder due. [name = {}, time = {}, reminder_id = {}]",
            name,
            time,
            event.reminder_id
        );
    }
}

/// Swallows everything; used when the user turned notifications off.
/// Occurrences are still committed upstream so nothing piles up.
pub struct NullDeliveryChannel;

#[async_trait]
impl ReminderDeliveryChannel for NullDeliveryChannel {
    async fn send_reminder_notification(&self, _event: &DueEvent) {}
}
