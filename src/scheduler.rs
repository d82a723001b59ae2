use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::delivery::ReminderDeliveryChannel;
use crate::registry::ReminderRegistry;

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Drives the registry's due path on a fixed tick. The loop body is
/// sequential, so ticks never overlap: a delayed tick just claims a larger
/// backlog, and every claim is committed before its event is dispatched.
pub struct SchedulerLoop {
    registry: Arc<ReminderRegistry>,
    clock: Arc<dyn Clock>,
    delivery: Arc<dyn ReminderDeliveryChannel>,
    tick: Duration,
}

impl SchedulerLoop {
    pub fn new(
        registry: Arc<ReminderRegistry>,
        clock: Arc<dyn Clock>,
        delivery: Arc<dyn ReminderDeliveryChannel>,
    ) -> Self {
        Self {
            registry,
            clock,
            delivery,
            tick: DEFAULT_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub async fn run(self, cancellation_token: CancellationToken) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_seen: Option<NaiveDateTime> = None;

        log::info!("Scheduler loop started. [tick = {:?}]", self.tick);
        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    log::info!("Scheduler loop stopped.");
                    break;
                }
                _ = interval.tick() => {
                    let now = self.clock.now();
                    if last_seen.is_some_and(|prev| now < prev) {
                        // Clock skew: hold everything and retry next tick
                        // rather than fire against an apparent-future
                        // occurrence.
                        log::warn!(
                            "Clock moved backwards, holding reminders. [prev = {:?}, now = {}]",
                            last_seen,
                            now
                        );
                        continue;
                    }
                    last_seen = Some(now);

                    for event in self.registry.claim_due(now) {
                        log::debug!(
                            "Reminder fired. [reminder_id = {}, occurrence = {}]",
                            event.reminder_id,
                            event.occurrence
                        );
                        self.delivery.send_reminder_notification(&event).await;
                    }
                }
            }
        }
    }
}
