use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use sadiqi::appsettings::AppSettings;
use sadiqi::clock::{Clock, SystemClock};
use sadiqi::delivery::{LogDeliveryChannel, NullDeliveryChannel, ReminderDeliveryChannel};
use sadiqi::prayer;
use sadiqi::registry::ReminderRegistry;
use sadiqi::scheduler::SchedulerLoop;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::load()?;
    log::info!("Settings loaded. [{:?}]", settings);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(settings.country.timezone()));
    let registry = Arc::new(ReminderRegistry::new(prayer::static_schedule()));
    registry.seed_prayer_reminders(settings.reminder_interval, clock.now());

    for (id, next) in registry.list_upcoming(clock.now()) {
        log::info!("Upcoming reminder. [reminder_id = {}, next = {}]", id, next);
    }

    let delivery: Arc<dyn ReminderDeliveryChannel> = if settings.notifications_enabled {
        Arc::new(LogDeliveryChannel::new(settings.time_format, settings.language))
    } else {
        Arc::new(NullDeliveryChannel)
    };

    let cancellation_token = CancellationToken::new();
    let scheduler = SchedulerLoop::new(Arc::clone(&registry), clock, delivery);
    let handle = tokio::spawn(scheduler.run(cancellation_token.child_token()));

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down.");
    cancellation_token.cancel();
    handle.await?;

    Ok(())
}
