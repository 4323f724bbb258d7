//! Farm-tip and weather-alert notifications.

mod cooldown;
mod local;
mod scheduler;

use thiserror::Error;

pub use cooldown::{Cooldown, WEATHER_ALERT_COOLDOWN};
pub use local::LocalNotifier;
pub use scheduler::{NotificationScheduler, WeatherAlert, TIP_BODY, TIP_TITLE, WEATHER_ALERT_TITLE};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Storage(#[from] crate::Error),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Recurring weekly trigger (weekday 1 = Sunday)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyTrigger {
    pub weekday: u32,
    pub hour: u32,
    pub minute: u32,
}

/// Platform notification backend
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Whether notifications may be shown, requesting permission if needed.
    async fn ensure_permission(&self) -> NotifyResult<bool>;

    /// Deliver a notification immediately.
    async fn notify_now(&self, title: &str, body: &str) -> NotifyResult<()>;

    /// Schedule a repeating notification; returns its id.
    async fn schedule_weekly(
        &self,
        title: &str,
        body: &str,
        trigger: WeeklyTrigger,
    ) -> NotifyResult<String>;

    async fn cancel(&self, id: &str) -> NotifyResult<()>;
}
