//! Notification backend for terminal front ends.
//!
//! Scheduled notifications are recorded in the local store; immediate ones are
//! written to the log.

use super::{Notifier, NotifyResult, WeeklyTrigger};
use crate::db::ScheduledNotification;
use crate::services::LocalStore;
use crate::util::unix_millis_now;

#[derive(Clone)]
pub struct LocalNotifier {
    store: LocalStore,
}

impl LocalNotifier {
    pub const fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn scheduled(&self) -> NotifyResult<Vec<ScheduledNotification>> {
        Ok(self.store.list_notifications().await?)
    }
}

impl Notifier for LocalNotifier {
    async fn ensure_permission(&self) -> NotifyResult<bool> {
        Ok(true)
    }

    async fn notify_now(&self, title: &str, body: &str) -> NotifyResult<()> {
        tracing::info!(title, "{body}");
        Ok(())
    }

    async fn schedule_weekly(
        &self,
        title: &str,
        body: &str,
        trigger: WeeklyTrigger,
    ) -> NotifyResult<String> {
        let notification = ScheduledNotification {
            id: uuid::Uuid::now_v7().to_string(),
            title: title.to_string(),
            body: body.to_string(),
            weekly: Some((trigger.weekday, trigger.hour, trigger.minute)),
            created_at: unix_millis_now(),
        };
        self.store.record_notification(&notification).await?;
        tracing::debug!(id = %notification.id, "Scheduled weekly notification");
        Ok(notification.id)
    }

    async fn cancel(&self, id: &str) -> NotifyResult<()> {
        if !self.store.remove_notification(id).await? {
            tracing::debug!(id, "Cancelled notification was not scheduled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn schedule_and_cancel_weekly() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let notifier = LocalNotifier::new(store);
        let trigger = WeeklyTrigger {
            weekday: 1,
            hour: 8,
            minute: 0,
        };

        let id = notifier
            .schedule_weekly("SmartCrop tip", "Check soil", trigger)
            .await
            .unwrap();
        let scheduled = notifier.scheduled().await.unwrap();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].id, id);
        assert_eq!(scheduled[0].weekly, Some((1, 8, 0)));

        notifier.cancel(&id).await.unwrap();
        assert!(notifier.scheduled().await.unwrap().is_empty());
        notifier.cancel(&id).await.unwrap();
    }
}
