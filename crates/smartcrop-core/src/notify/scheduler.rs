//! Preference-gated scheduling of tips and weather alerts

use super::{Cooldown, Notifier, NotifyResult, WeeklyTrigger};
use crate::db::{keys, PreferencesRepository};
use crate::models::WeatherSnapshot;

pub const TIP_TITLE: &str = "SmartCrop tip";
pub const TIP_BODY: &str = "Weekly farm tip: check soil moisture before planting.";
pub const WEATHER_ALERT_TITLE: &str = "Weather alert";

const TIP_TRIGGER: WeeklyTrigger = WeeklyTrigger {
    weekday: 1,
    hour: 8,
    minute: 0,
};

const HEAVY_RAIN_MM: f64 = 15.0;
const HIGH_HEAT_CELSIUS: f64 = 32.0;

/// Conditions worth alerting about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherAlert {
    HeavyRain,
    HighHeat,
}

impl WeatherAlert {
    /// Rain takes precedence over heat.
    pub fn for_conditions(rain_mm: f64, temperature: f64) -> Option<Self> {
        if rain_mm >= HEAVY_RAIN_MM {
            Some(Self::HeavyRain)
        } else if temperature >= HIGH_HEAT_CELSIUS {
            Some(Self::HighHeat)
        } else {
            None
        }
    }

    pub const fn body(self) -> &'static str {
        match self {
            Self::HeavyRain => "Heavy rain expected. Consider drainage.",
            Self::HighHeat => "High heat expected. Watch soil moisture.",
        }
    }
}

/// Schedules notifications according to the stored preference flags.
pub struct NotificationScheduler<N, P> {
    notifier: N,
    preferences: P,
    cooldown: Cooldown,
}

impl<N: Notifier, P: PreferencesRepository> NotificationScheduler<N, P> {
    pub fn new(notifier: N, preferences: P) -> Self {
        Self {
            notifier,
            preferences,
            cooldown: Cooldown::default(),
        }
    }

    /// Turn weekly tips on. Returns the persisted enabled state, which is
    /// `false` when permission was refused.
    pub async fn enable_tips(&self) -> NotifyResult<bool> {
        let enabled = self.schedule_tips().await?;
        self.preferences
            .set_flag(keys::TIPS_ENABLED, enabled)
            .await?;
        Ok(enabled)
    }

    async fn schedule_tips(&self) -> NotifyResult<bool> {
        if !self.notifier.ensure_permission().await? {
            return Ok(false);
        }
        if self
            .preferences
            .get(keys::TIPS_NOTIFICATION_ID)
            .await?
            .is_some()
        {
            return Ok(true);
        }

        let id = self
            .notifier
            .schedule_weekly(TIP_TITLE, TIP_BODY, TIP_TRIGGER)
            .await?;
        self.preferences.set(keys::TIPS_NOTIFICATION_ID, &id).await?;
        tracing::info!("Weekly farm tips scheduled");
        Ok(true)
    }

    /// Turn weekly tips off, cancelling the scheduled notification.
    pub async fn disable_tips(&self) -> NotifyResult<()> {
        if let Some(id) = self.preferences.get(keys::TIPS_NOTIFICATION_ID).await? {
            self.notifier.cancel(&id).await?;
            self.preferences.remove(keys::TIPS_NOTIFICATION_ID).await?;
        }
        self.preferences.set_flag(keys::TIPS_ENABLED, false).await?;
        Ok(())
    }

    /// Returns the persisted enabled state.
    pub async fn set_weather_alerts(&self, enabled: bool) -> NotifyResult<bool> {
        let enabled = enabled && self.notifier.ensure_permission().await?;
        self.preferences
            .set_flag(keys::WEATHER_ALERTS_ENABLED, enabled)
            .await?;
        Ok(enabled)
    }

    /// Deliver a weather alert for `weather` when alerts are enabled, the
    /// conditions warrant one, and the cooldown has elapsed.
    pub async fn maybe_send_weather_alert(
        &self,
        weather: &WeatherSnapshot,
        now: i64,
    ) -> NotifyResult<Option<WeatherAlert>> {
        if !self.preferences.flag(keys::WEATHER_ALERTS_ENABLED).await? {
            return Ok(None);
        }
        let Some(alert) = WeatherAlert::for_conditions(weather.rain_mm, weather.temperature)
        else {
            return Ok(None);
        };

        let last_fired = self
            .preferences
            .get(keys::WEATHER_ALERTS_LAST)
            .await?
            .and_then(|value| value.trim().parse::<i64>().ok());
        if !self.cooldown.ready(last_fired, now) {
            tracing::debug!("Weather alert suppressed by cooldown");
            return Ok(None);
        }

        self.notifier
            .notify_now(WEATHER_ALERT_TITLE, alert.body())
            .await?;
        self.preferences
            .set(keys::WEATHER_ALERTS_LAST, &now.to_string())
            .await?;
        Ok(Some(alert))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::services::LocalStore;
    use crate::test_support::FakeNotifier;

    const HOUR_MS: i64 = 60 * 60 * 1000;

    fn weather(rain_mm: f64, temperature: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature,
            rain_mm,
            location: "Luwero".to_string(),
            condition: String::new(),
            description: String::new(),
            updated_at: 0,
        }
    }

    async fn scheduler(granted: bool) -> NotificationScheduler<FakeNotifier, LocalStore> {
        let store = LocalStore::open_in_memory().await.unwrap();
        NotificationScheduler::new(FakeNotifier::new(granted), store)
    }

    #[test]
    fn alert_classification() {
        assert_eq!(
            WeatherAlert::for_conditions(15.0, 40.0),
            Some(WeatherAlert::HeavyRain)
        );
        assert_eq!(
            WeatherAlert::for_conditions(14.9, 32.0),
            Some(WeatherAlert::HighHeat)
        );
        assert_eq!(WeatherAlert::for_conditions(3.0, 28.0), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn enabling_tips_schedules_once() {
        let scheduler = scheduler(true).await;

        assert!(scheduler.enable_tips().await.unwrap());
        assert!(scheduler.enable_tips().await.unwrap());

        assert_eq!(scheduler.notifier.weekly().len(), 1);
        assert_eq!(
            scheduler.notifier.weekly()[0],
            (TIP_TITLE.to_string(), TIP_BODY.to_string(), TIP_TRIGGER)
        );
        assert!(scheduler.preferences.load().await.unwrap().tips_enabled);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn enabling_tips_without_permission_persists_false() {
        let scheduler = scheduler(false).await;

        assert!(!scheduler.enable_tips().await.unwrap());
        assert!(scheduler.notifier.weekly().is_empty());
        assert!(!scheduler.preferences.load().await.unwrap().tips_enabled);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn disabling_tips_cancels_and_forgets_id() {
        let scheduler = scheduler(true).await;
        scheduler.enable_tips().await.unwrap();
        let id = scheduler
            .preferences
            .get(keys::TIPS_NOTIFICATION_ID)
            .await
            .unwrap()
            .unwrap();

        scheduler.disable_tips().await.unwrap();

        assert_eq!(scheduler.notifier.cancelled(), vec![id]);
        assert_eq!(
            scheduler
                .preferences
                .get(keys::TIPS_NOTIFICATION_ID)
                .await
                .unwrap(),
            None
        );
        assert!(!scheduler.preferences.load().await.unwrap().tips_enabled);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn weather_alerts_require_permission() {
        assert!(!scheduler(false).await.set_weather_alerts(true).await.unwrap());
        let granted = scheduler(true).await;
        assert!(granted.set_weather_alerts(true).await.unwrap());
        assert!(!granted.set_weather_alerts(false).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn alert_needs_enabled_flag() {
        let scheduler = scheduler(true).await;
        let sent = scheduler
            .maybe_send_weather_alert(&weather(20.0, 25.0), 0)
            .await
            .unwrap();
        assert_eq!(sent, None);
        assert!(scheduler.notifier.immediate().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn alerts_fire_at_most_once_per_window() {
        let scheduler = scheduler(true).await;
        scheduler.set_weather_alerts(true).await.unwrap();
        let start = 1_700_000_000_000;

        let first = scheduler
            .maybe_send_weather_alert(&weather(20.0, 25.0), start)
            .await
            .unwrap();
        let within = scheduler
            .maybe_send_weather_alert(&weather(0.0, 35.0), start + 5 * HOUR_MS)
            .await
            .unwrap();
        let after = scheduler
            .maybe_send_weather_alert(&weather(0.0, 35.0), start + 6 * HOUR_MS + 1)
            .await
            .unwrap();

        assert_eq!(first, Some(WeatherAlert::HeavyRain));
        assert_eq!(within, None);
        assert_eq!(after, Some(WeatherAlert::HighHeat));
        assert_eq!(
            scheduler.notifier.immediate(),
            vec![
                (
                    WEATHER_ALERT_TITLE.to_string(),
                    "Heavy rain expected. Consider drainage.".to_string()
                ),
                (
                    WEATHER_ALERT_TITLE.to_string(),
                    "High heat expected. Watch soil moisture.".to_string()
                ),
            ]
        );
        assert_eq!(
            scheduler
                .preferences
                .get(keys::WEATHER_ALERTS_LAST)
                .await
                .unwrap(),
            Some((start + 6 * HOUR_MS + 1).to_string())
        );
    }
}
