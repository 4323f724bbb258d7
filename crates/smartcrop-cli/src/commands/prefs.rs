use serde::Serialize;
use smartcrop_core::db::{keys, PreferencesRepository, ScheduledNotification};
use smartcrop_core::models::{Preferences, ThemeMode};
use smartcrop_core::notify::LocalNotifier;
use smartcrop_core::services::LocalStore;

use crate::cli::{PreferenceKey, PrefsCommands, Toggle};
use crate::commands::common::{format_timestamp, notification_scheduler, AppContext};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct PrefsView<'a> {
    #[serde(flatten)]
    preferences: Preferences,
    theme: ThemeMode,
    scheduled: Vec<ScheduledItem<'a>>,
}

#[derive(Debug, Serialize)]
struct ScheduledItem<'a> {
    id: &'a str,
    title: &'a str,
    body: &'a str,
    schedule: String,
    created_at: i64,
}

pub async fn run_prefs(context: &AppContext, command: PrefsCommands) -> Result<(), CliError> {
    let store = context.open_store().await?;

    match command {
        PrefsCommands::Show { json } => {
            let preferences = store.load().await.unwrap_or_else(|error| {
                tracing::warn!("Failed to load preferences; using defaults: {error}");
                Preferences::default()
            });
            let scheduled = LocalNotifier::new(store.clone()).scheduled().await?;

            if json {
                let view = PrefsView {
                    preferences,
                    theme: preferences.theme(),
                    scheduled: scheduled.iter().map(to_scheduled_item).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                for line in format_preference_lines(&preferences) {
                    println!("{line}");
                }
                for notification in &scheduled {
                    println!(
                        "Scheduled: {} ({})",
                        notification.title,
                        format_schedule(notification)
                    );
                }
            }
        }
        PrefsCommands::Set { key, value } => {
            let enabled = apply_preference(&store, key, value).await?;
            println!("{}", format_toggle_result(key, value, enabled));
        }
    }
    Ok(())
}

/// Apply a toggle and return whether the preference ended up enabled.
async fn apply_preference(
    store: &LocalStore,
    key: PreferenceKey,
    value: Toggle,
) -> Result<bool, CliError> {
    let scheduler = notification_scheduler(store);
    match (key, value) {
        (PreferenceKey::DarkMode, _) => {
            store.set_flag(keys::DARK_MODE, value.is_on()).await?;
            Ok(value.is_on())
        }
        (PreferenceKey::Tips, Toggle::On) => Ok(scheduler.enable_tips().await?),
        (PreferenceKey::Tips, Toggle::Off) => {
            scheduler.disable_tips().await?;
            Ok(false)
        }
        (PreferenceKey::WeatherAlerts, _) => {
            Ok(scheduler.set_weather_alerts(value.is_on()).await?)
        }
    }
}

pub fn format_toggle_result(key: PreferenceKey, requested: Toggle, enabled: bool) -> String {
    let label = preference_label(key);
    if requested.is_on() && !enabled {
        format!("{label} could not be enabled: notification permission was denied.")
    } else if enabled {
        format!("{label} enabled.")
    } else {
        format!("{label} disabled.")
    }
}

const fn preference_label(key: PreferenceKey) -> &'static str {
    match key {
        PreferenceKey::DarkMode => "Dark mode",
        PreferenceKey::Tips => "Weekly farm tips",
        PreferenceKey::WeatherAlerts => "Weather alerts",
    }
}

pub fn format_preference_lines(preferences: &Preferences) -> Vec<String> {
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    vec![
        format!("Dark mode:      {}", on_off(preferences.dark_mode)),
        format!("Farm tips:      {}", on_off(preferences.tips_enabled)),
        format!(
            "Weather alerts: {}",
            on_off(preferences.weather_alerts_enabled)
        ),
    ]
}

fn to_scheduled_item(notification: &ScheduledNotification) -> ScheduledItem<'_> {
    ScheduledItem {
        id: &notification.id,
        title: &notification.title,
        body: &notification.body,
        schedule: format_schedule(notification),
        created_at: notification.created_at,
    }
}

/// Weekday numbering starts at 1 = Sunday.
pub fn format_schedule(notification: &ScheduledNotification) -> String {
    const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    match notification.weekly {
        Some((weekday, hour, minute)) => {
            let day = weekday
                .checked_sub(1)
                .and_then(|index| usize::try_from(index).ok())
                .and_then(|index| WEEKDAYS.get(index))
                .copied()
                .unwrap_or("?");
            format!("weekly {day} {hour:02}:{minute:02}")
        }
        None => format!("once, {}", format_timestamp(notification.created_at)),
    }
}
