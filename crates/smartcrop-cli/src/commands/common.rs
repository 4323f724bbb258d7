use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use smartcrop_core::account::AccountService;
use smartcrop_core::api::PredictionClient;
use smartcrop_core::auth::SupabaseAuthClient;
use smartcrop_core::config::AppConfig;
use smartcrop_core::db::SyncConfig;
use smartcrop_core::models::{AgronomicInput, HistoryRecordId, WeatherSnapshot};
use smartcrop_core::notify::{LocalNotifier, NotificationScheduler};
use smartcrop_core::pipeline::{LastInputs, RefreshPipeline};
use smartcrop_core::services::LocalStore;
use smartcrop_core::weather::OpenWeatherClient;
use smartcrop_core::{HistoryRecord, Recommendation};

use crate::auth::SessionStore;
use crate::error::CliError;

pub type Account = AccountService<SessionStore>;

pub type CliRefreshPipeline = RefreshPipeline<
    PredictionClient,
    OpenWeatherClient,
    LocalStore,
    LocalNotifier,
    LocalStore,
>;

#[derive(Debug, Serialize)]
pub struct HistoryListItem {
    pub id: String,
    pub season: String,
    pub soil_type: String,
    pub temperature: f64,
    pub rainfall: f64,
    pub recommendations: Vec<Recommendation>,
    pub created_at: i64,
    pub created_at_iso: String,
    pub relative_time: String,
}

/// Resolved configuration plus the database location for one invocation.
pub struct AppContext {
    pub config: AppConfig,
    pub db_path: PathBuf,
}

impl AppContext {
    pub fn load(cli_db_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config = AppConfig::from_env()?;
        let db_path = resolve_db_path(cli_db_path, &config)?;
        Ok(Self { config, db_path })
    }

    pub async fn open_store(&self) -> Result<LocalStore, CliError> {
        open_store(&self.db_path, &self.config).await
    }

    /// Account service with any stored session restored.
    ///
    /// A session that cannot be restored leaves the account signed out.
    pub async fn open_account(&self, store: &LocalStore) -> Result<Option<Account>, CliError> {
        let Some(supabase) = self.config.supabase.as_ref() else {
            return Ok(None);
        };
        let auth = SupabaseAuthClient::new(
            &supabase.url,
            supabase.anon_key.clone(),
            SessionStore::for_project(&supabase.url),
        )
        .map_err(smartcrop_core::account::AccountError::from)?;
        let mut account = AccountService::new(
            auth,
            store.clone(),
            self.config.password_reset_redirect.clone(),
        );
        if let Err(error) = account.start().await {
            tracing::warn!("Could not restore session: {error}");
        }
        Ok(Some(account))
    }

    pub async fn require_account(&self, store: &LocalStore) -> Result<Account, CliError> {
        self.open_account(store)
            .await?
            .ok_or(CliError::AuthNotConfigured)
    }

    pub fn predictor(&self) -> Result<PredictionClient, CliError> {
        Ok(PredictionClient::new(&self.config.api_base_url)?)
    }

    /// Forecast client, or `None` when no weather key is configured.
    pub fn forecast(&self) -> Result<Option<OpenWeatherClient>, CliError> {
        self.config
            .weather_api_key
            .as_deref()
            .map(|key| OpenWeatherClient::with_base_url(&self.config.weather_base_url, key))
            .transpose()
            .map_err(CliError::from)
    }

    pub fn refresh_pipeline(
        &self,
        store: &LocalStore,
        last_inputs: LastInputs,
    ) -> Result<CliRefreshPipeline, CliError> {
        Ok(RefreshPipeline::new(
            self.predictor()?,
            self.forecast()?,
            store.clone(),
            notification_scheduler(store),
            last_inputs,
        ))
    }
}

pub fn notification_scheduler(
    store: &LocalStore,
) -> NotificationScheduler<LocalNotifier, LocalStore> {
    NotificationScheduler::new(LocalNotifier::new(store.clone()), store.clone())
}

pub fn resolve_db_path(
    cli_db_path: Option<PathBuf>,
    config: &AppConfig,
) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| config.db_path.clone()) {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("smartcrop").join("smartcrop.db"))
        .ok_or(CliError::NoDataDir)
}

pub async fn open_store(path: &Path, config: &AppConfig) -> Result<LocalStore, CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let sync_config = config
        .turso
        .as_ref()
        .map(|turso| SyncConfig::new(turso.url.clone(), turso.auth_token.clone()));
    Ok(LocalStore::open_path(path.to_path_buf(), sync_config).await?)
}

pub fn parse_record_id(id: &str) -> Result<HistoryRecordId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyRecordId);
    }
    trimmed
        .parse()
        .map_err(|_| CliError::InvalidRecordId(trimmed.to_string()))
}

pub fn history_to_list_item(record: &HistoryRecord, now_ms: i64) -> HistoryListItem {
    HistoryListItem {
        id: record.id.to_string(),
        season: record.season.to_string(),
        soil_type: record.soil_type.to_string(),
        temperature: record.temperature,
        rainfall: record.rainfall,
        recommendations: record.recommendations.clone(),
        created_at: record.created_at,
        created_at_iso: format_timestamp(record.created_at),
        relative_time: format_relative_time(record.created_at, now_ms),
    }
}

pub fn format_history_lines(records: &[HistoryRecord], now_ms: i64) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            format!(
                "{}  {:<8}  {}  {}  {}",
                record.id,
                format_relative_time(record.created_at, now_ms),
                format_input_summary(&record.input()),
                top_crop_label(&record.recommendations),
                format_timestamp(record.created_at)
            )
        })
        .collect()
}

fn top_crop_label(recommendations: &[Recommendation]) -> String {
    recommendations.first().map_or_else(
        || "(no crops)".to_string(),
        |top| format!("{} {:.0}%", top.crop, top.confidence),
    )
}

pub fn format_recommendation_lines(recommendations: &[Recommendation]) -> Vec<String> {
    recommendations
        .iter()
        .enumerate()
        .map(|(index, recommendation)| {
            let line = format!(
                "{:>2}. {:<12} {:>3.0}%",
                index + 1,
                recommendation.crop,
                recommendation.confidence
            );
            if recommendation.explanation.trim().is_empty() {
                line
            } else {
                format!("{line}  {}", recommendation.explanation.trim())
            }
        })
        .collect()
}

pub fn format_input_summary(input: &AgronomicInput) -> String {
    format!(
        "{} season, {} soil, {:.1}°C, {:.1} mm",
        input.season, input.soil_type, input.temperature, input.rainfall
    )
}

pub fn format_weather_line(weather: &WeatherSnapshot) -> String {
    let condition = if weather.description.trim().is_empty() {
        weather.condition.clone()
    } else {
        format!("{} ({})", weather.condition, weather.description)
    };
    format!(
        "{}: {:.1}°C, {}, {:.1} mm rain expected",
        weather.location, weather.temperature, condition, weather.rain_mm
    )
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn join_question(parts: &[String]) -> String {
    parts.join(" ").trim().to_string()
}
