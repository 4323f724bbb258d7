//! Runtime configuration.
//!
//! Resolves the prediction backend, weather key, auth provider and record store
//! location from environment variables. Every value is trimmed and empty
//! values are treated as absent.

use std::fmt;
use std::path::PathBuf;

use crate::util::{is_http_url, normalize_text_option};
use crate::weather::OPENWEATHER_BASE_URL;

const BACKEND_PORT: u16 = 8000;
const ANDROID_EMULATOR_HOST: &str = "10.0.2.2";

/// Host platform, used to pick the default backend address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Desktop,
}

impl Platform {
    /// Platform of the running binary.
    pub const fn current() -> Self {
        if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else {
            Self::Desktop
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must include http:// or https://")]
    InvalidUrl { name: &'static str },
    #[error("SUPABASE_URL and SUPABASE_ANON_KEY must be set together")]
    PartialSupabase,
}

/// Supabase GoTrue project settings
#[derive(Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Remote Turso replica settings
#[derive(Clone, PartialEq, Eq)]
pub struct TursoConfig {
    pub url: String,
    pub auth_token: String,
}

impl fmt::Debug for TursoConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TursoConfig")
            .field("url", &self.url)
            .field("auth_token", &"[REDACTED]")
            .finish()
    }
}

/// Application configuration resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the prediction and advisory backend
    pub api_base_url: String,
    /// OpenWeatherMap key; `None` selects sample-data fallback
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    pub password_reset_redirect: Option<String>,
    pub supabase: Option<SupabaseConfig>,
    /// Local database file; `None` lets the caller pick a default location
    pub db_path: Option<PathBuf>,
    pub turso: Option<TursoConfig>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field(
                "weather_api_key",
                &self.weather_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("weather_base_url", &self.weather_base_url)
            .field("password_reset_redirect", &self.password_reset_redirect)
            .field("supabase", &self.supabase)
            .field("db_path", &self.db_path)
            .field("turso", &self.turso)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| normalize_text_option(lookup(name));

        let api_base_url = match read("SMARTCROP_API_BASE") {
            Some(base) => normalize_http_url(&base, "SMARTCROP_API_BASE")?,
            None => {
                let dev_host = read("SMARTCROP_DEV_HOST");
                resolve_api_base(None, dev_host.as_deref(), Platform::current())
            }
        };

        let weather_base_url = read("SMARTCROP_OWM_BASE")
            .map(|url| normalize_http_url(&url, "SMARTCROP_OWM_BASE"))
            .transpose()?
            .unwrap_or_else(|| OPENWEATHER_BASE_URL.to_string());

        let password_reset_redirect = read("SMARTCROP_PASSWORD_RESET_REDIRECT")
            .map(|url| normalize_http_url(&url, "SMARTCROP_PASSWORD_RESET_REDIRECT"))
            .transpose()?;

        let supabase = match (read("SUPABASE_URL"), read("SUPABASE_ANON_KEY")) {
            (None, None) => None,
            (Some(url), Some(anon_key)) => Some(SupabaseConfig {
                url: normalize_http_url(&url, "SUPABASE_URL")?,
                anon_key,
            }),
            _ => return Err(ConfigError::PartialSupabase),
        };

        let turso = match (read("TURSO_DATABASE_URL"), read("TURSO_AUTH_TOKEN")) {
            (Some(url), Some(auth_token)) => Some(TursoConfig { url, auth_token }),
            (Some(_), None) => {
                tracing::warn!(
                    "TURSO_DATABASE_URL is set without TURSO_AUTH_TOKEN; using local database only"
                );
                None
            }
            _ => None,
        };

        Ok(Self {
            api_base_url,
            weather_api_key: read("SMARTCROP_OWM_API_KEY"),
            weather_base_url,
            password_reset_redirect,
            supabase,
            db_path: read("SMARTCROP_DB_PATH").map(PathBuf::from),
            turso,
        })
    }

    pub const fn has_weather_key(&self) -> bool {
        self.weather_api_key.is_some()
    }
}

/// Resolve the backend base URL.
///
/// An explicit override wins. Otherwise a dev host (`host[:port]`) maps to
/// `http://host:8000`, and without one the platform default is used.
pub fn resolve_api_base(
    explicit: Option<&str>,
    dev_host: Option<&str>,
    platform: Platform,
) -> String {
    if let Some(base) = explicit.map(str::trim).filter(|base| !base.is_empty()) {
        return base.trim_end_matches('/').to_string();
    }

    let dev_host = dev_host
        .map(str::trim)
        .and_then(|host| host.split(':').next())
        .filter(|host| !host.is_empty());
    if let Some(host) = dev_host {
        return format!("http://{host}:{BACKEND_PORT}");
    }

    match platform {
        Platform::Android => format!("http://{ANDROID_EMULATOR_HOST}:{BACKEND_PORT}"),
        Platform::Ios | Platform::Desktop => format!("http://localhost:{BACKEND_PORT}"),
    }
}

fn normalize_http_url(value: &str, name: &'static str) -> Result<String, ConfigError> {
    if is_http_url(value) {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidUrl { name })
    }
}
