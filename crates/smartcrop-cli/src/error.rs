use std::io;

use smartcrop_core::account::AccountError;
use smartcrop_core::api::ApiError;
use smartcrop_core::config::ConfigError;
use smartcrop_core::notify::NotifyError;
use smartcrop_core::weather::WeatherError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] smartcrop_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("{}", .0.user_message())]
    Account(#[from] AccountError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Record ID cannot be empty")]
    EmptyRecordId,
    #[error("Invalid record ID: {0}")]
    InvalidRecordId(String),
    #[error("Quick prompt {0} does not exist (choose 1-{1})")]
    UnknownPrompt(usize, usize),
    #[error("Sign in to continue. Run `smartcrop auth login` first.")]
    SignInRequired,
    #[error("Auth is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY.")]
    AuthNotConfigured,
    #[error("Sync is not configured. Set TURSO_DATABASE_URL and TURSO_AUTH_TOKEN.")]
    SyncNotConfigured,
    #[error("Could not resolve a data directory; pass --db-path or set SMARTCROP_DB_PATH")]
    NoDataDir,
}
