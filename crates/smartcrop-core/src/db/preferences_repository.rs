//! Local preference repository (string-encoded key/value entries)

use crate::error::Result;
use crate::models::Preferences;
use crate::util::parse_flag;
use libsql::Connection;

/// Keys of the local key/value entries
pub mod keys {
    pub const DARK_MODE: &str = "smartcrop_dark_mode";
    pub const TIPS_ENABLED: &str = "smartcrop_tips";
    pub const WEATHER_ALERTS_ENABLED: &str = "smartcrop_weather_alerts";
    pub const WEATHER_ALERTS_LAST: &str = "smartcrop_weather_alerts_last";
    pub const TIPS_NOTIFICATION_ID: &str = "smartcrop_tips_notif_id";
}

/// Trait for local preference storage operations (async)
#[allow(async_fn_in_trait)]
pub trait PreferencesRepository {
    /// Read a raw entry
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a raw entry
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a raw entry
    async fn remove(&self, key: &str) -> Result<()>;

    /// Load the boolean preference flags; missing entries read as `false`
    async fn load(&self) -> Result<Preferences> {
        Ok(Preferences {
            dark_mode: self.flag(keys::DARK_MODE).await?,
            tips_enabled: self.flag(keys::TIPS_ENABLED).await?,
            weather_alerts_enabled: self.flag(keys::WEATHER_ALERTS_ENABLED).await?,
        })
    }

    /// Persist all boolean preference flags
    async fn save(&self, preferences: &Preferences) -> Result<()> {
        self.set_flag(keys::DARK_MODE, preferences.dark_mode).await?;
        self.set_flag(keys::TIPS_ENABLED, preferences.tips_enabled)
            .await?;
        self.set_flag(
            keys::WEATHER_ALERTS_ENABLED,
            preferences.weather_alerts_enabled,
        )
        .await
    }

    async fn flag(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some_and(|value| parse_flag(&value)))
    }

    async fn set_flag(&self, key: &str, enabled: bool) -> Result<()> {
        self.set(key, if enabled { "true" } else { "false" }).await
    }
}

/// libSQL implementation of `PreferencesRepository`
pub struct LibSqlPreferencesRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlPreferencesRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl PreferencesRepository for LibSqlPreferencesRepository<'_> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM settings WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row.get::<String>(0)?))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
                [key, value],
            )
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?", [key])
            .await?;
        Ok(())
    }
}
