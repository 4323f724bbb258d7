//! Shared record store used by the pipelines and front ends.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{
    Database, HistoryRepository, LibSqlHistoryRepository, LibSqlNotificationRepository,
    LibSqlPreferencesRepository, LibSqlProfileRepository, NotificationRepository,
    PreferencesRepository, ProfileRepository, ScheduledNotification, SyncConfig,
};
use crate::models::{HistoryFilter, HistoryRecord, HistoryRecordId, Profile};
use crate::Result;

/// Destination for history records produced by the pipelines
#[allow(async_fn_in_trait)]
pub trait HistorySink {
    async fn save_record(&self, record: &HistoryRecord) -> Result<()>;
}

/// Thread-safe handle to the local database.
///
/// Cloning shares the same connection; access is serialized by the mutex.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
}

impl LocalStore {
    /// Open the store at `db_path`, syncing with a remote replica when configured.
    pub async fn open_path(
        db_path: impl Into<PathBuf>,
        sync_config: Option<SyncConfig>,
    ) -> Result<Self> {
        let db_path = db_path.into();
        let db = match sync_config.filter(SyncConfig::is_configured) {
            Some(config) => Self::open_replica(&db_path, config).await?,
            None => {
                tracing::info!("Running in local-only mode (no sync config)");
                Database::open(&db_path).await?
            }
        };
        Ok(Self::from_database(db))
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory().await?))
    }

    fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    async fn open_replica(db_path: &Path, config: SyncConfig) -> Result<Database> {
        tracing::info!(
            "Sync enabled with Turso: {}",
            config.url.as_deref().unwrap_or("unknown")
        );
        match Database::open_with_sync(db_path, config.clone()).await {
            Ok(db) => Ok(db),
            Err(error) if is_recoverable_replica_error(&error) => {
                tracing::warn!(
                    "Local replica at {} is inconsistent ({}); resetting it and retrying once",
                    db_path.display(),
                    error
                );
                quarantine_replica_files(db_path)?;
                Database::open_with_sync(db_path, config).await
            }
            Err(error) => Err(error),
        }
    }

    /// Sync with the remote replica when configured.
    pub async fn sync(&self) -> Result<()> {
        let db = self.db.lock().await;
        db.sync().await
    }

    pub async fn is_sync_enabled(&self) -> bool {
        let db = self.db.lock().await;
        db.is_sync_enabled()
    }

    /// All records owned by `owner_id`, in store order.
    pub async fn list_history(&self, owner_id: &str) -> Result<Vec<HistoryRecord>> {
        let db = self.db.lock().await;
        LibSqlHistoryRepository::new(db.connection())
            .list_for_owner(owner_id)
            .await
    }

    /// Records owned by `owner_id` matching a year/month filter.
    pub async fn filtered_history(
        &self,
        owner_id: &str,
        filter: &HistoryFilter,
    ) -> Result<Vec<HistoryRecord>> {
        Ok(filter.apply(self.list_history(owner_id).await?))
    }

    pub async fn get_history_record(&self, id: &HistoryRecordId) -> Result<Option<HistoryRecord>> {
        let db = self.db.lock().await;
        LibSqlHistoryRepository::new(db.connection()).get(id).await
    }

    pub async fn delete_history_record(&self, id: &HistoryRecordId) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlHistoryRepository::new(db.connection()).delete(id).await
    }

    pub async fn load_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let db = self.db.lock().await;
        LibSqlProfileRepository::new(db.connection()).get(user_id).await
    }

    pub async fn save_profile(&self, user_id: &str, profile: &Profile) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlProfileRepository::new(db.connection())
            .upsert(user_id, profile)
            .await
    }

    pub async fn record_notification(&self, notification: &ScheduledNotification) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlNotificationRepository::new(db.connection())
            .insert(notification)
            .await
    }

    pub async fn remove_notification(&self, id: &str) -> Result<bool> {
        let db = self.db.lock().await;
        LibSqlNotificationRepository::new(db.connection())
            .delete(id)
            .await
    }

    pub async fn list_notifications(&self) -> Result<Vec<ScheduledNotification>> {
        let db = self.db.lock().await;
        LibSqlNotificationRepository::new(db.connection())
            .list()
            .await
    }
}

impl HistorySink for LocalStore {
    async fn save_record(&self, record: &HistoryRecord) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlHistoryRepository::new(db.connection())
            .create(record)
            .await
    }
}

impl PreferencesRepository for LocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock().await;
        LibSqlPreferencesRepository::new(db.connection())
            .get(key)
            .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlPreferencesRepository::new(db.connection())
            .set(key, value)
            .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlPreferencesRepository::new(db.connection())
            .remove(key)
            .await
    }
}

fn is_recoverable_replica_error(error: &crate::Error) -> bool {
    let message = error.to_string().to_ascii_lowercase();
    message.contains("file is not a database")
        || message.contains("invalid local state")
        || message.contains("metadata file exists but db file does not")
}

/// Move a broken replica aside and drop its sidecar files.
fn quarantine_replica_files(db_path: &Path) -> Result<()> {
    if db_path.exists() {
        let backup_path = db_path.with_extension(format!(
            "corrupt-{}",
            chrono::Utc::now().timestamp_millis()
        ));
        std::fs::rename(db_path, &backup_path)?;
        tracing::warn!(
            "Moved corrupted replica {} to {}",
            db_path.display(),
            backup_path.display()
        );
    }

    let (Some(parent), Some(base_name)) = (
        db_path.parent(),
        db_path.file_name().and_then(|name| name.to_str()),
    ) else {
        return Ok(());
    };
    let sidecar_prefix = format!("{base_name}-");

    for entry in std::fs::read_dir(parent)? {
        let entry = entry?;
        if entry.file_type()?.is_file()
            && entry.file_name().to_string_lossy().starts_with(&sidecar_prefix)
        {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::db::keys;
    use crate::models::{sample_recommendations, AgronomicInput, Season, SoilType};

    #[tokio::test(flavor = "multi_thread")]
    async fn history_roundtrip_through_store() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let input = AgronomicInput::fallback(Season::First, SoilType::Loam);
        let record = HistoryRecord::new("user-1", &input, sample_recommendations());

        store.save_record(&record).await.unwrap();
        assert_eq!(store.list_history("user-1").await.unwrap(), vec![record.clone()]);

        store.delete_history_record(&record.id).await.unwrap();
        assert!(store.list_history("user-1").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn preferences_default_to_false() {
        let store = LocalStore::open_in_memory().await.unwrap();
        assert!(!store.load().await.unwrap().weather_alerts_enabled);

        store.set(keys::WEATHER_ALERTS_ENABLED, "true").await.unwrap();
        assert!(store.load().await.unwrap().weather_alerts_enabled);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn clones_share_the_same_database() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let clone = store.clone();
        clone.save_profile("user-1", &Profile::new("Amina")).await.unwrap();

        let profile = store.load_profile("user-1").await.unwrap().unwrap();
        assert_eq!(profile.name, "Amina");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn open_path_creates_local_database() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("data").join("smartcrop.db");

        let store = LocalStore::open_path(&db_path, None).await.unwrap();
        assert!(!store.is_sync_enabled().await);
        assert!(db_path.exists());
    }

    #[test]
    fn detects_recoverable_replica_errors() {
        assert!(is_recoverable_replica_error(&crate::Error::Database(
            "SQLite failure: file is not a database".to_string()
        )));
        assert!(!is_recoverable_replica_error(&crate::Error::InvalidInput(
            "season".to_string()
        )));
    }

    #[test]
    fn quarantine_moves_replica_and_removes_sidecars() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("smartcrop.db");
        let info_path = tmp.path().join("smartcrop.db-info");
        std::fs::write(&db_path, b"bad").unwrap();
        std::fs::write(&info_path, b"meta").unwrap();

        quarantine_replica_files(&db_path).unwrap();

        assert!(!db_path.exists());
        assert!(!info_path.exists());
        let backups = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("smartcrop.corrupt-"))
            .count();
        assert_eq!(backups, 1);
    }
}
