//! Database connection management

use crate::error::{Error, Result};
use libsql::{Builder, Connection, Database as LibSqlDatabase};
use std::path::Path;
use std::time::Duration;

use super::migrations;

/// Configuration for the optional Turso embedded replica
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Remote database URL (e.g., `libsql://smartcrop.turso.io`)
    pub url: Option<String>,
    /// Authentication token for remote database
    pub auth_token: Option<String>,
    /// Automatic sync interval (default: 60 seconds)
    pub sync_interval: Option<Duration>,
}

impl SyncConfig {
    /// Create a new sync configuration
    pub fn new(url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            auth_token: Some(auth_token.into()),
            sync_interval: Some(Duration::from_secs(60)),
        }
    }

    /// Disable automatic sync (manual sync only)
    #[must_use]
    pub const fn without_auto_sync(mut self) -> Self {
        self.sync_interval = None;
        self
    }

    /// Check if sync is configured
    pub const fn is_configured(&self) -> bool {
        self.url.is_some() && self.auth_token.is_some()
    }
}

/// Record store backed by libSQL
pub struct Database {
    db: LibSqlDatabase,
    conn: Connection,
    sync_config: Option<SyncConfig>,
}

impl Database {
    /// Open a local-only database at the given path, creating it (and its
    /// parent directory) if needed. Runs migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Builder::new_local(path).build().await?;
        Self::initialize(db, None).await
    }

    /// Open an in-memory database (useful for testing)
    pub async fn open_in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::initialize(db, None).await
    }

    /// Open a local replica that syncs with a remote Turso database.
    ///
    /// Reads are served from the local file; writes go to the remote and sync back.
    pub async fn open_with_sync(
        local_path: impl AsRef<Path>,
        sync_config: SyncConfig,
    ) -> Result<Self> {
        let path_str = local_path.as_ref().to_string_lossy().to_string();

        let url = sync_config
            .url
            .clone()
            .ok_or_else(|| Error::InvalidInput("Sync URL is required".into()))?;
        let token = sync_config
            .auth_token
            .clone()
            .ok_or_else(|| Error::InvalidInput("Auth token is required".into()))?;

        let mut builder = Builder::new_remote_replica(&path_str, url, token);
        if let Some(interval) = sync_config.sync_interval {
            builder = builder.sync_interval(interval);
            tracing::debug!("Automatic sync interval set to {:?}", interval);
        }

        let db = builder.build().await?;
        db.sync().await?;
        tracing::debug!("Initial replica sync complete");
        Self::initialize(db, Some(sync_config)).await
    }

    async fn initialize(db: LibSqlDatabase, sync_config: Option<SyncConfig>) -> Result<Self> {
        let conn = db.connect()?;
        // Remote replicas reject some pragmas.
        conn.execute("PRAGMA journal_mode = WAL;", ()).await.ok();
        conn.execute("PRAGMA foreign_keys = ON;", ()).await?;

        migrations::run(&conn).await?;
        Ok(Self {
            db,
            conn,
            sync_config,
        })
    }

    /// Pull remote changes when a replica is configured
    pub async fn sync(&self) -> Result<()> {
        if self.sync_config.is_some() {
            self.db.sync().await?;
            tracing::debug!("Database synced with remote");
        }
        Ok(())
    }

    pub const fn is_sync_enabled(&self) -> bool {
        self.sync_config.is_some()
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}
