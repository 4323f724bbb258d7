//! Database layer for SmartCrop

mod connection;
mod history_repository;
mod migrations;
mod notification_repository;
mod preferences_repository;
mod profile_repository;

pub use connection::{Database, SyncConfig};
pub use history_repository::{HistoryRepository, LibSqlHistoryRepository};
pub use notification_repository::{
    LibSqlNotificationRepository, NotificationRepository, ScheduledNotification,
};
pub use preferences_repository::{keys, LibSqlPreferencesRepository, PreferencesRepository};
pub use profile_repository::{LibSqlProfileRepository, ProfileRepository};
