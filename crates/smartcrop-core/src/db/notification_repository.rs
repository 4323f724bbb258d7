//! Locally scheduled notifications

use crate::error::Result;
use libsql::{params, Connection, Value};

/// A notification recorded by the local notification backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Weekly trigger; `None` for one-off notifications
    pub weekly: Option<(u32, u32, u32)>,
    /// Unix ms
    pub created_at: i64,
}

/// Trait for notification storage operations (async)
#[allow(async_fn_in_trait)]
pub trait NotificationRepository {
    async fn insert(&self, notification: &ScheduledNotification) -> Result<()>;

    /// Delete by id; returns whether a row existed
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn list(&self) -> Result<Vec<ScheduledNotification>>;
}

/// libSQL implementation of `NotificationRepository`
pub struct LibSqlNotificationRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlNotificationRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl NotificationRepository for LibSqlNotificationRepository<'_> {
    async fn insert(&self, notification: &ScheduledNotification) -> Result<()> {
        let (weekday, hour, minute) = notification.weekly.map_or(
            (Value::Null, Value::Null, Value::Null),
            |(weekday, hour, minute)| {
                (
                    Value::Integer(i64::from(weekday)),
                    Value::Integer(i64::from(hour)),
                    Value::Integer(i64::from(minute)),
                )
            },
        );
        self.conn
            .execute(
                "INSERT INTO notifications (id, title, body, weekday, hour, minute, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    notification.id.as_str(),
                    notification.title.as_str(),
                    notification.body.as_str(),
                    weekday,
                    hour,
                    minute,
                    notification.created_at
                ],
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM notifications WHERE id = ?", [id])
            .await?;
        Ok(rows > 0)
    }

    async fn list(&self) -> Result<Vec<ScheduledNotification>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, title, body, weekday, hour, minute, created_at
                 FROM notifications
                 ORDER BY created_at ASC",
                (),
            )
            .await?;

        let mut notifications = Vec::new();
        while let Some(row) = rows.next().await? {
            let weekday = row.get::<Option<u32>>(3)?;
            let hour = row.get::<Option<u32>>(4)?;
            let minute = row.get::<Option<u32>>(5)?;
            notifications.push(ScheduledNotification {
                id: row.get(0)?,
                title: row.get(1)?,
                body: row.get(2)?,
                weekly: match (weekday, hour, minute) {
                    (Some(weekday), Some(hour), Some(minute)) => Some((weekday, hour, minute)),
                    _ => None,
                },
                created_at: row.get(6)?,
            });
        }
        Ok(notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn weekly_tip(id: &str) -> ScheduledNotification {
        ScheduledNotification {
            id: id.to_string(),
            title: "SmartCrop tip".to_string(),
            body: "Weekly farm tip".to_string(),
            weekly: Some((1, 8, 0)),
            created_at: 1,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn insert_list_delete() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlNotificationRepository::new(db.connection());

        repo.insert(&weekly_tip("tip-1")).await.unwrap();
        let listed = repo.list().await.unwrap();
        assert_eq!(listed, vec![weekly_tip("tip-1")]);

        assert!(repo.delete("tip-1").await.unwrap());
        assert!(!repo.delete("tip-1").await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
