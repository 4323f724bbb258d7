//! Prediction history repository implementation

use crate::error::{Error, Result};
use crate::models::{HistoryRecord, HistoryRecordId, Recommendation};
use libsql::{params, Connection, Row};

/// Trait for history record storage operations (async)
#[allow(async_fn_in_trait)]
pub trait HistoryRepository {
    /// Insert a new record
    async fn create(&self, record: &HistoryRecord) -> Result<()>;

    /// Get a record by ID
    async fn get(&self, id: &HistoryRecordId) -> Result<Option<HistoryRecord>>;

    /// List all records owned by a user, in store order
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<HistoryRecord>>;

    /// Delete a record by ID
    async fn delete(&self, id: &HistoryRecordId) -> Result<()>;
}

/// libSQL implementation of `HistoryRepository`
pub struct LibSqlHistoryRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlHistoryRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a record from a database row
    fn parse_record(row: &Row) -> Result<HistoryRecord> {
        let id: String = row.get(0)?;
        let season: String = row.get(2)?;
        let soil_type: String = row.get(3)?;
        let recommendations: String = row.get(6)?;

        Ok(HistoryRecord {
            id: id
                .parse()
                .map_err(|_| Error::Database(format!("Invalid history record id '{id}'")))?,
            owner_id: row.get(1)?,
            season: season.parse()?,
            soil_type: soil_type.parse()?,
            temperature: row.get(4)?,
            rainfall: row.get(5)?,
            recommendations: serde_json::from_str::<Vec<Recommendation>>(&recommendations)?,
            created_at: row.get(7)?,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, season, soil_type, temperature, rainfall, \
                              recommendations, created_at FROM predictions";

impl HistoryRepository for LibSqlHistoryRepository<'_> {
    async fn create(&self, record: &HistoryRecord) -> Result<()> {
        let recommendations = serde_json::to_string(&record.recommendations)?;
        self.conn
            .execute(
                "INSERT INTO predictions (
                     id, user_id, season, soil_type, temperature, rainfall, recommendations,
                     created_at
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    record.id.as_str(),
                    record.owner_id.as_str(),
                    record.season.as_str(),
                    record.soil_type.as_str(),
                    record.temperature,
                    record.rainfall,
                    recommendations,
                    record.created_at
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: &HistoryRecordId) -> Result<Option<HistoryRecord>> {
        let mut rows = self
            .conn
            .query(&format!("{SELECT_COLUMNS} WHERE id = ?"), [id.as_str()])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<HistoryRecord>> {
        let mut rows = self
            .conn
            .query(&format!("{SELECT_COLUMNS} WHERE user_id = ?"), [owner_id])
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            match Self::parse_record(&row) {
                Ok(record) => records.push(record),
                Err(error) => tracing::warn!("Skipping unreadable history record: {error}"),
            }
        }
        Ok(records)
    }

    async fn delete(&self, id: &HistoryRecordId) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM predictions WHERE id = ?", [id.as_str()])
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}
