//! Profile repository implementation

use crate::error::Result;
use crate::models::{Profile, SoilType};
use crate::util::unix_millis_now;
use libsql::{params, Connection, Value};

/// Trait for profile storage operations (async)
#[allow(async_fn_in_trait)]
pub trait ProfileRepository {
    /// Get the stored profile for a user
    async fn get(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Insert or replace the stored profile for a user
    async fn upsert(&self, user_id: &str, profile: &Profile) -> Result<()>;
}

/// libSQL implementation of `ProfileRepository`
pub struct LibSqlProfileRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlProfileRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl ProfileRepository for LibSqlProfileRepository<'_> {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        let mut rows = self
            .conn
            .query(
                "SELECT name, soil_type, region, photo FROM profiles WHERE user_id = ?",
                [user_id],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        let soil_type: String = row.get(1)?;
        Ok(Some(Profile {
            name: row.get(0)?,
            soil_type: soil_type.parse().unwrap_or_else(|_| {
                tracing::warn!("Unknown stored soil type '{soil_type}', using Loam");
                SoilType::Loam
            }),
            region: row.get(2)?,
            photo: row.get::<Option<String>>(3)?,
        }))
    }

    async fn upsert(&self, user_id: &str, profile: &Profile) -> Result<()> {
        let photo = profile.photo.clone().map_or(Value::Null, Value::Text);
        self.conn
            .execute(
                "INSERT INTO profiles (user_id, name, soil_type, region, photo, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT(user_id) DO UPDATE SET
                     name = excluded.name,
                     soil_type = excluded.soil_type,
                     region = excluded.region,
                     photo = excluded.photo,
                     updated_at = excluded.updated_at",
                params![
                    user_id,
                    profile.name.as_str(),
                    profile.soil_type.as_str(),
                    profile.region.as_str(),
                    photo,
                    unix_millis_now()
                ],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::Database;

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_profile_is_none() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlProfileRepository::new(db.connection());
        assert_eq!(repo.get("nobody").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upsert_then_get_roundtrip() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlProfileRepository::new(db.connection());

        let mut profile = Profile::new("Amina");
        repo.upsert("user-1", &profile).await.unwrap();
        assert_eq!(repo.get("user-1").await.unwrap(), Some(profile.clone()));

        profile.soil_type = SoilType::Sandy;
        profile.photo = Some("data:image/jpeg;base64,AAAA".to_string());
        repo.upsert("user-1", &profile).await.unwrap();
        assert_eq!(repo.get("user-1").await.unwrap(), Some(profile));
    }
}
