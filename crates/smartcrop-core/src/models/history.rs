//! History record model

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AgronomicInput, Recommendation, Season, SoilType};

/// A unique identifier for a history record, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRecordId(Uuid);

impl HistoryRecordId {
    /// Create a new unique record ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for HistoryRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HistoryRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HistoryRecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A persisted snapshot of an analysis and its recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unique identifier
    pub id: HistoryRecordId,
    /// Owning user id
    pub owner_id: String,
    pub season: Season,
    pub soil_type: SoilType,
    pub temperature: f64,
    pub rainfall: f64,
    pub recommendations: Vec<Recommendation>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

impl HistoryRecord {
    /// Create a new record stamped with the current time
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        input: &AgronomicInput,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        Self {
            id: HistoryRecordId::new(),
            owner_id: owner_id.into(),
            season: input.season,
            soil_type: input.soil_type,
            temperature: input.temperature,
            rainfall: input.rainfall,
            recommendations,
            created_at: Utc::now().timestamp_millis(),
        }
    }

    /// The inputs this record was produced from
    pub const fn input(&self) -> AgronomicInput {
        AgronomicInput::new(self.season, self.soil_type, self.temperature, self.rainfall)
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }
}

/// Year/month filter applied to a user's history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub year: Option<i32>,
    /// 1-based
    pub month: Option<u32>,
}

impl HistoryFilter {
    pub const fn is_active(&self) -> bool {
        self.year.is_some() || self.month.is_some()
    }

    #[must_use]
    pub fn matches(&self, record: &HistoryRecord) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(created) = record.created_at_utc() else {
            return false;
        };
        self.year.map_or(true, |year| created.year() == year)
            && self.month.map_or(true, |month| created.month() == month)
    }

    pub fn apply(&self, records: Vec<HistoryRecord>) -> Vec<HistoryRecord> {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

/// Distinct years present in the records, newest first.
pub fn available_years(records: &[HistoryRecord]) -> Vec<i32> {
    let years = records
        .iter()
        .filter_map(HistoryRecord::created_at_utc)
        .map(|created| created.year())
        .collect::<BTreeSet<_>>();
    years.into_iter().rev().collect()
}
