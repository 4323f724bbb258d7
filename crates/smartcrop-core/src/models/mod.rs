//! Data models for SmartCrop

mod agronomy;
mod history;
mod preferences;
mod profile;
mod weather;

pub use agronomy::{
    current_season, offline_recommendations, sample_recommendations, season_for_month,
    AgronomicInput, Recommendation, Season, SoilType,
};
pub use history::{available_years, HistoryFilter, HistoryRecord, HistoryRecordId};
pub use preferences::{Preferences, ThemeMode};
pub use profile::{Profile, ProfileUpdate, DEFAULT_PROFILE_NAME, DEFAULT_REGION};
pub use weather::WeatherSnapshot;
