//! Agronomic inputs and crop recommendations

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Coarse agronomic period derived from the calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Season {
    /// March to June (main rains)
    #[default]
    First,
    /// August to December (short rains)
    Second,
}

impl Season {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "First",
            Self::Second => "Second",
        }
    }

    /// Rainfall (mm) assumed when no live forecast is available.
    pub const fn default_rainfall(self) -> f64 {
        match self {
            Self::First => 180.0,
            Self::Second => 120.0,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "1" => Ok(Self::First),
            "second" | "2" => Ok(Self::Second),
            other => Err(Error::InvalidInput(format!("unknown season '{other}'"))),
        }
    }
}

/// Season for a 1-based calendar month.
///
/// January, February and July have no season of their own and default to
/// `First`.
pub const fn season_for_month(month: u32) -> Season {
    match month {
        8..=12 => Season::Second,
        _ => Season::First,
    }
}

/// Season for the current local date.
pub fn current_season() -> Season {
    season_for_month(chrono::Local::now().month())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SoilType {
    /// Balanced, moisture-retaining
    #[default]
    Loam,
    /// Holds water, slow drainage
    Clay,
    /// Fast drainage, airy
    Sandy,
}

impl SoilType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loam => "Loam",
            Self::Clay => "Clay",
            Self::Sandy => "Sandy",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loam" => Ok(Self::Loam),
            "clay" => Ok(Self::Clay),
            "sandy" => Ok(Self::Sandy),
            other => Err(Error::InvalidInput(format!("unknown soil type '{other}'"))),
        }
    }
}

/// The tuple submitted to the crop predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgronomicInput {
    pub season: Season,
    pub soil_type: SoilType,
    /// Degrees Celsius
    pub temperature: f64,
    /// Millimetres
    pub rainfall: f64,
}

impl AgronomicInput {
    pub const fn new(season: Season, soil_type: SoilType, temperature: f64, rainfall: f64) -> Self {
        Self {
            season,
            soil_type,
            temperature,
            rainfall,
        }
    }

    /// Deterministic inputs used when live data is unavailable.
    pub const fn fallback(season: Season, soil_type: SoilType) -> Self {
        Self::new(season, soil_type, 26.0, season.default_rainfall())
    }

    /// Temperature and rainfall must be finite and non-zero.
    pub fn is_valid(&self) -> bool {
        is_usable_measure(self.temperature) && is_usable_measure(self.rainfall)
    }
}

fn is_usable_measure(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

/// A single crop suggestion returned by the predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub crop: String,
    /// 0-100
    pub confidence: f64,
    #[serde(default)]
    pub explanation: String,
}

impl Recommendation {
    pub fn new(crop: impl Into<String>, confidence: f64, explanation: impl Into<String>) -> Self {
        Self {
            crop: crop.into(),
            confidence,
            explanation: explanation.into(),
        }
    }
}

/// Static recommendations shown when the refresh pipeline cannot reach live data.
pub fn sample_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation::new("Maize", 85.0, "Good default for First season in Luwero."),
        Recommendation::new("Beans", 72.0, "Fast maturing legume."),
    ]
}

/// Static recommendations shown when manual analysis cannot reach the backend.
pub fn offline_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation::new("Maize", 82.0, ""),
        Recommendation::new("Beans", 70.0, ""),
        Recommendation::new("Cassava", 65.0, ""),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_for_month_covers_every_month() {
        for month in 1..=12 {
            let expected = if (8..=12).contains(&month) {
                Season::Second
            } else {
                Season::First
            };
            assert_eq!(season_for_month(month), expected, "month {month}");
        }
    }

    #[test]
    fn fallback_rainfall_depends_on_season() {
        let first = AgronomicInput::fallback(Season::First, SoilType::Loam);
        let second = AgronomicInput::fallback(Season::Second, SoilType::Clay);
        assert!((first.temperature - 26.0).abs() < f64::EPSILON);
        assert!((first.rainfall - 180.0).abs() < f64::EPSILON);
        assert!((second.rainfall - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn input_validation_rejects_zero_and_nan() {
        assert!(AgronomicInput::new(Season::First, SoilType::Loam, 26.0, 180.0).is_valid());
        assert!(!AgronomicInput::new(Season::First, SoilType::Loam, 0.0, 180.0).is_valid());
        assert!(!AgronomicInput::new(Season::First, SoilType::Loam, 26.0, 0.0).is_valid());
        assert!(!AgronomicInput::new(Season::First, SoilType::Loam, f64::NAN, 180.0).is_valid());
    }

    #[test]
    fn input_serializes_with_wire_field_names() {
        let input = AgronomicInput::new(Season::Second, SoilType::Sandy, 30.0, 200.0);
        let json = serde_json::to_value(input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "season": "Second",
                "soil_type": "Sandy",
                "temperature": 30.0,
                "rainfall": 200.0
            })
        );
    }

    #[test]
    fn recommendation_explanation_is_optional_on_the_wire() {
        let rec: Recommendation =
            serde_json::from_str(r#"{"crop":"Cassava","confidence":65}"#).unwrap();
        assert_eq!(rec.crop, "Cassava");
        assert!(rec.explanation.is_empty());
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!("second".parse::<Season>().unwrap(), Season::Second);
        assert_eq!(" CLAY ".parse::<SoilType>().unwrap(), SoilType::Clay);
        assert!("peat".parse::<SoilType>().is_err());
    }
}
