//! Weather snapshot model

use serde::{Deserialize, Serialize};

/// Current conditions plus the rain expected over the next ~24 hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Degrees Celsius
    pub temperature: f64,
    /// Millimetres summed over the next eight 3-hour forecast steps
    pub rain_mm: f64,
    pub location: String,
    pub condition: String,
    pub description: String,
    /// Unix ms
    pub updated_at: i64,
}
