//! Local preference flags

use serde::{Deserialize, Serialize};

/// Theme mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light theme
    #[default]
    Light,
    /// Dark theme
    Dark,
}

/// Device-local preferences, independent of the signed-in account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub dark_mode: bool,
    /// Weekly farm tips are scheduled
    pub tips_enabled: bool,
    /// Heavy rain / high heat alerts after a refresh
    pub weather_alerts_enabled: bool,
}

impl Preferences {
    pub const fn theme(&self) -> ThemeMode {
        if self.dark_mode {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_default() {
        let preferences = Preferences::default();
        assert!(!preferences.dark_mode);
        assert!(!preferences.tips_enabled);
        assert!(!preferences.weather_alerts_enabled);
        assert_eq!(preferences.theme(), ThemeMode::Light);
    }
}
