//! User profile model

use serde::{Deserialize, Serialize};

use super::SoilType;
use crate::util::{email_local_part, normalize_text_option};

pub const DEFAULT_PROFILE_NAME: &str = "Farmer";
pub const DEFAULT_REGION: &str = "Luwero";

/// Profile fields bound to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Preferred soil type, used as the default for refresh inputs
    pub soil_type: SoilType,
    pub region: String,
    /// Data URL or device URI of the profile photo
    pub photo: Option<String>,
}

impl Profile {
    /// Profile created at sign-up.
    pub fn new(name: impl Into<String>) -> Self {
        let name = normalize_text_option(Some(name.into()))
            .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string());
        Self {
            name,
            soil_type: SoilType::Loam,
            region: DEFAULT_REGION.to_string(),
            photo: None,
        }
    }

    /// Transient profile for accounts that have no stored profile yet.
    pub fn default_for_email(email: Option<&str>) -> Self {
        Self::new(email.and_then(email_local_part).unwrap_or(DEFAULT_PROFILE_NAME))
    }

    /// Apply a partial update; unspecified fields are preserved.
    #[must_use]
    pub fn merged(mut self, update: &ProfileUpdate) -> Self {
        if let Some(name) = &update.name {
            self.name = normalize_text_option(Some(name.clone()))
                .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string());
        }
        if let Some(soil_type) = update.soil_type {
            self.soil_type = soil_type;
        }
        if let Some(region) = &update.region {
            self.region = normalize_text_option(Some(region.clone()))
                .unwrap_or_else(|| DEFAULT_REGION.to_string());
        }
        if let Some(photo) = &update.photo {
            self.photo = normalize_text_option(photo.clone());
        }
        self
    }
}

/// Merge-style partial profile update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub soil_type: Option<SoilType>,
    pub region: Option<String>,
    /// `Some(None)` clears the photo
    pub photo: Option<Option<String>>,
}

impl ProfileUpdate {
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.soil_type.is_none()
            && self.region.is_none()
            && self.photo.is_none()
    }
}
