//! smartcrop-core - Core library for SmartCrop
//!
//! Models, local storage, remote clients (crop predictor, AI advisor,
//! weather, auth) and the refresh/search/analysis flows shared by every
//! SmartCrop front end.

pub mod account;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod sequence;
pub mod services;
pub mod util;
pub mod weather;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
pub use models::{AgronomicInput, HistoryRecord, Recommendation, Season, SoilType};
