pub mod analyze;
pub mod ask;
pub mod auth_cmd;
pub mod common;
pub mod history;
pub mod prefs;
pub mod profile;
pub mod refresh;
pub mod search;
pub mod sync;
