//! Shared services used by the pipelines and front ends.

mod store;

pub use store::{HistorySink, LocalStore};
