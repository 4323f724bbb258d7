//! Refresh, search and manual-analysis flows.
//!
//! Each flow catches its own failures and reports them as display strings;
//! none of them return transport errors to the caller.

mod analysis;
mod inputs;
mod refresh;
mod search;

pub use analysis::{save_status_message, AnalysisError, AnalysisPipeline, AnalysisResult};
pub use inputs::LastInputs;
pub use refresh::{RefreshOutcome, RefreshPipeline};
pub use search::{SearchOutcome, SearchPipeline, SEARCH_DEBOUNCE};
