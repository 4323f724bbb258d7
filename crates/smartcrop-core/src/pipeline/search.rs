//! Debounced crop search against the most recent inputs.

use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use super::LastInputs;
use crate::api::CropPredictor;
use crate::models::Recommendation;
use crate::sequence::{RequestSequencer, Ticket};

/// Quiet period after the last keystroke before a search fires.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

const NO_MATCH: &str = "No crops match your search.";
const SEARCH_FAILED: &str = "Search failed. Please try again.";

type InFlightSearch<'a> = LocalBoxFuture<'a, (Ticket, Option<SearchOutcome>)>;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Query was emptied; show the regular recommendations again
    Cleared,
    Found {
        query: String,
        result: Recommendation,
    },
    Empty {
        query: String,
        message: &'static str,
    },
}

impl SearchOutcome {
    pub fn results(&self) -> Vec<Recommendation> {
        match self {
            Self::Found { result, .. } => vec![result.clone()],
            Self::Cleared | Self::Empty { .. } => Vec::new(),
        }
    }

    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Empty { message, .. } => Some(message),
            Self::Cleared | Self::Found { .. } => None,
        }
    }
}

pub struct SearchPipeline<P> {
    predictor: P,
    last_inputs: LastInputs,
    sequencer: RequestSequencer,
    debounce: Duration,
}

impl<P: CropPredictor> SearchPipeline<P> {
    pub fn new(predictor: P, last_inputs: LastInputs) -> Self {
        Self {
            predictor,
            last_inputs,
            sequencer: RequestSequencer::new(),
            debounce: SEARCH_DEBOUNCE,
        }
    }

    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Search immediately, without debouncing.
    ///
    /// Returns `None` when nothing was searched: there are no inputs from a
    /// successful prediction yet.
    pub async fn search_now(&self, query: &str) -> Option<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            self.sequencer.invalidate();
            return Some(SearchOutcome::Cleared);
        }
        let ticket = self.sequencer.issue();
        let outcome = self.execute(query.to_string()).await?;
        self.sequencer.is_current(ticket).then_some(outcome)
    }

    /// Consume query edits until the sender closes, publishing outcomes.
    ///
    /// Each edit restarts the debounce timer. Requests that overlap are left
    /// to finish, but only the latest issued one may publish.
    pub async fn run(
        &self,
        mut queries: mpsc::Receiver<String>,
        outcomes: mpsc::Sender<SearchOutcome>,
    ) {
        let mut pending: Option<(String, Instant)> = None;
        let mut in_flight: FuturesUnordered<InFlightSearch<'_>> = FuturesUnordered::new();

        loop {
            let deadline = pending.as_ref().map(|(_, deadline)| *deadline);
            tokio::select! {
                edit = queries.recv() => {
                    let Some(edit) = edit else { break };
                    let query = edit.trim();
                    if query.is_empty() {
                        pending = None;
                        self.sequencer.invalidate();
                        if outcomes.send(SearchOutcome::Cleared).await.is_err() {
                            return;
                        }
                    } else {
                        pending = Some((query.to_string(), Instant::now() + self.debounce));
                    }
                }
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    let request = pending.take().and_then(|(query, _)| self.start(query));
                    if let Some(request) = request {
                        in_flight.push(request);
                    }
                }
                Some((ticket, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                    if let Some(outcome) = outcome.filter(|_| self.sequencer.is_current(ticket)) {
                        if outcomes.send(outcome).await.is_err() {
                            return;
                        }
                    }
                }
            }
        }

        // The last edit still fires once its quiet period has passed.
        if let Some((query, deadline)) = pending.take() {
            sleep_until(deadline).await;
            if let Some(request) = self.start(query) {
                in_flight.push(request);
            }
        }

        while let Some((ticket, outcome)) = in_flight.next().await {
            if let Some(outcome) = outcome.filter(|_| self.sequencer.is_current(ticket)) {
                if outcomes.send(outcome).await.is_err() {
                    return;
                }
            }
        }
    }

    fn start(&self, query: String) -> Option<InFlightSearch<'_>> {
        if self.last_inputs.get().is_none() {
            tracing::debug!("Search skipped; no prediction inputs yet");
            return None;
        }
        let ticket = self.sequencer.issue();
        Some(async move { (ticket, self.execute(query).await) }.boxed_local())
    }

    async fn execute(&self, query: String) -> Option<SearchOutcome> {
        let input = self.last_inputs.get()?;
        let outcome = match self.predictor.search(&query, &input).await {
            Ok(result) => SearchOutcome::Found { query, result },
            Err(error) if error.is_not_found() => SearchOutcome::Empty {
                query,
                message: NO_MATCH,
            },
            Err(error) => {
                tracing::warn!("Crop search failed: {error}");
                SearchOutcome::Empty {
                    query,
                    message: SEARCH_FAILED,
                }
            }
        };
        Some(outcome)
    }
}
