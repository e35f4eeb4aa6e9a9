//! Fire-and-forget population series fetching.
//!
//! Each [`SeriesFetcher::fetch_series`] call spawns its own request; nothing
//! is de-duplicated or cancelled. Results come back through the session
//! channel and are written to the [`SeriesStore`] in arrival order unless
//! [`WritePolicy::LatestRequestWins`] is selected.

use std::collections::BTreeMap;
use std::sync::Arc;

use resas_chart_api::{ApiError, PopulationProvider};
use resas_chart_population_models::{PopulationCategory, SeriesPoint, SeriesStore};
use resas_chart_region_models::PrefCode;
use tokio::sync::mpsc;

use crate::SessionEvent;

/// How concurrent responses for the same prefecture are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// Whichever response arrives last overwrites the store, even if it
    /// answers an older request.
    #[default]
    LastWriteWins,
    /// Responses to superseded requests are discarded.
    LatestRequestWins,
}

/// Why a series fetch produced no data.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    /// Provider request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Response lacked the bucket for the requested category.
    #[error("response has no `{category}` bucket")]
    MissingBucket {
        /// Requested category.
        category: PopulationCategory,
    },

    /// The request task ended without producing a result.
    #[error("fetch task aborted: {0}")]
    Aborted(String),
}

/// A completed fetch, as delivered through the session channel.
#[derive(Debug)]
pub struct SeriesResponse {
    /// Prefecture the request was for.
    pub code: PrefCode,
    /// Category active when the request was issued.
    pub category: PopulationCategory,
    /// Per-fetcher request sequence number.
    pub request_id: u64,
    /// Extracted series or the failure.
    pub outcome: Result<Vec<SeriesPoint>, SeriesError>,
}

/// Issues series requests and owns the [`SeriesStore`] they fill.
pub struct SeriesFetcher {
    provider: Arc<dyn PopulationProvider>,
    tx: mpsc::UnboundedSender<SessionEvent>,
    store: SeriesStore,
    policy: WritePolicy,
    next_request_id: u64,
    latest_request: BTreeMap<PrefCode, u64>,
    in_flight: usize,
}

impl SeriesFetcher {
    /// Creates a fetcher that reports completions on `tx`.
    #[must_use]
    pub fn new(
        provider: Arc<dyn PopulationProvider>,
        tx: mpsc::UnboundedSender<SessionEvent>,
        policy: WritePolicy,
    ) -> Self {
        Self {
            provider,
            tx,
            store: SeriesStore::new(),
            policy,
            next_request_id: 0,
            latest_request: BTreeMap::new(),
            in_flight: 0,
        }
    }

    /// Stored series.
    #[must_use]
    pub const fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Number of requests issued but not yet applied.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Spawns a request for `code` and extracts `category` from the reply.
    ///
    /// Returns immediately. Must be called from within a tokio runtime.
    pub fn fetch_series(&mut self, code: PrefCode, category: PopulationCategory) {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.latest_request.insert(code, request_id);
        self.in_flight += 1;

        log::debug!("Fetching {category} series for prefCode={code} (request {request_id})");

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let request = tokio::spawn(async move { provider.composition(code).await });

            let outcome = match request.await {
                Ok(Ok(response)) => response
                    .into_series(category)
                    .ok_or(SeriesError::MissingBucket { category }),
                Ok(Err(e)) => Err(SeriesError::Api(e)),
                Err(e) => Err(SeriesError::Aborted(e.to_string())),
            };

            let response = SeriesResponse {
                code,
                category,
                request_id,
                outcome,
            };
            if tx.send(SessionEvent::Series(response)).is_err() {
                log::debug!("Session dropped before prefCode={code} fetch finished");
            }
        });
    }

    /// Empties the store for every prefecture.
    pub fn clear_series(&mut self) {
        log::debug!("Clearing {} stored series", self.store.len());
        self.store.clear();
    }

    /// Writes a completed fetch into the store.
    ///
    /// Failures are logged and leave the store untouched.
    pub fn apply(&mut self, response: SeriesResponse) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let SeriesResponse {
            code,
            category,
            request_id,
            outcome,
        } = response;

        let series = match outcome {
            Ok(series) => series,
            Err(e) => {
                log::error!("Error fetching population data for prefCode={code}: {e}");
                return;
            }
        };

        if self.policy == WritePolicy::LatestRequestWins
            && self
                .latest_request
                .get(&code)
                .is_some_and(|&latest| latest != request_id)
        {
            log::debug!(
                "Discarding superseded {category} series for prefCode={code} (request {request_id})"
            );
            return;
        }

        log::debug!(
            "Stored {} {category} points for prefCode={code} (request {request_id})",
            series.len()
        );
        self.store.insert(code, series);
    }
}
