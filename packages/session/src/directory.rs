//! One-shot prefecture directory loading.

use std::sync::Arc;

use resas_chart_api::{ApiError, PopulationProvider};
use resas_chart_population_models::Prefecture;
use tokio::sync::mpsc;

use crate::SessionEvent;

/// Reason the prefecture directory could not be loaded.
///
/// The `Display` text is the message shown in place of the whole view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// Provider answered with a non-success status.
    #[error("Failed to fetch prefectures")]
    Status,

    /// Transport or payload failure, carrying the underlying message.
    #[error("{0}")]
    Request(String),

    /// The loader task ended without producing a result.
    #[error("An unknown error occurred")]
    Unknown,
}

impl From<ApiError> for DirectoryError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { .. } => Self::Status,
            other => Self::Request(other.to_string()),
        }
    }
}

/// Directory lifecycle. `Failed` is terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DirectoryState {
    /// Request in flight.
    #[default]
    Loading,
    /// Prefectures as returned by the provider.
    Loaded(Vec<Prefecture>),
    /// Load failed; never retried.
    Failed(DirectoryError),
}

impl DirectoryState {
    /// Loaded prefectures, or an empty slice while loading or failed.
    #[must_use]
    pub fn prefectures(&self) -> &[Prefecture] {
        match self {
            Self::Loaded(list) => list,
            Self::Loading | Self::Failed(_) => &[],
        }
    }

    /// Records the loader outcome. Ignored once a result has been applied.
    pub fn apply(&mut self, outcome: Result<Vec<Prefecture>, DirectoryError>) {
        if !matches!(self, Self::Loading) {
            log::warn!("Ignoring duplicate directory result");
            return;
        }
        *self = match outcome {
            Ok(list) => {
                log::info!("Prefecture directory loaded ({} entries)", list.len());
                Self::Loaded(list)
            }
            Err(e) => {
                log::error!("Prefecture directory failed to load: {e}");
                Self::Failed(e)
            }
        };
    }
}

/// Spawns the single directory request. The outcome is delivered as
/// [`SessionEvent::Directory`].
///
/// Must be called from within a tokio runtime.
pub fn spawn_load(provider: Arc<dyn PopulationProvider>, tx: mpsc::UnboundedSender<SessionEvent>) {
    tokio::spawn(async move {
        let request = tokio::spawn(async move { provider.prefectures().await });

        let outcome = match request.await {
            Ok(result) => result.map_err(DirectoryError::from),
            Err(e) => {
                log::error!("Directory loader task aborted: {e}");
                Err(DirectoryError::Unknown)
            }
        };

        if tx.send(SessionEvent::Directory(outcome)).is_err() {
            log::debug!("Session dropped before directory load finished");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_fixed_message() {
        let err = DirectoryError::from(ApiError::Status {
            status: 500,
            url: "http://x".to_string(),
        });
        assert_eq!(err.to_string(), "Failed to fetch prefectures");
    }

    #[test]
    fn other_errors_keep_their_message() {
        let err = DirectoryError::from(ApiError::Payload {
            message: "empty".to_string(),
        });
        assert_eq!(err.to_string(), "Unexpected payload: empty");
        assert_eq!(DirectoryError::Unknown.to_string(), "An unknown error occurred");
    }

    #[test]
    fn failure_is_terminal() {
        let mut state = DirectoryState::default();
        state.apply(Err(DirectoryError::Status));
        state.apply(Ok(vec![Prefecture {
            code: 1,
            name: "北海道".to_string(),
        }]));
        assert_eq!(state, DirectoryState::Failed(DirectoryError::Status));
        assert!(state.prefectures().is_empty());
    }
}
