#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the RESAS open-data API.
//!
//! Two endpoints are consumed:
//!
//! - `GET /api/v1/prefectures`: the full prefecture list.
//! - `GET /api/v1/population/composition/perYear?prefCode=<n>`: four
//!   per-year population buckets for one prefecture.
//!
//! Callers talk to the provider through the [`PopulationProvider`] trait so
//! that the session layer can be driven by a fake in tests. Requests are
//! attempted exactly once; there is no retry or caching layer.

pub mod client;
pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use resas_chart_population_models::{CompositionResponse, Prefecture};
use resas_chart_region_models::PrefCode;

pub use client::ResasClient;

/// Default provider origin.
pub const DEFAULT_BASE_URL: &str = "https://opendata.resas-portal.go.jp";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "RESAS_API_KEY";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "RESAS_API_BASE_URL";

/// Errors that can occur while talking to the provider.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Payload parsed but is missing required data.
    #[error("Unexpected payload: {message}")]
    Payload {
        /// Description of what was missing.
        message: String,
    },
}

/// Connection settings for [`ResasClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Provider origin without a trailing slash.
    pub base_url: String,
    /// Value sent in the `X-API-KEY` header. May be empty.
    pub api_key: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: option_env!("RESAS_API_KEY").unwrap_or_default().to_string(),
            timeout: None,
        }
    }
}

impl ApiConfig {
    /// Builds a config from the process environment.
    ///
    /// The API key baked in at build time is used unless `RESAS_API_KEY` is
    /// set at runtime. A missing key is not an error; requests go out with
    /// an empty header and fail at the provider.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config using `lookup` in place of the process environment.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(key) = lookup(API_KEY_ENV) {
            config.api_key = key;
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(&url);
        }

        if config.api_key.is_empty() {
            log::warn!("{API_KEY_ENV} is not set; provider requests will likely be rejected");
        }

        config
    }

    /// Replaces the base URL, stripping any trailing slashes.
    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the prefecture list endpoint.
    #[must_use]
    pub fn prefectures_url(&self) -> String {
        format!("{}/api/v1/prefectures", self.base_url)
    }

    /// URL of the per-year composition endpoint (query added separately).
    #[must_use]
    pub fn composition_url(&self) -> String {
        format!("{}/api/v1/population/composition/perYear", self.base_url)
    }
}

/// Source of prefecture metadata and population composition data.
#[async_trait]
pub trait PopulationProvider: Send + Sync {
    /// Fetches every prefecture.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails, the provider answers with
    /// a non-success status, or the payload is malformed.
    async fn prefectures(&self) -> Result<Vec<Prefecture>, ApiError>;

    /// Fetches the four-bucket per-year composition for one prefecture.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails, the provider answers with
    /// a non-success status, or the payload is malformed.
    async fn composition(&self, code: PrefCode) -> Result<CompositionResponse, ApiError>;
}
