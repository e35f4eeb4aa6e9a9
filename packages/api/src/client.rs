//! `reqwest`-backed [`PopulationProvider`].

use async_trait::async_trait;
use resas_chart_population_models::{CompositionResponse, Prefecture, PrefecturesResponse};
use resas_chart_region_models::PrefCode;

use crate::{ApiConfig, ApiError, PopulationProvider, http};

/// Header carrying the provider API key.
const API_KEY_HEADER: &str = "X-API-KEY";

/// HTTP client for the RESAS endpoints.
#[derive(Debug, Clone)]
pub struct ResasClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl ResasClient {
    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying HTTP client cannot be
    /// built (e.g. TLS backend initialization failure).
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Settings this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(API_KEY_HEADER, &self.config.api_key)
    }
}

#[async_trait]
impl PopulationProvider for ResasClient {
    async fn prefectures(&self) -> Result<Vec<Prefecture>, ApiError> {
        let url = self.config.prefectures_url();
        log::debug!("Fetching prefecture list from {url}");

        let body: PrefecturesResponse = http::send_json(self.get(&url)).await?;

        log::info!("Loaded {} prefectures", body.result.len());
        Ok(body.result)
    }

    async fn composition(&self, code: PrefCode) -> Result<CompositionResponse, ApiError> {
        let url = self.config.composition_url();
        log::debug!("Fetching population composition for prefCode={code}");

        let request = self.get(&url).query(&[("prefCode", code)]);
        let body: CompositionResponse = http::send_json(request).await?;

        if body.result.data.is_empty() {
            return Err(ApiError::Payload {
                message: format!("composition for prefCode={code} has no category buckets"),
            });
        }

        Ok(body)
    }
}
