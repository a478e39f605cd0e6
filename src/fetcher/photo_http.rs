//! Photos API HTTP client
//!
//! Issues one GET per page with `api_key`, `earth_date` and `page` query
//! parameters and decodes the body into a [`PageResult`]. There is no retry:
//! any transport or decode failure is returned to the paginator as is.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

use crate::date::DateKey;
use crate::fetcher::api_config::ApiConfig;
use crate::fetcher::shared_resources::global_http_client;
use crate::fetcher::{FetcherError, FetcherResult, PageResult, PageSource};

/// HTTP client for the rover photos endpoint
pub struct PhotoApiClient {
    client: Arc<Client>,
    config: ApiConfig,
}

impl PhotoApiClient {
    /// Create new client
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client (Arc for cheap cloning)
    /// * `config` - Endpoint and API key
    pub fn new(client: Arc<Client>, config: ApiConfig) -> Self {
        Self { client, config }
    }

    /// Create a client on top of the process-wide HTTP client
    pub fn with_global_client(config: ApiConfig) -> Self {
        Self::new(global_http_client(), config)
    }

    /// Query parameters for one page request
    fn page_params(&self, date: &DateKey, page: u32) -> [(&'static str, String); 3] {
        [
            ("api_key", self.config.api_key.clone()),
            ("earth_date", date.to_string()),
            ("page", page.to_string()),
        ]
    }
}

#[async_trait]
impl PageSource for PhotoApiClient {
    async fn fetch_page(&self, date: &DateKey, page: u32) -> FetcherResult<PageResult> {
        let params = self.page_params(date, page);

        debug!(
            "Making GET request to: {} for {} page {}",
            self.config.base_url, date, page
        );

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| FetcherError::NetworkError(format!("error on get: {e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetcherError::NetworkError(format!("error reading response body: {e}")))?;

        if !status.is_success() {
            // The API reports bad keys and malformed dates as an error object
            // on a 4xx response; surface that message when it is there.
            if let Ok(decoded) = PageResult::from_slice(&body) {
                if decoded.error.is_some() {
                    return Ok(decoded);
                }
            }
            let text = String::from_utf8_lossy(&body);
            return Err(FetcherError::HttpError(format!(
                "{} returned {}: {}",
                self.config.base_url,
                status,
                text.trim()
            )));
        }

        PageResult::from_slice(&body)
    }

    fn endpoint(&self) -> &str {
        &self.config.base_url
    }
}
