//! Photo metadata fetchers

use crate::date::DateKey;
use async_trait::async_trait;

pub mod api_config;
pub mod page;
pub mod pagination;
pub mod photo_http;
pub mod shared_resources;

pub use page::{PageResult, Photo};
pub use pagination::Paginator;
pub use photo_http::PhotoApiClient;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Response body could not be decoded
    #[error("error decoding response: {0}")]
    ParseError(String),

    /// Error object reported by the photos API
    #[error("API error: {0}")]
    ApiError(String),

    /// Network error
    #[error("network error: {0}")]
    NetworkError(String),

    /// Pagination never reached an empty page
    #[error("pagination aborted: {0}")]
    PageLimitExceeded(String),

    /// Consumer stopped accepting references
    #[error("reference stream closed: {0}")]
    StreamClosed(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Source of photo metadata pages
///
/// The paginator drives any implementation page by page; [`PhotoApiClient`]
/// is the HTTP one.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch and decode one page of photos
    ///
    /// # Arguments
    /// * `date` - Earth date the photos were taken on
    /// * `page` - 1-based page number
    ///
    /// # Returns
    /// The decoded page, including any error object the API reported
    async fn fetch_page(&self, date: &DateKey, page: u32) -> FetcherResult<PageResult>;

    /// Get the endpoint this source reads from
    fn endpoint(&self) -> &str;
}
