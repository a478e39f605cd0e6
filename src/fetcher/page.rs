//! Photos API response model
//!
//! A page is a JSON object with a `photos` array and an optional `error`
//! object. Everything else in the payload (camera, rover, sol) is ignored.

use crate::fetcher::{FetcherError, FetcherResult};
use crate::ImageReference;
use serde::{Deserialize, Serialize};

/// One photo record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// URL of the full-size image
    pub img_src: String,
}

/// Error object reported by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable cause
    #[serde(default)]
    pub message: String,
}

/// Decoded page of photo metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Photo records, in API order
    #[serde(default)]
    pub photos: Vec<Photo>,

    /// Present when the request failed upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl PageResult {
    /// Page holding the given image URLs
    pub fn with_photos<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            photos: urls
                .into_iter()
                .map(|url| Photo { img_src: url.into() })
                .collect(),
            error: None,
        }
    }

    /// Page carrying an upstream error
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            photos: Vec::new(),
            error: Some(ApiErrorBody {
                message: message.into(),
            }),
        }
    }

    /// Decode a raw response body
    ///
    /// # Errors
    /// Returns FetcherError::ParseError if the body is not a page object
    pub fn from_slice(body: &[u8]) -> FetcherResult<Self> {
        serde_json::from_slice(body).map_err(|e| FetcherError::ParseError(e.to_string()))
    }

    /// True when this page ends pagination
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Image references in record order
    ///
    /// # Errors
    /// Returns FetcherError::ApiError if the page carries an error object, so
    /// nothing from a failed page is ever emitted
    pub fn into_references(self) -> FetcherResult<Vec<ImageReference>> {
        if let Some(error) = self.error {
            return Err(FetcherError::ApiError(error.message));
        }
        Ok(self
            .photos
            .into_iter()
            .map(|photo| ImageReference::new(photo.img_src))
            .collect())
    }
}
