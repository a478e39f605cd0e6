//! # Rover Photo Downloader Library
//!
//! Downloads every image a Mars rover captured on a given Earth date. Photo
//! metadata is discovered page by page from the rover photos API, and each
//! referenced image is fetched concurrently into a directory named after the
//! date.
//!
//! ## Features
//!
//! - **Streaming discovery**: image references flow to the downloaders while
//!   later pages are still being fetched
//! - **Concurrent downloads**: one task per image, optionally capped
//! - **Failure aggregation**: a failed image never stops the others; every
//!   failure is reported together at the end of the run
//! - **Graceful shutdown**: Ctrl+C or a fatal pagination error aborts
//!   in-flight downloads
//!
//! ## Quick Start
//!
//! ```no_run
//! use rover_photo_downloader::downloader::{RunConfig, RunCoordinator};
//! use rover_photo_downloader::fetcher::api_config::ApiConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::new("./photos", ApiConfig::default());
//! let coordinator = RunCoordinator::new(config);
//!
//! let report = coordinator.run(Some("2020-8-6")).await?;
//! println!("{} images downloaded", report.downloaded);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`date`] - Earth date parsing and validation (`YYYY-M-D`)
//! - [`fetcher`] - Photo metadata API client and pagination
//! - [`downloader`] - Worker pool and run coordination
//! - [`output`] - Destination directory and file naming
//! - [`cli`] - Command-line interface

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// CLI command implementations
pub mod cli;

/// Earth date parsing and validation
pub mod date;

/// Image download pool and run coordination
pub mod downloader;

/// Photo metadata fetchers
pub mod fetcher;

/// Destination directories and file naming
pub mod output;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

// Re-export commonly used types
pub use date::DateKey;

/// URL of a single remotely hosted image
///
/// Produced by the paginator, one per photo record, and consumed exactly once
/// by the download pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    /// Wrap a URL string
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Content after the final `/` of the URL
    ///
    /// Returns `None` when that segment is empty (e.g. the URL ends in `/`).
    pub fn file_name(&self) -> Option<&str> {
        let tail = match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => self.0.as_str(),
        };
        if tail.is_empty() {
            None
        } else {
            Some(tail)
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ImageReference {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl From<&str> for ImageReference {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}
