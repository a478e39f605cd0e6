//! Image download pool and run coordination
//!
//! This module turns a stream of image references into files on disk and
//! drives a complete run for one date.
//!
//! # Overview
//!
//! 1. **Coordination**: [`coordinator::RunCoordinator`] validates the date,
//!    prepares the destination directory and wires the paginator to the pool
//! 2. **Fan-out**: [`pool::WorkerPool`] spawns one task per reference and
//!    waits for all of them
//! 3. **Per image**: [`image::ImageDownloader`] fetches one URL and streams
//!    the body into a file
//!
//! # Quick Start
//!
//! ```no_run
//! use rover_photo_downloader::downloader::{RunConfig, RunCoordinator};
//! use rover_photo_downloader::fetcher::api_config::ApiConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::new("./photos", ApiConfig::new(
//!     "https://api.nasa.gov/mars-photos/api/v1/rovers/curiosity/photos",
//!     "DEMO_KEY",
//! ))
//! .with_max_concurrent_downloads(Some(16));
//!
//! let report = RunCoordinator::new(config).run(Some("2015-6-3")).await?;
//! println!("{} of {} images saved", report.downloaded, report.discovered);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! A failed image never stops the others. Each failure becomes a
//! [`DownloadFailure`] (reference + cause). The pool hands the whole list back
//! once every task has finished, and any failure fails the run.

use crate::ImageReference;
use std::fmt;
use std::path::PathBuf;

pub mod config;
pub mod coordinator;
pub mod image;
pub mod pool;

pub use coordinator::{RunConfig, RunCoordinator, RunError, RunReport};
pub use image::ImageDownloader;
pub use pool::{PoolReport, WorkerPool};

/// Per-image download errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadError {
    /// Request could not be sent or the body could not be read
    #[error("error downloading image: {0}")]
    NetworkError(String),

    /// Image host answered with a non-success status
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Destination file could not be created
    #[error("error creating file {path}: {reason}")]
    CreateFile {
        /// Destination path
        path: PathBuf,
        /// Underlying IO error
        reason: String,
    },

    /// Body could not be written to the destination file
    #[error("error writing file content {path}: {reason}")]
    WriteFile {
        /// Destination path
        path: PathBuf,
        /// Underlying IO error
        reason: String,
    },

    /// No file name could be derived from the reference
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Aborted by a shutdown request
    #[error("download cancelled")]
    Cancelled,

    /// Download task panicked or was torn down
    #[error("download task failed: {0}")]
    TaskFailed(String),
}

/// A failed image: which reference and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFailure {
    /// Reference that failed
    pub reference: ImageReference,
    /// Cause of the failure
    pub cause: DownloadError,
}

impl DownloadFailure {
    /// Create a failure descriptor
    pub fn new(reference: ImageReference, cause: DownloadError) -> Self {
        Self { reference, cause }
    }
}

impl fmt::Display for DownloadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reference, self.cause)
    }
}

/// Every failure from one run, in completion order
///
/// Empty means no image failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadFailures(Vec<DownloadFailure>);

impl DownloadFailures {
    /// Empty failure set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure
    pub fn push(&mut self, failure: DownloadFailure) {
        self.0.push(failure);
    }

    /// True when no image failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed images
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the failures
    pub fn iter(&self) -> std::slice::Iter<'_, DownloadFailure> {
        self.0.iter()
    }

    /// Take the underlying list
    pub fn into_inner(self) -> Vec<DownloadFailure> {
        self.0
    }
}

impl fmt::Display for DownloadFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DownloadFailures {
    type Item = &'a DownloadFailure;
    type IntoIter = std::slice::Iter<'a, DownloadFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<DownloadFailure> for DownloadFailures {
    fn from_iter<I: IntoIterator<Item = DownloadFailure>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of one download task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Image written to disk
    Saved {
        /// Reference that was fetched
        reference: ImageReference,
        /// File the body was written to
        path: PathBuf,
        /// Number of bytes written
        bytes: u64,
    },
    /// Image could not be saved
    Failed(DownloadFailure),
}
