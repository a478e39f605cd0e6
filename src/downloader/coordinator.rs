//! Run coordination for one date
//!
//! A run validates the date, prepares `{base}/{date}`, starts the
//! [`WorkerPool`] on an unbounded channel, and paginates the photos API into
//! that channel. Once pagination ends the sender is dropped, the pool drains,
//! and the two outcomes are merged into one result.
//!
//! A fatal pagination error, or a shutdown request from the caller, cancels
//! the run's outstanding downloads before the error is returned.

use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::date::{DateError, DateKey};
use crate::downloader::config::DEFAULT_DATA_DIR;
use crate::downloader::image::ImageDownloader;
use crate::downloader::pool::{PoolReport, WorkerPool};
use crate::downloader::DownloadFailures;
use crate::fetcher::api_config::ApiConfig;
use crate::fetcher::shared_resources::global_http_client;
use crate::fetcher::{FetcherError, PageSource, Paginator, PhotoApiClient};
use crate::output::{prepare_date_directory, OutputError};
use crate::shutdown::{self, SharedShutdown, ShutdownCoordinator};

/// Errors that end a run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// No date argument was given
    #[error("missing date parameter (e.g. rover-photo-downloader 2012-08-03)")]
    MissingDate,

    /// Date argument is not a valid `YYYY-M-D` date
    #[error(transparent)]
    InvalidDate(#[from] DateError),

    /// Destination directory could not be prepared
    #[error(transparent)]
    Directory(#[from] OutputError),

    /// Pagination failed (transport, decode, or API-reported error)
    #[error(transparent)]
    Pagination(#[from] FetcherError),

    /// One or more images could not be saved
    #[error("{} of {discovered} images failed to download: {failures}", .failures.len())]
    Downloads {
        /// References discovered by pagination
        discovered: usize,
        /// Images actually written
        downloaded: usize,
        /// Every failed image
        failures: DownloadFailures,
    },

    /// Interrupted by a shutdown request
    #[error("run cancelled")]
    Cancelled,

    /// Pool task itself did not complete
    #[error("download pool failed: {0}")]
    Pool(String),
}

impl RunError {
    /// References discovered before the run failed
    ///
    /// Zero for every error except [`RunError::Downloads`].
    pub fn discovered(&self) -> usize {
        match self {
            RunError::Downloads { discovered, .. } => *discovered,
            _ => 0,
        }
    }

    /// Images written before the run failed
    pub fn downloaded(&self) -> usize {
        match self {
            RunError::Downloads { downloaded, .. } => *downloaded,
            _ => 0,
        }
    }

    /// Per-image failures, if that is why the run failed
    pub fn failures(&self) -> Option<&DownloadFailures> {
        match self {
            RunError::Downloads { failures, .. } => Some(failures),
            _ => None,
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Date that was downloaded
    pub date: DateKey,
    /// Directory the images were written to
    pub directory: PathBuf,
    /// References discovered by pagination
    pub discovered: usize,
    /// Images written (equal to `discovered` on success)
    pub downloaded: usize,
    /// Total bytes written
    pub bytes_written: u64,
}

/// Inputs for a run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Base directory; images go to `{base_dir}/{date}`
    pub base_dir: PathBuf,
    /// Photos API endpoint and key
    pub api: ApiConfig,
    /// Download concurrency cap (`None` for one task per image, uncapped)
    pub max_concurrent_downloads: Option<usize>,
}

impl RunConfig {
    /// Create a configuration with unbounded download concurrency
    pub fn new(base_dir: impl Into<PathBuf>, api: ApiConfig) -> Self {
        Self {
            base_dir: base_dir.into(),
            api,
            max_concurrent_downloads: None,
        }
    }

    /// Set the download concurrency cap
    pub fn with_max_concurrent_downloads(mut self, max: Option<usize>) -> Self {
        self.max_concurrent_downloads = max;
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR, ApiConfig::default())
    }
}

/// Performs complete runs: paginate, download, merge
pub struct RunCoordinator {
    config: RunConfig,
    client: Arc<Client>,
    shutdown: Option<SharedShutdown>,
}

impl RunCoordinator {
    /// Create a coordinator using the shared HTTP client
    ///
    /// Picks up the global shutdown handle if one is registered.
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            client: global_http_client(),
            shutdown: shutdown::get_global_shutdown(),
        }
    }

    /// Use a specific HTTP client
    pub fn with_http_client(mut self, client: Arc<Client>) -> Self {
        self.client = client;
        self
    }

    /// Attach a shared shutdown handle for graceful cancellation.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Download every image for `date_arg` from the configured photos API
    ///
    /// # Errors
    /// See [`RunError`]. Argument, date and directory errors are returned
    /// before any HTTP request is made.
    pub async fn run(&self, date_arg: Option<&str>) -> Result<RunReport, RunError> {
        let source = PhotoApiClient::new(Arc::clone(&self.client), self.config.api.clone());
        self.run_with_source(&source, date_arg).await
    }

    /// Same as [`run`](Self::run) but paginating `source`
    pub async fn run_with_source(
        &self,
        source: &dyn PageSource,
        date_arg: Option<&str>,
    ) -> Result<RunReport, RunError> {
        let date_arg = date_arg.ok_or(RunError::MissingDate)?;
        let date = DateKey::parse(date_arg)?;
        let directory = prepare_date_directory(&self.config.base_dir, &date)?;

        info!(
            "Downloading photos for {} from {} into {}",
            date,
            source.endpoint(),
            directory.display()
        );

        // Run-scoped cancellation, fed by the caller's handle if there is one.
        let cancel = ShutdownCoordinator::shared();
        let forwarder = self
            .shutdown
            .as_ref()
            .map(|outer| outer.forward_to(Arc::clone(&cancel)));

        let result = self.pipeline(source, date, &directory, &cancel).await;

        if let Some(forwarder) = forwarder {
            forwarder.abort();
        }

        result
    }

    async fn pipeline(
        &self,
        source: &dyn PageSource,
        date: DateKey,
        directory: &Path,
        cancel: &SharedShutdown,
    ) -> Result<RunReport, RunError> {
        let (sender, receiver) = mpsc::unbounded_channel();

        let pool = WorkerPool::new(ImageDownloader::new(Arc::clone(&self.client), directory))
            .with_max_concurrent(self.config.max_concurrent_downloads)
            .with_shutdown(Arc::clone(cancel));
        let pool_handle = tokio::spawn(pool.run(receiver));

        let paginated = tokio::select! {
            result = Paginator::new(source, date).run(sender) => result.map_err(RunError::from),
            _ = cancel.wait_for_shutdown() => Err(RunError::Cancelled),
        };

        let discovered = match paginated {
            Ok(count) => count,
            Err(e) => {
                warn!("Pagination stopped: {}; cancelling outstanding downloads", e);
                cancel.request_shutdown();
                match pool_handle.await {
                    Ok(report) => {
                        let cancelled = report.cancelled();
                        warn!(
                            "Run aborted after {} references: {} saved, {} cancelled, {} failed",
                            report.total(),
                            report.succeeded,
                            cancelled,
                            report.failures.len() - cancelled
                        );
                    }
                    Err(join_error) => {
                        warn!("Download pool did not complete: {}", join_error);
                    }
                }
                return Err(e);
            }
        };

        info!("Discovered {} images for {}", discovered, date);

        let report: PoolReport = pool_handle
            .await
            .map_err(|e| RunError::Pool(e.to_string()))?;

        if cancel.is_shutdown_requested() && !report.is_success() {
            return Err(RunError::Cancelled);
        }

        if !report.is_success() {
            return Err(RunError::Downloads {
                discovered,
                downloaded: report.succeeded,
                failures: report.failures,
            });
        }

        Ok(RunReport {
            date,
            directory: directory.to_path_buf(),
            discovered,
            downloaded: report.succeeded,
            bytes_written: report.bytes_written,
        })
    }
}
