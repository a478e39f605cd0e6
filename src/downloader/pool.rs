//! Concurrent download pool
//!
//! Consumes image references from an unbounded channel and spawns one task
//! per reference on a [`JoinSet`]. The pool returns only after the channel is
//! closed and every spawned task has finished, so its report always accounts
//! for every reference it received.
//!
//! Concurrency is unbounded unless a cap is set, in which case each task
//! waits for a semaphore permit before fetching.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::downloader::image::ImageDownloader;
use crate::downloader::{DownloadError, DownloadFailure, DownloadFailures, DownloadOutcome};
use crate::shutdown::{ShutdownCoordinator, SharedShutdown};
use crate::ImageReference;

/// Outcome of a drained pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Images written to disk
    pub succeeded: usize,
    /// Total bytes written
    pub bytes_written: u64,
    /// Images that could not be saved
    pub failures: DownloadFailures,
}

impl PoolReport {
    /// Number of references the pool processed
    pub fn total(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    /// Failures caused by a shutdown request rather than the download itself
    pub fn cancelled(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.cause == DownloadError::Cancelled)
            .count()
    }

    /// True when no image failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Saved { bytes, .. } => {
                self.succeeded += 1;
                self.bytes_written += bytes;
            }
            DownloadOutcome::Failed(failure) => {
                if failure.cause != DownloadError::Cancelled {
                    warn!("Download failed: {}", failure);
                }
                self.failures.push(failure);
            }
        }
    }
}

/// Fans references out to concurrent download tasks
pub struct WorkerPool {
    downloader: Arc<ImageDownloader>,
    limiter: Option<Arc<Semaphore>>,
    shutdown: SharedShutdown,
}

impl WorkerPool {
    /// Create an unbounded pool around `downloader`
    pub fn new(downloader: ImageDownloader) -> Self {
        Self {
            downloader: Arc::new(downloader),
            limiter: None,
            shutdown: ShutdownCoordinator::shared(),
        }
    }

    /// Cap the number of simultaneous downloads (`None` for unbounded)
    ///
    /// The cap is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn with_max_concurrent(mut self, max_concurrent: Option<usize>) -> Self {
        self.limiter = max_concurrent
            .map(|n| Arc::new(Semaphore::new(n.clamp(1, Semaphore::MAX_PERMITS))));
        self
    }

    /// Attach a shutdown handle; requesting it cancels outstanding downloads
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Download every reference until the channel is closed and drained
    ///
    /// Returns once all spawned tasks have finished.
    pub async fn run(self, mut references: UnboundedReceiver<ImageReference>) -> PoolReport {
        let mut tasks: JoinSet<DownloadOutcome> = JoinSet::new();
        let mut report = PoolReport::default();
        let mut dispatched = 0usize;

        loop {
            tokio::select! {
                received = references.recv() => match received {
                    Some(reference) => {
                        dispatched += 1;
                        self.spawn(&mut tasks, reference);
                    }
                    None => break,
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    report.record(flatten(joined));
                }
            }
        }

        debug!(
            "Reference stream closed after {} references; waiting for {} downloads",
            dispatched,
            tasks.len()
        );

        while let Some(joined) = tasks.join_next().await {
            report.record(flatten(joined));
        }

        info!(
            "Download pool drained: {} saved, {} failed",
            report.succeeded,
            report.failures.len()
        );

        report
    }

    fn spawn(&self, tasks: &mut JoinSet<DownloadOutcome>, reference: ImageReference) {
        let downloader = Arc::clone(&self.downloader);
        let limiter = self.limiter.clone();
        let shutdown = Arc::clone(&self.shutdown);

        tasks.spawn(async move {
            let work = {
                let reference = reference.clone();
                async move {
                    let _permit = match limiter {
                        Some(limiter) => match limiter.acquire_owned().await {
                            Ok(permit) => Some(permit),
                            Err(e) => {
                                return DownloadOutcome::Failed(DownloadFailure::new(
                                    reference,
                                    DownloadError::TaskFailed(e.to_string()),
                                ))
                            }
                        },
                        None => None,
                    };
                    downloader.download(reference).await
                }
            };

            tokio::select! {
                biased;
                _ = shutdown.wait_for_shutdown() => {
                    DownloadOutcome::Failed(DownloadFailure::new(reference, DownloadError::Cancelled))
                }
                outcome = AssertUnwindSafe(work).catch_unwind() => match outcome {
                    Ok(outcome) => outcome,
                    Err(_) => DownloadOutcome::Failed(DownloadFailure::new(
                        reference,
                        DownloadError::TaskFailed("download task panicked".to_string()),
                    )),
                },
            }
        });
    }
}

/// Turn a join result into an outcome
///
/// Tasks catch their own panics and never get aborted, so a join error only
/// happens while the runtime itself is shutting down.
fn flatten(joined: Result<DownloadOutcome, JoinError>) -> DownloadOutcome {
    joined.unwrap_or_else(|e| {
        error!("Download task did not complete: {}", e);
        DownloadOutcome::Failed(DownloadFailure::new(
            ImageReference::new(""),
            DownloadError::TaskFailed(e.to_string()),
        ))
    })
}
