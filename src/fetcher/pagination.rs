//! Page-number pagination over the photos API
//!
//! Requests page 1, 2, 3, ... for a fixed date and pushes every photo's image
//! reference into the download stream as soon as its page is decoded.
//!
//! Termination:
//! - An empty `photos` list ends pagination normally
//! - An `error` object on any page aborts before anything from that page is
//!   emitted
//! - A transport or decode failure aborts immediately
//!
//! The stream sender is consumed by [`Paginator::run`], so it is dropped (and
//! the stream closed) on every return path.

use crate::date::DateKey;
use crate::fetcher::{FetcherError, FetcherResult, PageSource};
use crate::ImageReference;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Maximum number of pages requested before giving up
pub const MAX_PAGES: u32 = 10_000;

/// Walks every page of photos for one date
pub struct Paginator<'a> {
    source: &'a dyn PageSource,
    date: DateKey,
    max_pages: u32,
}

impl<'a> Paginator<'a> {
    /// Create a paginator over `source` for `date`
    pub fn new(source: &'a dyn PageSource, date: DateKey) -> Self {
        Self {
            source,
            date,
            max_pages: MAX_PAGES,
        }
    }

    /// Override the page limit
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Paginate until an empty page, emitting references into `sink`
    ///
    /// # Returns
    /// Number of references emitted
    ///
    /// # Errors
    /// Returns the first fetch, decode or API error, or
    /// `PageLimitExceeded` if no empty page arrives within the page limit, or
    /// `StreamClosed` if the consumer went away.
    pub async fn run(self, sink: UnboundedSender<ImageReference>) -> FetcherResult<usize> {
        let mut page = 1u32;
        let mut count = 0usize;

        loop {
            if page > self.max_pages {
                return Err(FetcherError::PageLimitExceeded(format!(
                    "no empty page within {} pages for {} ({} references emitted)",
                    self.max_pages, self.date, count
                )));
            }

            debug!("Fetching photos page {} for {}", page, self.date);

            let references = self
                .source
                .fetch_page(&self.date, page)
                .await?
                .into_references()?;

            if references.is_empty() {
                debug!(
                    "Empty page received at page {}. Total references emitted: {}",
                    page, count
                );
                break;
            }

            debug!("Received {} photos in page {}", references.len(), page);

            for reference in references {
                sink.send(reference).map_err(|e| {
                    FetcherError::StreamClosed(format!("download pool dropped {}", e.0))
                })?;
                count += 1;
            }

            page += 1;
        }

        debug!(
            "Pagination completed after {} pages. Total references: {}",
            page - 1,
            count
        );

        Ok(count)
    }
}
