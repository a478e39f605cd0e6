//! Single image download
//!
//! Fetches one reference and streams the response body chunk by chunk into
//! `<directory>/<file name>`. An existing file with the same name is
//! overwritten. The body goes to a hidden `.part` file first, so an
//! interrupted download never leaves a truncated image behind.

use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::downloader::{DownloadError, DownloadFailure, DownloadOutcome};
use crate::output::destination_path;
use crate::ImageReference;

/// Fetches images into one destination directory
pub struct ImageDownloader {
    client: Arc<Client>,
    directory: PathBuf,
}

impl ImageDownloader {
    /// Create a downloader writing into `directory`
    ///
    /// The directory must already exist.
    pub fn new(client: Arc<Client>, directory: impl Into<PathBuf>) -> Self {
        Self {
            client,
            directory: directory.into(),
        }
    }

    /// Destination directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Download one image and describe the result
    pub async fn download(&self, reference: ImageReference) -> DownloadOutcome {
        match self.save(&reference).await {
            Ok((path, bytes)) => DownloadOutcome::Saved {
                reference,
                path,
                bytes,
            },
            Err(cause) => DownloadOutcome::Failed(DownloadFailure::new(reference, cause)),
        }
    }

    /// Fetch `reference` and write its body to disk
    ///
    /// # Returns
    /// Destination path and number of bytes written
    ///
    /// # Errors
    /// Returns the first fetch, status, create or write error
    pub async fn save(&self, reference: &ImageReference) -> Result<(PathBuf, u64), DownloadError> {
        let path = destination_path(&self.directory, reference)
            .map_err(|e| DownloadError::InvalidReference(e.to_string()))?;

        let mut response = self
            .client
            .get(reference.as_str())
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpError(format!("{status}")));
        }

        // Stream into a temp file in the same directory and rename it into
        // place once complete. Dropping the temp path (error or cancellation)
        // deletes the partial file.
        let create_error = |e: std::io::Error| DownloadError::CreateFile {
            path: path.clone(),
            reason: e.to_string(),
        };
        let (std_file, temp_path) = tempfile::Builder::new()
            .prefix(".download-")
            .suffix(".part")
            .tempfile_in(&self.directory)
            .map_err(create_error)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(std_file);

        let write_error = |e: std::io::Error| DownloadError::WriteFile {
            path: path.clone(),
            reason: e.to_string(),
        };

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DownloadError::NetworkError(e.to_string()))?
        {
            file.write_all(&chunk).await.map_err(write_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_error)?;
        drop(file);

        temp_path
            .persist(&path)
            .map_err(|e| write_error(e.error))?;

        debug!("Saved {} ({} bytes) to {}", reference, written, path.display());

        Ok((path, written))
    }
}
