//! CLI error types and conversions

use crate::downloader::RunError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Run error
    #[error("request was unsuccessful: {0}")]
    RunError(#[from] RunError),
}
