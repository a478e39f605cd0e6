//! Destination directory preparation and file naming

use crate::date::DateKey;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod path;

pub use path::{date_directory, destination_path, file_name_for};

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Destination directory could not be created
    #[error("error creating folder {path}: {reason}")]
    DirectoryError {
        /// Directory that was being created
        path: PathBuf,
        /// Underlying IO error
        reason: String,
    },

    /// Reference has no usable file name
    #[error("cannot derive a file name from {0}")]
    InvalidFileName(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Create the directory that will hold every image for `date`
///
/// Missing parents of `base` are created too. A directory that already
/// exists is reused.
///
/// # Errors
///
/// Returns [`OutputError::DirectoryError`] for any other failure, e.g. when a
/// regular file sits at the target path.
pub fn prepare_date_directory(base: &Path, date: &DateKey) -> OutputResult<PathBuf> {
    let dir = date_directory(base, date);

    match std::fs::create_dir_all(&dir) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => {}
        Err(e) => {
            return Err(OutputError::DirectoryError {
                path: dir,
                reason: e.to_string(),
            })
        }
    }

    debug!("Destination directory ready: {}", dir.display());
    Ok(dir)
}
