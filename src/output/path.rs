//! Destination paths for downloaded images
//!
//! Layout: `{base}/{YYYY-M-D}/{file name from URL tail}`
//!
//! # Usage Example
//!
//! ```rust
//! use rover_photo_downloader::output::path::{date_directory, destination_path};
//! use rover_photo_downloader::{DateKey, ImageReference};
//! use std::path::Path;
//!
//! let date = DateKey::parse("2020-8-6").unwrap();
//! let dir = date_directory(Path::new("photos"), &date);
//! let reference = ImageReference::new("https://foo.com/image.jpg");
//!
//! let path = destination_path(&dir, &reference).unwrap();
//! assert_eq!(path, Path::new("photos/2020-8-6/image.jpg"));
//! ```

use super::{OutputError, OutputResult};
use crate::date::DateKey;
use crate::ImageReference;
use std::path::{Path, PathBuf};

/// Directory holding every image for `date`
///
/// An empty base path yields a directory relative to the working directory.
pub fn date_directory(base: &Path, date: &DateKey) -> PathBuf {
    base.join(date.to_string())
}

/// File path an image reference is saved to inside `directory`
///
/// # Errors
///
/// Returns [`OutputError::InvalidFileName`] if the reference has no usable
/// trailing segment.
pub fn destination_path(directory: &Path, reference: &ImageReference) -> OutputResult<PathBuf> {
    let file_name = file_name_for(reference)?;
    Ok(directory.join(file_name))
}

/// File name derived from the content after the final `/` of the reference
///
/// # Security
///
/// `.` and `..` are rejected and backslashes are replaced with `_`, so a
/// crafted URL cannot escape the date directory.
pub fn file_name_for(reference: &ImageReference) -> OutputResult<String> {
    let tail = reference
        .file_name()
        .ok_or_else(|| OutputError::InvalidFileName(reference.to_string()))?;

    if tail == "." || tail == ".." {
        return Err(OutputError::InvalidFileName(reference.to_string()));
    }

    Ok(tail.replace('\\', "_"))
}
