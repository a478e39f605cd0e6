//! Earth date parsing and validation
//!
//! Implements the query date format accepted by the photos API: `YYYY-M-D`,
//! where month and day may carry a leading zero.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Calendar date identifying which photos to download
///
/// The canonical text form drops zero padding, so `2012-08-03` and `2012-8-3`
/// produce equal keys that both render as `2012-8-3`.
///
/// # Examples
///
/// ```
/// use rover_photo_downloader::date::DateKey;
///
/// let date = DateKey::parse("2020-08-06").unwrap();
/// assert_eq!(date.year(), 2020);
/// assert_eq!(date.month(), 8);
/// assert_eq!(date.day(), 6);
/// assert_eq!(date.to_string(), "2020-8-6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Parse a `YYYY-M-D` string into a DateKey
    ///
    /// The whole string must match; surrounding whitespace is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not three dash-separated numeric
    /// components (a four digit year, then one or two digit month and day), or
    /// if the components do not form a real calendar date.
    pub fn parse(input: &str) -> Result<Self, DateError> {
        let parts: Vec<&str> = input.split('-').collect();
        if parts.len() != 3 {
            return Err(DateError::InvalidFormat(input.to_string()));
        }

        let year = parse_component(parts[0], 4, 4, input)?;
        let month = parse_component(parts[1], 1, 2, input)?;
        let day = parse_component(parts[2], 1, 2, input)?;

        let date = NaiveDate::from_ymd_opt(year as i32, month, day)
            .ok_or_else(|| DateError::OutOfRange(input.to_string()))?;

        Ok(Self(date))
    }

    /// Year component
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month component (1-12)
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of month (1-31)
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Underlying chrono date
    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

fn parse_component(part: &str, min_len: usize, max_len: usize, input: &str) -> Result<u32, DateError> {
    if part.len() < min_len || part.len() > max_len || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::InvalidFormat(input.to_string()));
    }
    part.parse::<u32>()
        .map_err(|_| DateError::InvalidFormat(input.to_string()))
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year(), self.month(), self.day())
    }
}

impl FromStr for DateKey {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// Errors that can occur during date parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// Not in `YYYY-M-D` form
    #[error("date in the wrong format (YYYY-M-D): {0}")]
    InvalidFormat(String),

    /// Well-formed but not a calendar date
    #[error("date does not exist: {0}")]
    OutOfRange(String),
}
