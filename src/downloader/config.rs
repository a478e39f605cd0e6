//! Download configuration constants

/// HTTP connect timeout (seconds) - time to establish TCP connection
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout (seconds) - overall time for one page or one image.
/// Full-size rover images are a few MB at most; 120 seconds leaves room for
/// slow links without letting a stalled host hold a task forever.
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Upper bound accepted for `--concurrency`
pub const MAX_CONCURRENCY: usize = 256;

/// Default base directory for date directories
pub const DEFAULT_DATA_DIR: &str = ".";
