//! Photos API configuration
//!
//! The endpoint and credential are passed explicitly into every run. The
//! defaults below are what the CLI falls back to when neither a flag nor an
//! environment variable provides a value.

/// Curiosity rover photos endpoint
pub const DEFAULT_API_URL: &str = "https://api.nasa.gov/mars-photos/api/v1/rovers/curiosity/photos";

/// Public, heavily rate-limited demo key
pub const DEFAULT_API_KEY: &str = "DEMO_KEY";

/// Environment variable overriding the endpoint
pub const API_URL_ENV: &str = "ROVER_API_URL";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ROVER_API_KEY";

/// Endpoint and credential for the photos API
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Full URL of the photos endpoint
    pub base_url: String,

    /// Static credential sent as `api_key`
    pub api_key: String,
}

impl ApiConfig {
    /// Create a configuration
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_API_KEY)
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
