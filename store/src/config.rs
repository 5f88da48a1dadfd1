use serde::Deserialize;
use url::Url;

fn default_timeout_secs() -> u64 {
    10
}

/// Timeseries store connection settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the store, e.g. "https://project.example.co".
    pub url: Url,
    /// Service API key, sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Whole-request timeout for one insert, including the response body.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}
