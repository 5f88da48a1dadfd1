use serde::Deserialize;
use url::Url;

fn default_timeout_secs() -> u64 {
    10
}

/// Network positioning provider settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Locate endpoint, e.g. "https://positioning.example.com/v2/locate".
    ///
    /// Note: Uses the `url::Url` type for compile-time URL validation.
    /// Invalid URLs will be rejected during config deserialization.
    pub endpoint: Url,
    /// Provider API key, sent as the `apiKey` query parameter.
    pub api_key: String,
    /// Whole-request timeout for one locate call, including the response body.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}
