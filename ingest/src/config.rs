use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Shared ingestion secret must not be empty")]
    EmptySharedSecret,

    #[error("Positioning provider API key must not be empty")]
    EmptyPositioningKey,

    #[error("Store API key must not be empty")]
    EmptyStoreKey,
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Ingestion service configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for inbound uplinks
    #[serde(default)]
    pub listener: Listener,
    /// Shared secret devices sign uplink bodies with
    pub shared_secret: String,
    /// Network positioning provider
    pub positioning: positioning::config::Config,
    /// Timeseries store
    pub store: store::config::Config,
}

impl Config {
    /// Validates the service configuration. A missing secret or key is a
    /// fatal startup condition, never a per-request failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;

        if self.shared_secret.is_empty() {
            return Err(ValidationError::EmptySharedSecret);
        }
        if self.positioning.api_key.is_empty() {
            return Err(ValidationError::EmptyPositioningKey);
        }
        if self.store.api_key.is_empty() {
            return Err(ValidationError::EmptyStoreKey);
        }

        Ok(())
    }
}
