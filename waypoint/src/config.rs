use serde::Deserialize;
use std::fs::File;

#[derive(Debug, Deserialize)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub sentry_dsn: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
    pub ingest: ingest::config::Config,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}
