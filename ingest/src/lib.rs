pub mod api;
pub mod config;
pub mod digest;
pub mod envelope;
pub mod errors;
pub mod metrics_defs;
pub mod resolve;
pub mod signature;

use api::AppState;
use positioning::client::{ClientError, HereClient, PositionProvider};
use shared::metrics::Metrics;
use std::sync::Arc;
use store::client::{SensorStore, StoreError};
use tokio::net::TcpListener;

#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("positioning client setup failed: {0}")]
    Positioning(#[from] ClientError),

    #[error("store client setup failed: {0}")]
    Store(#[from] StoreError),
}

/// Run the ingestion service until the process is stopped.
pub async fn run(config: config::Config, metrics: Metrics) -> Result<(), ServeError> {
    let provider: Arc<dyn PositionProvider> = Arc::new(HereClient::new(&config.positioning)?);
    let store = SensorStore::new(&config.store)?;

    let state = Arc::new(AppState {
        shared_secret: config.shared_secret,
        provider,
        store,
        metrics,
    });

    let addr = format!("{}:{}", config.listener.host, config.listener.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "ingest service listening");

    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
