//! HTTP surface of the ingestion service.
//!
//! One route does the work: `POST /ingest`. Preflight and health are
//! answered without signature checking; every response carries the
//! permissive CORS origin header the dashboard expects.

use crate::digest;
use crate::envelope;
use crate::errors::IngestError;
use crate::metrics_defs;
use crate::resolve;
use crate::signature;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use positioning::client::PositionProvider;
use positioning::types::PositionFix;
use serde::Serialize;
use shared::metrics::Metrics;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use store::client::{LocationData, SensorStore};

/// Read-only per-process state. Requests share nothing mutable; each one
/// runs the pipeline to completion independently.
pub struct AppState {
    pub shared_secret: String,
    pub provider: Arc<dyn PositionProvider>,
    pub store: SensorStore,
    pub metrics: Metrics,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ingest", post(ingest).options(preflight))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub id: i64,
    pub created_at: String,
    pub devid: String,
    pub fix: PositionFix,
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, cors_headers(), Json(self)).into_response()
    }
}

#[derive(Serialize)]
struct ApiErrorResponse {
    ok: bool,
    error: String,
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorResponse {
            ok: false,
            error: self.to_string(),
        });
        (self.status(), cors_headers(), body).into_response()
    }
}

fn cors_headers() -> [(header::HeaderName, &'static str); 1] {
    [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")]
}

/// CORS preflight. Answered without signature checking.
async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "content-type, x-signature",
            ),
        ],
    )
        .into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Response {
    (
        StatusCode::OK,
        cors_headers(),
        Json(HealthResponse { status: "healthy" }),
    )
        .into_response()
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match process_uplink(&state, &headers, &body).await {
        Ok(response) => {
            tracing::info!(
                devid = %response.devid,
                source = response.fix.source.as_str(),
                id = response.id,
                "uplink accepted"
            );
            state.metrics.incr(
                metrics_defs::UPLINKS_ACCEPTED.name,
                &[("source", response.fix.source.as_str())],
            );
            response.into_response()
        }
        Err(error) => {
            tracing::warn!(stage = error.stage(), %error, "uplink rejected");
            state
                .metrics
                .incr(metrics_defs::UPLINKS_REJECTED.name, &[("stage", error.stage())]);
            error.into_response()
        }
    }
}

/// The ingestion pipeline: authenticate, parse, normalize, resolve,
/// persist. The signature check runs against the raw bytes before the
/// body is parsed or acted upon.
async fn process_uplink(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<IngestResponse, IngestError> {
    let provided = headers
        .get(signature::SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    signature::verify(&state.shared_secret, body, provided)?;

    let payload: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| IngestError::MalformedJson(e.to_string()))?;
    let envelope = envelope::normalize(&payload)?;

    let resolve_started = Instant::now();
    let fix = resolve::resolve_position(&envelope, state.provider.as_ref())
        .await
        .inspect_err(|e| {
            if let resolve::ResolveError::Provider(e) = e {
                tracing::error!(devid = %envelope.devid, error = %e, "positioning failed");
            }
        })?;
    state.metrics.timing(
        metrics_defs::RESOLVE_DURATION.name,
        resolve_started.elapsed().as_millis() as u64,
        &[("source", fix.source.as_str())],
    );

    let inputs_hash = digest::inputs_digest(&envelope);
    let ts = envelope.timestamp.unwrap_or_else(unix_now);
    let data = LocationData::new(&fix, inputs_hash, ts);

    let store_started = Instant::now();
    let row = state
        .store
        .insert_location(&envelope.devid, envelope.uplink_count, &data)
        .await
        .inspect_err(|e| tracing::error!(devid = %envelope.devid, error = %e, "store insert failed"))?;
    state.metrics.timing(
        metrics_defs::STORE_DURATION.name,
        store_started.elapsed().as_millis() as u64,
        &[],
    );

    Ok(IngestResponse {
        ok: true,
        id: row.id,
        created_at: row.created_at,
        devid: envelope.devid,
        fix,
    })
}

fn unix_now() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        Err(_) => 0,
    }
}
