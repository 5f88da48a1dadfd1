use crate::config::Config;
use positioning::types::{FixSource, PositionFix};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Payload stored under `data` for a `data_type = "location"` row.
#[derive(Clone, Debug, Serialize)]
pub struct LocationData {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    pub source: FixSource,
    #[serde(rename = "inputsHash")]
    pub inputs_hash: String,
    pub ts: i64,
}

impl LocationData {
    pub fn new(fix: &PositionFix, inputs_hash: String, ts: i64) -> Self {
        Self {
            lat: fix.lat,
            lng: fix.lng,
            accuracy: fix.accuracy,
            source: fix.source,
            inputs_hash,
            ts,
        }
    }
}

#[derive(Serialize)]
struct NewSensorRecord<'a> {
    devid: &'a str,
    uplink_count: Option<i64>,
    data_type: &'static str,
    data: &'a LocationData,
}

/// Row identity assigned by the store on insert.
#[derive(Clone, Debug, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    pub created_at: String,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned status {0}")]
    UnexpectedStatus(u16),

    #[error("store returned no inserted row")]
    EmptyResponse,
}

/// REST client for the `sensor_data` timeseries table.
///
/// Inserts are single atomic appends. There is no update-in-place and no
/// internal retry or buffering: on failure the whole uplink fails and the
/// device/gateway retries it later.
pub struct SensorStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SensorStore {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config.url.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Append exactly one location record for a device and return the
    /// store-assigned id and creation timestamp.
    pub async fn insert_location(
        &self,
        devid: &str,
        uplink_count: Option<i64>,
        data: &LocationData,
    ) -> Result<StoredRecord, StoreError> {
        let url = format!("{}/rest/v1/sensor_data", self.base_url);
        let record = NewSensorRecord {
            devid,
            uplink_count,
            data_type: "location",
            data,
        };

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus(status.as_u16()));
        }

        // The representation is an array of inserted rows; exactly one is
        // expected for a single insert.
        let mut rows = response.json::<Vec<StoredRecord>>().await?;
        if rows.is_empty() {
            return Err(StoreError::EmptyResponse);
        }

        tracing::debug!(devid, id = rows[0].id, "location record inserted");
        Ok(rows.remove(0))
    }
}
