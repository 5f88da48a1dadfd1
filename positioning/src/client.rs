use crate::config::Config;
use crate::fields;
use crate::types::{CellObservation, WifiObservation};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// A network-derived position estimate returned by the provider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedLocation {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("positioning request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("positioning provider returned status {0}")]
    UnexpectedStatus(u16),

    #[error("positioning response has no usable location: {0}")]
    MalformedResponse(String),
}

/// Resolves a position from network observations.
///
/// The ingestion path holds this as a trait object so the resolver can be
/// exercised in tests with a counting stub instead of a network call.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn locate(
        &self,
        wlan: &[WifiObservation],
        cell: &[CellObservation],
    ) -> Result<ResolvedLocation, ClientError>;
}

/// Wire shape for one Wi-Fi access point entry in the locate request.
#[derive(Serialize)]
struct WlanEntry<'a> {
    mac: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rssi: Option<i64>,
}

/// Wire shape for one cell tower entry in the locate request.
#[derive(Serialize)]
struct CellEntry {
    mcc: u16,
    mnc: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    lac: Option<u32>,
    cid: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    rssi: Option<i64>,
}

#[derive(Serialize)]
struct LocateRequest<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    wlan: Vec<WlanEntry<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cell: Vec<CellEntry>,
}

/// Client for a HERE-style Wi-Fi/cell geolocation service.
pub struct HereClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl HereClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl PositionProvider for HereClient {
    /// Issue one locate call. No retry: a failure fails the whole uplink
    /// and the device/gateway layer retries the uplink as a unit.
    async fn locate(
        &self,
        wlan: &[WifiObservation],
        cell: &[CellObservation],
    ) -> Result<ResolvedLocation, ClientError> {
        let body = LocateRequest {
            wlan: wlan
                .iter()
                .map(|w| WlanEntry {
                    mac: &w.mac,
                    rssi: w.signal_strength.map(|s| s.round() as i64),
                })
                .collect(),
            cell: cell
                .iter()
                .map(|c| CellEntry {
                    mcc: c.mcc,
                    mnc: c.mnc,
                    lac: c.lac,
                    cid: c.cid,
                    rssi: c.signal_strength.map(|s| s.round() as i64),
                })
                .collect(),
        };

        tracing::debug!(
            wlan = body.wlan.len(),
            cell = body.cell.len(),
            "requesting network position"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("apiKey", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus(status.as_u16()));
        }

        let payload = response.json::<Value>().await?;
        extract_location(&payload)
            .ok_or_else(|| ClientError::MalformedResponse(truncate(&payload.to_string(), 256)))
    }
}

const LOCATION_KEYS: &[&str] = &["location", "position"];
const LAT_KEYS: &[&str] = &["lat", "latitude"];
const LNG_KEYS: &[&str] = &["lng", "lon", "longitude"];
const ACCURACY_KEYS: &[&str] = &["accuracy", "hpe", "score"];

/// Extract a location from a provider response. The location object may be
/// nested under `location`/`position` or be the top-level body; a response
/// from which lat/lng cannot be extracted yields None.
fn extract_location(body: &Value) -> Option<ResolvedLocation> {
    let root = body.as_object()?;
    let obj = fields::first(root, LOCATION_KEYS)
        .and_then(Value::as_object)
        .unwrap_or(root);

    let lat = fields::first_f64(obj, LAT_KEYS)?;
    let lng = fields::first_f64(obj, LNG_KEYS)?;
    let accuracy = fields::first_f64(obj, ACCURACY_KEYS);

    Some(ResolvedLocation { lat, lng, accuracy })
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> HereClient {
        let config = Config {
            endpoint: format!("{}/v2/locate", server.uri()).parse().unwrap(),
            api_key: "test-key".into(),
            timeout_secs: 5,
        };
        HereClient::new(&config).unwrap()
    }

    fn wifi(mac: &str, signal: Option<f64>) -> WifiObservation {
        WifiObservation {
            mac: mac.into(),
            ssid: None,
            signal_strength: signal,
        }
    }

    fn cell() -> CellObservation {
        CellObservation {
            mcc: 238,
            mnc: 1,
            cid: 31431,
            lac: Some(420),
            signal_strength: Some(-81.0),
            radio_type: Some("lte".into()),
        }
    }

    #[tokio::test]
    async fn test_locate_sends_observations_and_api_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/locate"))
            .and(query_param("apiKey", "test-key"))
            .and(body_partial_json(json!({
                "wlan": [{"mac": "aa:bb:cc:dd:ee:ff", "rssi": -45}],
                "cell": [{"mcc": 238, "mnc": 1, "lac": 420, "cid": 31431, "rssi": -81}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "location": {"lat": 55.67, "lng": 12.56, "accuracy": 30.0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let resolved = client
            .locate(&[wifi("aa:bb:cc:dd:ee:ff", Some(-45.0))], &[cell()])
            .await
            .unwrap();

        assert_eq!(resolved.lat, 55.67);
        assert_eq!(resolved.lng, 12.56);
        assert_eq!(resolved.accuracy, Some(30.0));
    }

    #[tokio::test]
    async fn test_locate_accepts_position_alias_and_hpe() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/locate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "position": {"latitude": 1.0, "longitude": 2.0, "hpe": 120.5}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let resolved = client.locate(&[wifi("aa:bb:cc:dd:ee:ff", None)], &[]).await.unwrap();

        assert_eq!(resolved.lat, 1.0);
        assert_eq!(resolved.lng, 2.0);
        assert_eq!(resolved.accuracy, Some(120.5));
    }

    #[tokio::test]
    async fn test_locate_accepts_top_level_location() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/locate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"lat": -33.86, "lon": 151.2, "score": 55.0})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let resolved = client.locate(&[], &[cell()]).await.unwrap();

        assert_eq!(resolved.lat, -33.86);
        assert_eq!(resolved.lng, 151.2);
        assert_eq!(resolved.accuracy, Some(55.0));
    }

    #[tokio::test]
    async fn test_locate_non_success_status_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/locate"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .locate(&[wifi("aa:bb:cc:dd:ee:ff", None)], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::UnexpectedStatus(503)));
    }

    #[tokio::test]
    async fn test_locate_200_without_location_is_an_error() {
        // A 2xx that carries no extractable lat/lng is a resolver failure,
        // never silently treated as a fix.
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/locate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .locate(&[wifi("aa:bb:cc:dd:ee:ff", None)], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_location_requires_both_coordinates() {
        assert!(extract_location(&json!({"location": {"lat": 1.0}})).is_none());
        assert!(extract_location(&json!({"location": {"lng": 2.0}})).is_none());
        assert!(extract_location(&json!([1, 2])).is_none());
    }
}
