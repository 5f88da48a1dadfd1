//! Uplink normalization.
//!
//! Device firmware across hardware generations disagrees on field names.
//! Each logical field has an explicit ordered list of accepted aliases,
//! resolved in one pass here, so the resolver only ever sees the canonical
//! shape.

use positioning::fields;
use positioning::types::{CellObservation, GnssFix, WifiObservation};
use serde_json::{Map, Value};

const DEVICE_ID_KEYS: &[&str] = &["devid", "deviceId", "device_id"];
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "ts"];
const UPLINK_COUNT_KEYS: &[&str] = &["uplink_count", "uplinkCount"];

const WIFI_LIST_KEYS: &[&str] = &["wifi", "wlan", "wifiAccessPoints"];
const WIFI_MAC_KEYS: &[&str] = &["mac", "macAddress", "bssid", "BSSID", "address"];
const WIFI_SSID_KEYS: &[&str] = &["ssid"];
const WIFI_SIGNAL_KEYS: &[&str] = &["signalStrength", "rssi", "signal"];

const CELL_LIST_KEYS: &[&str] = &["cells", "cell", "cellTowers"];
const CELL_MCC_KEYS: &[&str] = &["mcc", "MCC"];
const CELL_MNC_KEYS: &[&str] = &["mnc", "MNC"];
const CELL_CID_KEYS: &[&str] = &["cid", "cellId", "CID"];
const CELL_LAC_KEYS: &[&str] = &["lac", "tac", "LAC", "TAC"];
const CELL_SIGNAL_KEYS: &[&str] = &["signalStrength", "rssi"];
const CELL_RADIO_KEYS: &[&str] = &["radioType", "radio"];

const GNSS_KEYS: &[&str] = &["gnss", "gps", "location"];
const GNSS_LAT_KEYS: &[&str] = &["lat", "latitude"];
const GNSS_LNG_KEYS: &[&str] = &["lng", "lon", "longitude"];
const GNSS_ACCURACY_KEYS: &[&str] = &["accuracy", "hdop", "precision"];

/// One uplink, normalized to the canonical shape the resolver consumes.
/// Lives for the duration of a single request.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub devid: String,
    pub timestamp: Option<i64>,
    pub uplink_count: Option<i64>,
    pub wlan: Vec<WifiObservation>,
    pub cell: Vec<CellObservation>,
    pub gnss: Option<GnssFix>,
}

impl Envelope {
    pub fn has_network_observations(&self) -> bool {
        !self.wlan.is_empty() || !self.cell.is_empty()
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("missing device id")]
    MissingDeviceId,
}

/// Normalize a parsed payload.
///
/// Unusable Wi-Fi/cell entries are dropped silently, per entry. A GNSS
/// object without numeric lat and lng is treated as absent, not as an
/// error. Only a missing device id rejects the whole envelope.
pub fn normalize(payload: &Value) -> Result<Envelope, EnvelopeError> {
    let obj = payload.as_object().ok_or(EnvelopeError::NotAnObject)?;

    let devid = fields::first_str(obj, DEVICE_ID_KEYS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(EnvelopeError::MissingDeviceId)?
        .to_string();

    let wlan = list_entries(obj, WIFI_LIST_KEYS)
        .filter_map(normalize_wifi)
        .collect();
    let cell = list_entries(obj, CELL_LIST_KEYS)
        .filter_map(normalize_cell)
        .collect();
    let gnss = fields::first(obj, GNSS_KEYS)
        .and_then(Value::as_object)
        .and_then(normalize_gnss);

    Ok(Envelope {
        devid,
        timestamp: fields::first_i64(obj, TIMESTAMP_KEYS),
        uplink_count: fields::first_i64(obj, UPLINK_COUNT_KEYS),
        wlan,
        cell,
        gnss,
    })
}

fn list_entries<'a>(
    obj: &'a Map<String, Value>,
    keys: &[&str],
) -> impl Iterator<Item = &'a Value> {
    fields::first(obj, keys)
        .and_then(Value::as_array)
        .map(|entries| entries.iter())
        .into_iter()
        .flatten()
}

fn normalize_wifi(entry: &Value) -> Option<WifiObservation> {
    let obj = entry.as_object()?;
    let mac = canonical_mac(fields::first_str(obj, WIFI_MAC_KEYS)?)?;

    Some(WifiObservation {
        mac,
        ssid: fields::first_str(obj, WIFI_SSID_KEYS).map(str::to_string),
        signal_strength: fields::first_f64(obj, WIFI_SIGNAL_KEYS),
    })
}

fn normalize_cell(entry: &Value) -> Option<CellObservation> {
    let obj = entry.as_object()?;

    // mcc, mnc and cid are all required; anything else is optional.
    let mcc = u16::try_from(fields::first_u64(obj, CELL_MCC_KEYS)?).ok()?;
    let mnc = u16::try_from(fields::first_u64(obj, CELL_MNC_KEYS)?).ok()?;
    let cid = fields::first_u64(obj, CELL_CID_KEYS)?;

    Some(CellObservation {
        mcc,
        mnc,
        cid,
        lac: fields::first_u64(obj, CELL_LAC_KEYS).and_then(|v| u32::try_from(v).ok()),
        signal_strength: fields::first_f64(obj, CELL_SIGNAL_KEYS),
        radio_type: fields::first_str(obj, CELL_RADIO_KEYS).map(str::to_string),
    })
}

fn normalize_gnss(obj: &Map<String, Value>) -> Option<GnssFix> {
    let lat = fields::first_f64(obj, GNSS_LAT_KEYS)?;
    let lng = fields::first_f64(obj, GNSS_LNG_KEYS)?;

    Some(GnssFix {
        lat,
        lng,
        accuracy: fields::first_f64(obj, GNSS_ACCURACY_KEYS),
    })
}

/// Canonicalize a reported MAC: lowercase, and rewrite the bare
/// 12-hex-digit form some firmware sends to colon-separated octets.
/// Returns None for an empty value.
fn canonical_mac(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.len() == 12 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        let lower = trimmed.to_ascii_lowercase();
        let octets: Vec<&str> = (0..6).map(|i| &lower[i * 2..i * 2 + 2]).collect();
        return Some(octets.join(":"));
    }

    Some(trimmed.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_devid_aliases() {
        for key in ["devid", "deviceId", "device_id"] {
            let envelope = normalize(&json!({key: "100001"})).unwrap();
            assert_eq!(envelope.devid, "100001");
        }
    }

    #[test]
    fn test_missing_devid_rejected() {
        assert_eq!(
            normalize(&json!({"gnss": {"lat": 1.0, "lng": 2.0}})),
            Err(EnvelopeError::MissingDeviceId)
        );
        assert_eq!(
            normalize(&json!({"devid": "  "})),
            Err(EnvelopeError::MissingDeviceId)
        );
    }

    #[test]
    fn test_non_object_payload_rejected() {
        assert_eq!(normalize(&json!([1, 2, 3])), Err(EnvelopeError::NotAnObject));
        assert_eq!(normalize(&json!("devid")), Err(EnvelopeError::NotAnObject));
    }

    #[test]
    fn test_wifi_mac_aliases_and_drops() {
        let envelope = normalize(&json!({
            "devid": "100001",
            "wifi": [
                {"mac": "aa:bb:cc:dd:ee:ff", "rssi": -45},
                {"bssid": "11:22:33:44:55:66"},
                {"macAddress": "99:88:77:66:55:44", "ssid": "office"},
                {"ssid": "no-mac-here"},
                {"mac": 42},
            ],
        }))
        .unwrap();

        assert_eq!(envelope.wlan.len(), 3);
        assert_eq!(envelope.wlan[0].mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(envelope.wlan[0].signal_strength, Some(-45.0));
        assert_eq!(envelope.wlan[1].mac, "11:22:33:44:55:66");
        assert_eq!(envelope.wlan[2].ssid.as_deref(), Some("office"));
    }

    #[test]
    fn test_wifi_list_aliases() {
        for key in ["wifi", "wlan", "wifiAccessPoints"] {
            let envelope = normalize(&json!({
                "devid": "100001",
                key: [{"mac": "aa:bb:cc:dd:ee:ff"}],
            }))
            .unwrap();
            assert_eq!(envelope.wlan.len(), 1);
        }
    }

    #[test]
    fn test_mac_canonicalization() {
        let envelope = normalize(&json!({
            "devid": "100001",
            "wifi": [
                {"mac": "AABBCCDDEEFF"},
                {"mac": "AA:BB:CC:DD:EE:FF"},
                {"mac": ""},
            ],
        }))
        .unwrap();

        // Bare hex is rewritten to colon form, everything is lowercased,
        // empty MACs drop the entry.
        assert_eq!(envelope.wlan.len(), 2);
        assert_eq!(envelope.wlan[0].mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(envelope.wlan[1].mac, "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn test_cell_requires_mcc_mnc_cid() {
        let envelope = normalize(&json!({
            "devid": "100001",
            "cells": [
                {"mcc": 238, "mnc": 1, "cid": 31431},
                {"mcc": 238, "mnc": 1},
                {"mnc": 1, "cid": 31431},
                {"mcc": 238, "cid": 31431},
            ],
        }))
        .unwrap();

        assert_eq!(envelope.cell.len(), 1);
        assert_eq!(envelope.cell[0].mcc, 238);
        assert_eq!(envelope.cell[0].cid, 31431);
    }

    #[test]
    fn test_cell_uppercase_aliases() {
        let envelope = normalize(&json!({
            "devid": "100001",
            "cellTowers": [
                {"MCC": 238, "MNC": 1, "CID": 31431, "TAC": 420, "radio": "lte"},
            ],
        }))
        .unwrap();

        assert_eq!(envelope.cell.len(), 1);
        assert_eq!(envelope.cell[0].lac, Some(420));
        assert_eq!(envelope.cell[0].radio_type.as_deref(), Some("lte"));
    }

    #[test]
    fn test_gnss_field_name_dialects_are_equivalent() {
        let a = normalize(&json!({
            "devid": "100001",
            "gnss": {"latitude": 1.0, "longitude": 2.0},
        }))
        .unwrap();
        let b = normalize(&json!({
            "devid": "100001",
            "gnss": {"lat": 1.0, "lng": 2.0},
        }))
        .unwrap();

        assert_eq!(a.gnss, b.gnss);
        assert_eq!(a.gnss, Some(GnssFix { lat: 1.0, lng: 2.0, accuracy: None }));
    }

    #[test]
    fn test_gnss_object_aliases() {
        for key in ["gnss", "gps", "location"] {
            let envelope = normalize(&json!({
                "devid": "100001",
                key: {"lat": 55.67, "lon": 12.56, "hdop": 2.5},
            }))
            .unwrap();
            let gnss = envelope.gnss.unwrap();
            assert_eq!(gnss.lat, 55.67);
            assert_eq!(gnss.lng, 12.56);
            assert_eq!(gnss.accuracy, Some(2.5));
        }
    }

    #[test]
    fn test_incomplete_gnss_is_absent_not_an_error() {
        let envelope = normalize(&json!({
            "devid": "100001",
            "gnss": {"lat": 55.67},
            "wifi": [{"mac": "aa:bb:cc:dd:ee:ff"}],
        }))
        .unwrap();

        assert_eq!(envelope.gnss, None);
        assert_eq!(envelope.wlan.len(), 1);
    }

    #[test]
    fn test_non_numeric_gnss_is_absent() {
        let envelope = normalize(&json!({
            "devid": "100001",
            "gps": {"lat": "55.67", "lng": "12.56"},
        }))
        .unwrap();

        assert_eq!(envelope.gnss, None);
    }

    #[test]
    fn test_timestamp_and_uplink_count() {
        let envelope = normalize(&json!({
            "devid": "100001",
            "timestamp": 1754560000,
            "uplinkCount": 42,
        }))
        .unwrap();

        assert_eq!(envelope.timestamp, Some(1754560000));
        assert_eq!(envelope.uplink_count, Some(42));
    }

    #[test]
    fn test_normalization_is_idempotent_across_dialects() {
        let a = normalize(&json!({
            "devid": "100001",
            "wifiAccessPoints": [{"bssid": "AABBCCDDEEFF", "signalStrength": -60}],
            "cellTowers": [{"MCC": 238, "MNC": 1, "cellId": 31431}],
        }))
        .unwrap();
        let b = normalize(&json!({
            "devid": "100001",
            "wifi": [{"mac": "aa:bb:cc:dd:ee:ff", "rssi": -60}],
            "cells": [{"mcc": 238, "mnc": 1, "cid": 31431}],
        }))
        .unwrap();

        assert_eq!(a, b);
    }
}
