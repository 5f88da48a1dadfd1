use serde::Serialize;

/// A Wi-Fi access point observed by a device during a scan.
///
/// The MAC is canonicalized by the normalizer (lowercase, colon-separated)
/// so equal scans serialize identically regardless of firmware formatting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WifiObservation {
    pub mac: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<f64>,
}

/// A cell tower observed by a device's modem.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellObservation {
    pub mcc: u16,
    pub mnc: u16,
    pub cid: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lac: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radio_type: Option<String>,
}

/// An on-device satellite fix carried inside the uplink itself.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GnssFix {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Where a resolved fix came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixSource {
    Gnss,
    Here,
}

impl FixSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FixSource::Gnss => "gnss",
            FixSource::Here => "here",
        }
    }
}

/// The single resolved position for one uplink. Lat/lng are always both
/// present; a request that cannot produce both fails instead.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionFix {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
    pub source: FixSource,
}
