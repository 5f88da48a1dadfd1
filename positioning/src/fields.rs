//! Ordered-alias field lookup over JSON objects.
//!
//! Device firmware across hardware generations disagrees on key names
//! (`lat` vs `latitude`, `mac` vs `bssid`, ...), and positioning
//! providers disagree on response shapes. Every tolerant lookup in the
//! system goes through these helpers with an explicit ordered alias
//! list, so the accepted dialects stay centralized and testable.

use serde_json::{Map, Value};

/// First value present under any of the given keys, in alias order.
pub fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

/// First alias whose value is a string.
pub fn first_str<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_str))
}

/// First alias whose value is representable as f64.
pub fn first_f64(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_f64))
}

/// First alias whose value is a non-negative integer.
pub fn first_u64(obj: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_u64))
}

/// First alias whose value is an integer.
pub fn first_i64(obj: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_i64))
}
