use crate::envelope::Envelope;
use positioning::types::{CellObservation, GnssFix, WifiObservation};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Canonical digest input. Field order is fixed by declaration and the
/// observation lists keep their normalized order, so identical normalized
/// inputs always serialize to identical bytes.
#[derive(Serialize)]
struct DigestInputs<'a> {
    wlan: &'a [WifiObservation],
    cell: &'a [CellObservation],
    gnss: &'a Option<GnssFix>,
}

/// Short deterministic hash over the normalized positioning inputs.
///
/// Stored with each fix for audit and duplicate tracing; not used to
/// reject repeated uplinks.
pub fn inputs_digest(envelope: &Envelope) -> String {
    let inputs = DigestInputs {
        wlan: &envelope.wlan,
        cell: &envelope.cell,
        gnss: &envelope.gnss,
    };

    let canonical =
        serde_json::to_vec(&inputs).expect("observation types always serialize to JSON");
    let digest = Sha256::digest(&canonical);
    hex::encode(&digest[..8])
}
