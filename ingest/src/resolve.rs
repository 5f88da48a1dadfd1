use crate::envelope::Envelope;
use positioning::client::{ClientError, PositionProvider};
use positioning::types::{FixSource, PositionFix};

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("uplink carries no usable positioning inputs")]
    NoInputs,

    #[error(transparent)]
    Provider(#[from] ClientError),
}

/// Resolve exactly one fix for an uplink.
///
/// An on-device GNSS fix wins when present: it is generally more accurate
/// and costs no external call. Network observations are the fallback for
/// devices indoors, cold-starting, or without GNSS hardware. With neither
/// there is nothing to resolve and the uplink is rejected.
pub async fn resolve_position(
    envelope: &Envelope,
    provider: &dyn PositionProvider,
) -> Result<PositionFix, ResolveError> {
    if let Some(gnss) = envelope.gnss {
        return Ok(PositionFix {
            lat: gnss.lat,
            lng: gnss.lng,
            accuracy: gnss.accuracy,
            source: FixSource::Gnss,
        });
    }

    if !envelope.has_network_observations() {
        return Err(ResolveError::NoInputs);
    }

    let resolved = provider.locate(&envelope.wlan, &envelope.cell).await?;
    Ok(PositionFix {
        lat: resolved.lat,
        lng: resolved.lng,
        accuracy: resolved.accuracy,
        source: FixSource::Here,
    })
}
