use crate::envelope::EnvelopeError;
use crate::resolve::ResolveError;
use crate::signature::SignatureError;
use http::StatusCode;
use positioning::client::ClientError;
use store::client::StoreError;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T, E = IngestError> = std::result::Result<T, E>;

/// Everything that can reject an uplink, ordered by pipeline stage.
///
/// Authentication and validation failures are the caller's to fix;
/// positioning and storage failures mean the caller should retry the
/// whole uplink later. Nothing here is retried internally.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("missing signature header")]
    MissingSignature,

    #[error("malformed signature header")]
    MalformedSignature,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("missing device id")]
    MissingDeviceId,

    #[error("uplink carries no usable positioning inputs")]
    NoPositioningInputs,

    #[error("positioning provider failure: {0}")]
    Positioning(#[from] ClientError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl IngestError {
    /// Pipeline stage, used as the log field and rejection metric tag.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingSignature | Self::MalformedSignature | Self::SignatureMismatch => {
                "signature"
            }
            Self::MalformedJson(_) => "parse",
            Self::MissingDeviceId => "normalize",
            Self::NoPositioningInputs => "resolve",
            Self::Positioning(_) => "positioning",
            Self::Store(_) => "store",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingSignature | Self::MalformedSignature | Self::SignatureMismatch => {
                StatusCode::UNAUTHORIZED
            }
            Self::MalformedJson(_) | Self::MissingDeviceId | Self::NoPositioningInputs => {
                StatusCode::BAD_REQUEST
            }
            Self::Positioning(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SignatureError> for IngestError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::Missing => IngestError::MissingSignature,
            SignatureError::Malformed => IngestError::MalformedSignature,
            SignatureError::Mismatch => IngestError::SignatureMismatch,
        }
    }
}

impl From<EnvelopeError> for IngestError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::NotAnObject => {
                IngestError::MalformedJson("payload must be a JSON object".into())
            }
            EnvelopeError::MissingDeviceId => IngestError::MissingDeviceId,
        }
    }
}

impl From<ResolveError> for IngestError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NoInputs => IngestError::NoPositioningInputs,
            ResolveError::Provider(e) => IngestError::Positioning(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(IngestError::MissingSignature.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(IngestError::SignatureMismatch.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            IngestError::MalformedJson("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(IngestError::MissingDeviceId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(IngestError::NoPositioningInputs.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            IngestError::Positioning(ClientError::UnexpectedStatus(503)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            IngestError::Store(StoreError::EmptyResponse).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_stage_tags() {
        assert_eq!(IngestError::MalformedSignature.stage(), "signature");
        assert_eq!(IngestError::MalformedJson("bad".into()).stage(), "parse");
        assert_eq!(IngestError::MissingDeviceId.stage(), "normalize");
        assert_eq!(IngestError::NoPositioningInputs.stage(), "resolve");
    }
}
