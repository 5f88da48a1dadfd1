use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the uplink signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature header")]
    Missing,

    #[error("malformed signature header")]
    Malformed,

    #[error("signature mismatch")]
    Mismatch,
}

/// Verify that `body` was signed with `secret`.
///
/// The header value is hex-encoded HMAC-SHA256 over the raw body bytes,
/// optionally prefixed with `sha256=`. The comparison happens inside
/// `verify_slice`, which is constant-time, so response timing reveals
/// nothing about where the first differing byte is.
///
/// This must run against the raw bytes before the body is parsed or acted
/// upon in any way.
pub fn verify(secret: &str, body: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;
    let hex_digest = header.strip_prefix("sha256=").unwrap_or(header).trim();
    let provided = hex::decode(hex_digest).map_err(|_| SignatureError::Malformed)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}

/// Hex HMAC-SHA256 of `body` under `secret`; the value `verify` accepts.
/// Callers prepend `sha256=` if the header convention asks for it.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
