//! OSS v1 request signing — pure functions, no I/O.
//!
//! The provider's legacy header scheme signs a newline-joined string of
//! `VERB`, `Content-MD5`, `Content-Type`, `Date`, and the canonicalized
//! resource with HMAC-SHA1 and base64-encodes the digest. SHA-1 is what
//! the provider's protocol version verifies against; swapping in a
//! stronger hash produces signatures the provider rejects.

use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use thiserror::Error;

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signing key could not be imported")]
    InvalidKey,
}

/// Build the canonical string-to-sign. Field order is fixed by the
/// provider; empty checksum/content-type still contribute their newline.
pub fn string_to_sign(
    verb: &str,
    content_md5: &str,
    content_type: &str,
    date: &str,
    canonicalized_resource: &str,
) -> String {
    [verb, content_md5, content_type, date, canonicalized_resource].join("\n")
}

/// Sign a single outbound request. Returns the base64 signature used
/// verbatim in `Authorization: OSS {accessKeyId}:{signature}`.
pub fn sign_request(
    secret: &[u8],
    verb: &str,
    content_md5: &str,
    content_type: &str,
    date: &str,
    canonicalized_resource: &str,
) -> Result<String, SignerError> {
    let payload = string_to_sign(verb, content_md5, content_type, date, canonicalized_resource);
    hmac_base64(secret, payload.as_bytes())
}

/// Sign a base64-encoded upload policy document (PostObject flow). The
/// keyed hash runs over the base64 text itself, not the decoded JSON.
pub fn sign_policy(secret: &[u8], policy_base64: &str) -> Result<String, SignerError> {
    hmac_base64(secret, policy_base64.as_bytes())
}

fn hmac_base64(secret: &[u8], payload: &[u8]) -> Result<String, SignerError> {
    let mut mac = HmacSha1::new_from_slice(secret).map_err(|_| SignerError::InvalidKey)?;
    mac.update(payload);
    let digest = mac.finalize().into_bytes();
    Ok(general_purpose::STANDARD.encode(digest))
}
