//! Signature verification for inbound platform callbacks.
//!
//! The platform signs every callback it delivers with the same canonical
//! construction used for outbound requests, carried in `Sud-AppId`,
//! `Sud-Timestamp`, `Sud-Nonce` and `Sud-Signature` headers. Verification is
//! the only boundary where untrusted input is cryptographically checked: a
//! mismatch means "reject the callback", so the result is a `bool` and never
//! an error.

use reqwest::header::HeaderMap;

use crate::auth::signing::{canonical_string, request_signature};

/// Callback header carrying the application id
pub const HEADER_APP_ID: &str = "sud-appid";
/// Callback header carrying the millisecond timestamp
pub const HEADER_TIMESTAMP: &str = "sud-timestamp";
/// Callback header carrying the single-use nonce
pub const HEADER_NONCE: &str = "sud-nonce";
/// Callback header carrying the hex HMAC-SHA1 signature
pub const HEADER_SIGNATURE: &str = "sud-signature";

/// Verify an inbound callback against the shared secret.
///
/// Header lookup is case-insensitive; an absent or non-UTF-8 header is
/// treated as the empty string and produces a signature mismatch rather than
/// an error. `raw_body` must be the body bytes exactly as received: the
/// signature covers them verbatim, so re-serializing a parsed value would
/// break verification.
pub fn verify(headers: &HeaderMap, raw_body: &str, secret: &str) -> bool {
    let app_id = header_str(headers, HEADER_APP_ID);
    let timestamp = header_str(headers, HEADER_TIMESTAMP);
    let nonce = header_str(headers, HEADER_NONCE);
    let signature = header_str(headers, HEADER_SIGNATURE);

    verify_parts(app_id, timestamp, nonce, raw_body, signature, secret)
}

/// Verify already-extracted callback fields. Exposed for hosting layers that
/// do not hand around a `HeaderMap`.
pub fn verify_parts(app_id: &str, timestamp: &str, nonce: &str, raw_body: &str, signature: &str, secret: &str) -> bool {
    let canonical = canonical_string(app_id, timestamp, nonce, raw_body);
    let expected = request_signature(secret, &canonical);

    let ok = constant_time_eq(expected.as_bytes(), signature.as_bytes());
    if !ok {
        tracing::debug!(app_id, timestamp, "callback signature mismatch");
    }
    ok
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
