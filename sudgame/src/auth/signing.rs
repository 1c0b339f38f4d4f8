//! HMAC signing for outbound platform requests.
//!
//! Two signatures are in play:
//! - the per-request `Sud-Auth` header: HMAC-SHA1 over
//!   `{app_id}\n{timestamp_millis}\n{nonce}\n{body}\n` (trailing newline
//!   included), hex-encoded lowercase;
//! - the endpoint-discovery URL path: HMAC-MD5 over the bare `app_id`,
//!   hex-encoded.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;
type HmacMd5 = Hmac<Md5>;

/// Nonce length used for every signed request
pub const NONCE_LENGTH: usize = 16;

/// Generate a single-use nonce of exactly `length` characters.
///
/// Characters are drawn from cryptographically secure random bytes,
/// base64-encoded with `/`, `+` and `=` stripped. Generation loops until the
/// stripped output reaches the requested length, so the result is never
/// shorter than asked for.
pub fn nonce(length: usize) -> String {
    use rand::RngCore;

    let mut out = String::with_capacity(length);
    while out.len() < length {
        let remaining = length - out.len();
        let mut bytes = vec![0u8; remaining];
        rand::thread_rng().fill_bytes(&mut bytes);

        let encoded = BASE64_STANDARD.encode(&bytes);
        out.extend(encoded.chars().filter(|c| !matches!(c, '/' | '+' | '=')).take(remaining));
    }

    out
}

/// The exact ordered concatenation of fields the request HMAC is computed
/// over. The trailing newline is part of the contract.
pub fn canonical_string(app_id: &str, timestamp: &str, nonce: &str, body: &str) -> String {
    format!("{app_id}\n{timestamp}\n{nonce}\n{body}\n")
}

/// HMAC-SHA1 of the canonical string, hex-encoded lowercase.
pub fn request_signature(secret: &str, canonical: &str) -> String {
    // new_from_slice on an HMAC never fails: keys longer than the block size
    // are hashed down, shorter ones padded.
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(canonical.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// HMAC-MD5 of the app id, hex-encoded. Appended to the discovery host to
/// form the endpoint-configuration URL.
pub fn url_signature(secret: &str, app_id: &str) -> String {
    let mut mac = HmacMd5::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(app_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// A freshly computed `Sud-Auth` authorization header.
///
/// Constructed once per outbound request and never reused; replay protection
/// relies on the timestamp + nonce pair being unique, enforced server-side.
#[derive(Debug, Clone)]
pub struct SudAuth {
    pub app_id: String,
    pub timestamp_millis: i64,
    pub nonce: String,
    pub signature: String,
}

impl SudAuth {
    /// Sign `body` with the current time and a fresh nonce.
    pub fn sign(app_id: &str, secret: &str, body: &str) -> Self {
        Self::sign_at(app_id, secret, Utc::now().timestamp_millis(), nonce(NONCE_LENGTH), body)
    }

    /// Sign `body` with explicit timestamp and nonce. Deterministic: fixed
    /// inputs always produce the same signature.
    pub fn sign_at(app_id: &str, secret: &str, timestamp_millis: i64, nonce: String, body: &str) -> Self {
        let canonical = canonical_string(app_id, &timestamp_millis.to_string(), &nonce, body);
        let signature = request_signature(secret, &canonical);

        Self {
            app_id: app_id.to_string(),
            timestamp_millis,
            nonce,
            signature,
        }
    }

    /// Render the `Authorization` header value.
    pub fn header_value(&self) -> String {
        format!(
            "Sud-Auth app_id=\"{}\",timestamp=\"{}\",nonce=\"{}\",signature=\"{}\"",
            self.app_id, self.timestamp_millis, self.nonce, self.signature
        )
    }
}
