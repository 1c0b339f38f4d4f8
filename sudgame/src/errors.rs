//! Error taxonomy for the Sud platform client.
//!
//! Verification of inbound callback signatures is deliberately *not* part of
//! this taxonomy: a mismatch is an expected outcome and surfaces as a plain
//! `bool` from [`crate::auth::callback::verify`].

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Network-level failure: connection refused, DNS, TLS, or the configured
    /// request timeout expiring.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The platform answered, but the body was not the JSON shape we expect
    /// (unparseable, or the discovery response is missing its `api` field).
    #[error("malformed response from platform: {message}")]
    MalformedResponse { message: String },

    /// A required identifier was missing or empty. Raised before any network
    /// round trip is attempted.
    #[error("{message}")]
    InvalidArgument { message: String },

    /// Application-level error surfaced by the platform's `ret_code` /
    /// `ret_msg` scheme. Codes are passed through untouched.
    #[error("platform error {code}: {message}")]
    Remote { code: i64, message: String },

    /// Unusable client configuration, e.g. an empty app secret.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The fetched API configuration has no URL for the requested operation.
    #[error("operation {name:?} missing from the fetched API configuration")]
    UnknownOperation { name: String },
}

/// Type alias for client operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = Error::Remote {
            code: 1002,
            message: "app not exist".to_string(),
        };
        assert_eq!(err.to_string(), "platform error 1002: app not exist");
    }

    #[test]
    fn test_unknown_operation_display() {
        let err = Error::UnknownOperation {
            name: "push_event".to_string(),
        };
        assert!(err.to_string().contains("push_event"));
    }
}
