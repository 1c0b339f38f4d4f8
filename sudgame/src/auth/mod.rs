//! Request signing and callback verification.
//!
//! Every outbound request carries a `Sud-Auth` authorization header computed
//! over a canonical string of `app_id`, a millisecond timestamp, a single-use
//! nonce, and the exact JSON body bytes. Inbound callbacks from the platform
//! carry the same construction in `Sud-*` headers and are checked with a
//! constant-time comparison.

pub mod callback;
pub mod signing;

pub use callback::verify;
pub use signing::SudAuth;
