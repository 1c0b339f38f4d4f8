//! # sudgame: server-side client for the Sud mini-game platform
//!
//! `sudgame` wraps the Sud platform's server-to-server HTTP API: it builds
//! signed requests, pushes game-lifecycle events (user join/leave/ready,
//! round start/end, AI players, room management), creates and queries
//! in-game payment orders, reports round billing, and verifies the
//! signatures of inbound platform callbacks.
//!
//! ## How requests flow
//!
//! The platform publishes no fixed operation URLs. Each application derives
//! a discovery URL from its credentials (an HMAC-MD5 signature appended to
//! the environment host), fetches a JSON document mapping operation names to
//! live URLs, and POSTs its request there with a `Sud-Auth` authorization
//! header: an HMAC-SHA1 signature over the app id, a millisecond
//! timestamp, a single-use nonce, and the exact body bytes. The
//! [`client::SudClient`] owns that whole pipeline behind typed methods.
//!
//! Discovery is fetched per call by default, matching the platform's
//! documented behavior; set `api_config_ttl` in [`config::SudConfig`] to
//! cache it for a bounded time.
//!
//! ## Quick start
//!
//! ```no_run
//! use sudgame::{SudClient, SudConfig, events::UserIn};
//!
//! #[tokio::main]
//! async fn main() -> sudgame::Result<()> {
//!     let mut config = SudConfig::new("1719669845797171201", "your-app-secret");
//!     config.sandbox = true;
//!
//!     let client = SudClient::new(config)?;
//!
//!     let mg_id = "1468180338417074177";
//!     let join = UserIn::new("user-token", sudgame::language::normalize_language("zh_cn"), "8618");
//!     client.user_join(mg_id, join).await?;
//!     client.game_start(mg_id, "8618", 0).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Verifying callbacks
//!
//! The hosting web layer hands the raw body and headers of an inbound
//! callback to [`auth::callback::verify`]; a `false` result means the
//! callback must be rejected. The comparison is constant-time.
//!
//! ## What this crate does not do
//!
//! No retries or backoff, no local rate limiting, no caching beyond the
//! opt-in discovery TTL, and no game logic; the remote game server owns
//! all of it. Errors surface once, to the immediate caller.

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod errors;
pub mod events;
pub mod language;
pub mod orders;
pub mod reports;

pub use client::SudClient;
pub use config::SudConfig;
pub use endpoints::{ApiConfig, ApiOperation};
pub use errors::{Error, Result};
