//! Client configuration.
//!
//! Configuration can be built directly ([`SudConfig::new`]) when the host
//! application manages its own settings, or loaded from a YAML file with
//! environment variable overrides ([`SudConfig::load`]). Variables prefixed
//! with `SUDGAME_` override YAML values, e.g. `SUDGAME_SANDBOX=true` or
//! `SUDGAME_APP_SECRET=...`.
//!
//! ## Example configuration file
//!
//! ```yaml
//! app_id: "1719669845797171201"
//! app_secret: "kkd0Ri..."
//! sandbox: true
//! request_timeout: 10s
//! # Opt-in cache for the discovery response. The platform rate-limits the
//! # discovery endpoint; leaving this unset preserves fetch-per-call.
//! api_config_ttl: 5m
//! ```

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::{Error, Result};

/// Credentials and transport settings for one Sud application.
///
/// Immutable for the lifetime of the client; every signature is derived from
/// the `app_id` / `app_secret` pair.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SudConfig {
    /// Application identifier issued by the platform
    pub app_id: String,
    /// Shared secret used for request signing and callback verification
    pub app_secret: String,
    /// Select the sandbox environment instead of production
    pub sandbox: bool,
    /// Timeout applied to every HTTP request; expiry surfaces as a transport error
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Optional TTL for caching the fetched API configuration. Unset means
    /// the discovery endpoint is fetched on every call, matching the
    /// platform's documented default behavior.
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub api_config_ttl: Option<Duration>,
    /// Override for the discovery base URL. Normally unset; the host is
    /// selected by the `sandbox` flag. Useful for tests and self-hosted
    /// proxies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_base: Option<Url>,
}

impl Default for SudConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            sandbox: false,
            request_timeout: Duration::from_secs(10),
            api_config_ttl: None,
            config_base: None,
        }
    }
}

impl SudConfig {
    /// Create a configuration with the given credentials and default
    /// transport settings (production hosts, 10 second timeout, no cache).
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file merged with `SUDGAME_`-prefixed
    /// environment variables (environment wins).
    pub fn load(path: &str) -> Result<Self> {
        let config: SudConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("SUDGAME_").split("__"))
            .extract()
            .map_err(|e| Error::Config { message: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable. An absent secret is a
    /// misconfiguration and fails fast here rather than producing
    /// unverifiable signatures later.
    pub fn validate(&self) -> Result<()> {
        if self.app_id.is_empty() {
            return Err(Error::Config {
                message: "app_id must not be empty".to_string(),
            });
        }
        if self.app_secret.is_empty() {
            return Err(Error::Config {
                message: "app_secret must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
