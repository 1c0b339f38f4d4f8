//! Operation names and the fetched API configuration.
//!
//! The platform does not publish fixed operation URLs. Instead, a discovery
//! endpoint (resolved from the credentials, see
//! [`crate::client::SudClient::resolve_config_url`]) returns a JSON document
//! whose `api` field maps operation names to their live URLs.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

use crate::errors::{Error, Result};

/// Known server-side operations of the platform API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Game catalog listing
    MgList,
    /// Details for a single game
    MgInfo,
    /// Push a game-lifecycle event to the game server
    PushEvent,
    /// Create an in-game payment order
    CreateOrder,
    /// Query a previously created order
    QueryOrder,
    /// Report currency consumed in one game round
    ReportGameRoundBill,
    /// Query reported game information by key or round id
    QueryGameReportInfo,
    /// Page through reported game information for a room
    GameReportInfoPage,
}

impl ApiOperation {
    /// Wire name of the operation, as used in the discovery response's `api` map.
    pub fn name(self) -> &'static str {
        match self {
            Self::MgList => "mg_list",
            Self::MgInfo => "mg_info",
            Self::PushEvent => "push_event",
            Self::CreateOrder => "create_order",
            Self::QueryOrder => "query_order",
            Self::ReportGameRoundBill => "report_game_round_bill",
            Self::QueryGameReportInfo => "query_game_report_info",
            Self::GameReportInfoPage => "get_game_report_info_page",
        }
    }
}

impl std::fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ApiOperation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "mg_list" => Ok(Self::MgList),
            "mg_info" => Ok(Self::MgInfo),
            "push_event" => Ok(Self::PushEvent),
            "create_order" => Ok(Self::CreateOrder),
            "query_order" => Ok(Self::QueryOrder),
            "report_game_round_bill" => Ok(Self::ReportGameRoundBill),
            "query_game_report_info" => Ok(Self::QueryGameReportInfo),
            "get_game_report_info_page" => Ok(Self::GameReportInfoPage),
            _ => Err(format!("Unknown operation name: {}", s)),
        }
    }
}

/// The operation-name to URL mapping served by the discovery endpoint.
///
/// The discovery document carries fields besides `api` (rate-limit hints,
/// region metadata); this layer only consumes the mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    api: HashMap<String, Url>,
}

impl ApiConfig {
    /// Parse a discovery response body. Fails with
    /// [`Error::MalformedResponse`] when the body is not JSON or lacks the
    /// `api` field.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
            message: format!("invalid discovery response: {e}"),
        })
    }

    /// URL for a known operation, if the platform advertised one.
    pub fn url_for(&self, operation: ApiOperation) -> Option<&Url> {
        self.api.get(operation.name())
    }

    /// URL by raw operation name. Escape hatch for operations this crate has
    /// no typed wrapper for (e.g. `auth_app_list`).
    pub fn get(&self, name: &str) -> Option<&Url> {
        self.api.get(name)
    }

    pub fn len(&self) -> usize {
        self.api.len()
    }

    pub fn is_empty(&self) -> bool {
        self.api.is_empty()
    }
}

/// Single-entry TTL cache for the discovery response.
///
/// The platform rate-limits the discovery endpoint, but the reference
/// behavior is fetch-per-call; this cache is opt-in via
/// `SudConfig::api_config_ttl`. One writer refreshes while readers clone the
/// current entry.
pub(crate) struct ApiConfigCache {
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
}

struct CacheEntry {
    config: ApiConfig,
    fetched_at: Instant,
}

impl ApiConfigCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// The cached configuration, unless the entry is older than the TTL.
    pub(crate) async fn get(&self) -> Option<ApiConfig> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.config.clone())
    }

    pub(crate) async fn put(&self, config: ApiConfig) {
        let mut slot = self.slot.write().await;
        *slot = Some(CacheEntry {
            config,
            fetched_at: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shape taken from the live discovery endpoint
    const DISCOVERY_BODY: &str = r#"{
        "ret_code": 0,
        "ret_msg": "success",
        "api": {
            "mg_list": "https://sg-000-mg-proxy.s02.tech/v1/app/server/mg_list",
            "push_event": "https://sg-000-mg-proxy.s02.tech/v1/app/server/push_event",
            "create_order": "https://sg-000-mg-proxy.s02.tech/v1/app/server/create_order",
            "auth_app_list": "https://sg-000-mg-proxy.s02.tech/v1/app/server/auth_app_list"
        }
    }"#;

    #[test]
    fn test_operation_name_round_trip() {
        for op in [
            ApiOperation::MgList,
            ApiOperation::MgInfo,
            ApiOperation::PushEvent,
            ApiOperation::CreateOrder,
            ApiOperation::QueryOrder,
            ApiOperation::ReportGameRoundBill,
            ApiOperation::QueryGameReportInfo,
            ApiOperation::GameReportInfoPage,
        ] {
            assert_eq!(op.name().parse::<ApiOperation>().unwrap(), op);
        }
        assert!("push-event".parse::<ApiOperation>().is_err());
    }

    #[test]
    fn test_parse_discovery_response() {
        let config = ApiConfig::from_json(DISCOVERY_BODY).unwrap();
        assert_eq!(config.len(), 4);
        assert_eq!(
            config.url_for(ApiOperation::PushEvent).unwrap().as_str(),
            "https://sg-000-mg-proxy.s02.tech/v1/app/server/push_event"
        );
        // Unknown-to-us operations stay reachable by name
        assert!(config.get("auth_app_list").is_some());
        assert!(config.url_for(ApiOperation::QueryOrder).is_none());
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = ApiConfig::from_json("<html>503</html>").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_api_field() {
        let err = ApiConfig::from_json(r#"{"ret_code": 0}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let cache = ApiConfigCache::new(Duration::from_secs(3600));
        assert!(cache.get().await.is_none());

        cache.put(ApiConfig::from_json(DISCOVERY_BODY).unwrap()).await;
        let cached = cache.get().await.expect("entry should still be fresh");
        assert_eq!(cached.len(), 4);
    }

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let cache = ApiConfigCache::new(Duration::ZERO);
        cache.put(ApiConfig::from_json(DISCOVERY_BODY).unwrap()).await;
        assert!(cache.get().await.is_none(), "zero TTL entry must be stale immediately");
    }
}
