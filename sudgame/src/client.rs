//! The platform client: endpoint discovery, request signing, and the shared
//! signed-POST primitive every operation funnels through.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::signing::{self, SudAuth};
use crate::config::SudConfig;
use crate::endpoints::{ApiConfig, ApiConfigCache, ApiOperation};
use crate::errors::{Error, Result};

/// Production discovery host
const CONFIG_BASE: &str = "https://asc.sudden.ltd/";
/// Sandbox discovery host
const SANDBOX_CONFIG_BASE: &str = "https://sim-asc.sudden.ltd/";

/// Client for the platform's server-side API.
///
/// Holds the immutable credential pair and one pooled HTTP client for the
/// process lifetime. All public operations are request-per-call: no state
/// survives a call beyond the optional discovery cache, and no ordering is
/// enforced between independent calls.
///
/// Cloning is cheap and shares the HTTP connection pool and discovery cache.
#[derive(Clone)]
pub struct SudClient {
    pub(crate) config: Arc<SudConfig>,
    pub(crate) http: reqwest::Client,
    api_cache: Option<Arc<ApiConfigCache>>,
}

impl SudClient {
    /// Create a client with its own pooled HTTP client, built with the
    /// configured request timeout.
    pub fn new(config: SudConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(Error::Transport)?;
        Self::with_http_client(config, http)
    }

    /// Create a client around an existing `reqwest::Client`, for hosts that
    /// already maintain one pool per process. Timeout configuration is then
    /// the caller's responsibility.
    pub fn with_http_client(config: SudConfig, http: reqwest::Client) -> Result<Self> {
        config.validate()?;

        let api_cache = config.api_config_ttl.map(|ttl| Arc::new(ApiConfigCache::new(ttl)));

        Ok(Self {
            config: Arc::new(config),
            http,
            api_cache,
        })
    }

    /// URL of the endpoint-discovery document: the environment host (picked
    /// by the sandbox flag, or overridden by `config_base`) with the
    /// HMAC-MD5 credential signature appended.
    pub fn resolve_config_url(&self) -> Url {
        let sign = signing::url_signature(&self.config.app_secret, &self.config.app_id);

        if let Some(base) = &self.config.config_base {
            // join() would drop a missing trailing slash; the discovery path
            // is always `{base}{sign}`.
            let mut base = base.as_str().to_string();
            if !base.ends_with('/') {
                base.push('/');
            }
            return Url::parse(&format!("{base}{sign}")).expect("base url with hex suffix is a valid url");
        }

        let base = if self.config.sandbox { SANDBOX_CONFIG_BASE } else { CONFIG_BASE };
        Url::parse(&format!("{base}{sign}")).expect("discovery host with hex suffix is a valid url")
    }

    /// Fetch the operation-name to URL mapping from the discovery endpoint.
    ///
    /// This always performs a network round trip; [`Self::api_config`] goes
    /// through the opt-in cache instead.
    pub async fn fetch_api_config(&self) -> Result<ApiConfig> {
        tracing::debug!(sandbox = self.config.sandbox, "fetching api configuration");

        let response = self.http.get(self.resolve_config_url()).send().await?;
        let body = response.text().await?;

        let config = ApiConfig::from_json(&body)?;
        tracing::debug!(operations = config.len(), "fetched api configuration");
        Ok(config)
    }

    /// The current API configuration, served from the cache when a TTL is
    /// configured and the entry is fresh.
    pub async fn api_config(&self) -> Result<ApiConfig> {
        let Some(cache) = &self.api_cache else {
            return self.fetch_api_config().await;
        };

        if let Some(config) = cache.get().await {
            return Ok(config);
        }

        let config = self.fetch_api_config().await?;
        cache.put(config.clone()).await;
        Ok(config)
    }

    /// Live URL for one operation.
    pub async fn api_url(&self, operation: ApiOperation) -> Result<Url> {
        let config = self.api_config().await?;
        config
            .url_for(operation)
            .cloned()
            .ok_or_else(|| Error::UnknownOperation { name: operation.to_string() })
    }

    /// Call an operation by its raw wire name. Escape hatch for platform
    /// operations this crate has no typed wrapper for (`auth_app_list`,
    /// `query_match_base`, ...).
    pub async fn call(&self, operation_name: &str, body: &impl Serialize) -> Result<Value> {
        let config = self.api_config().await?;
        let url = config.get(operation_name).cloned().ok_or_else(|| Error::UnknownOperation {
            name: operation_name.to_string(),
        })?;
        self.post_signed(url, body).await
    }

    /// Serialize, sign and POST one request body; parse the JSON response.
    ///
    /// The signature covers the exact serialized bytes, so the body string
    /// built here is the one handed to the transport verbatim. A response
    /// carrying a non-zero `ret_code` surfaces as [`Error::Remote`];
    /// transport failures propagate instead of being swallowed.
    pub(crate) async fn post_signed(&self, url: Url, body: &impl Serialize) -> Result<Value> {
        let body = serde_json::to_string(body).map_err(|e| Error::InvalidArgument {
            message: format!("unserializable request body: {e}"),
        })?;

        let auth = SudAuth::sign(&self.config.app_id, &self.config.app_secret, &body);

        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, auth.header_value())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(status = status.as_u16(), "unparseable platform response: {}", e);
            Error::MalformedResponse {
                message: format!("HTTP {status}: response is not valid JSON: {e}"),
            }
        })?;

        if let Some(code) = value.get("ret_code").and_then(Value::as_i64)
            && code != 0
        {
            let message = value.get("ret_msg").and_then(Value::as_str).unwrap_or_default().to_string();
            tracing::warn!(code, ret_msg = %message, "platform returned an application error");
            return Err(Error::Remote { code, message });
        }

        Ok(value)
    }
}

impl std::fmt::Debug for SudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Skip the secret on purpose
        f.debug_struct("SudClient")
            .field("app_id", &self.config.app_id)
            .field("sandbox", &self.config.sandbox)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> SudConfig {
        SudConfig::new("1001", "s3cr3t")
    }

    fn client_against(server: &MockServer) -> SudClient {
        let mut config = test_config();
        config.config_base = Some(server.uri().parse().unwrap());
        SudClient::new(config).unwrap()
    }

    fn discovery_body(server_uri: &str) -> Value {
        json!({
            "ret_code": 0,
            "ret_msg": "success",
            "api": {
                "mg_list": format!("{server_uri}/v1/app/server/mg_list"),
                "push_event": format!("{server_uri}/v1/app/server/push_event"),
                "create_order": format!("{server_uri}/v1/app/server/create_order"),
            }
        })
    }

    /// Mount the discovery endpoint for the test credentials.
    async fn mount_discovery(server: &MockServer, expect: u64) {
        let sign = signing::url_signature("s3cr3t", "1001");
        Mock::given(method("GET"))
            .and(path(format!("/{sign}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(discovery_body(&server.uri())))
            .expect(expect)
            .mount(server)
            .await;
    }

    #[test]
    fn test_resolve_config_url_host_selection() {
        let mut config = test_config();
        let digest = signing::url_signature("s3cr3t", "1001");

        let production = SudClient::new(config.clone()).unwrap();
        assert_eq!(production.resolve_config_url().as_str(), format!("https://asc.sudden.ltd/{digest}"));

        config.sandbox = true;
        let sandbox = SudClient::new(config).unwrap();
        assert_eq!(
            sandbox.resolve_config_url().as_str(),
            format!("https://sim-asc.sudden.ltd/{digest}")
        );
    }

    #[test]
    fn test_new_rejects_empty_secret() {
        let config = SudConfig::new("1001", "");
        assert!(matches!(SudClient::new(config), Err(Error::Config { .. })));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let client = SudClient::new(test_config()).unwrap();
        let rendered = format!("{client:?}");
        assert!(rendered.contains("1001"));
        assert!(!rendered.contains("s3cr3t"));
    }

    #[test_log::test(tokio::test)]
    async fn test_fetch_api_config() {
        let server = MockServer::start().await;
        mount_discovery(&server, 1).await;

        let client = client_against(&server);
        let config = client.fetch_api_config().await.unwrap();

        assert_eq!(config.len(), 3);
        assert!(config.url_for(ApiOperation::PushEvent).is_some());
    }

    #[tokio::test]
    async fn test_fetch_api_config_malformed_body() {
        let server = MockServer::start().await;
        let sign = signing::url_signature("s3cr3t", "1001");
        Mock::given(method("GET"))
            .and(path(format!("/{sign}")))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>503</html>"))
            .mount(&server)
            .await;

        let client = client_against(&server);
        let err = client.fetch_api_config().await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_api_config_missing_api_field() {
        let server = MockServer::start().await;
        let sign = signing::url_signature("s3cr3t", "1001");
        Mock::given(method("GET"))
            .and(path(format!("/{sign}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ret_code": 0})))
            .mount(&server)
            .await;

        let client = client_against(&server);
        assert!(matches!(
            client.fetch_api_config().await,
            Err(Error::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_api_config_transport_error() {
        // Point to a port that's not listening
        let mut config = test_config();
        config.config_base = Some("http://127.0.0.1:1".parse().unwrap());
        let client = SudClient::new(config).unwrap();

        assert!(matches!(client.fetch_api_config().await, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_api_url_unknown_operation() {
        let server = MockServer::start().await;
        mount_discovery(&server, 1).await;

        let client = client_against(&server);
        let err = client.api_url(ApiOperation::QueryOrder).await.unwrap_err();
        assert!(matches!(err, Error::UnknownOperation { .. }));
    }

    #[tokio::test]
    async fn test_discovery_fetched_per_call_by_default() {
        let server = MockServer::start().await;
        mount_discovery(&server, 2).await;

        let client = client_against(&server);
        client.api_url(ApiOperation::PushEvent).await.unwrap();
        client.api_url(ApiOperation::PushEvent).await.unwrap();
        // expect(2) on the mock verifies both calls hit the discovery endpoint
    }

    #[tokio::test]
    async fn test_discovery_cached_with_ttl() {
        let server = MockServer::start().await;
        mount_discovery(&server, 1).await;

        let mut config = test_config();
        config.config_base = Some(server.uri().parse().unwrap());
        config.api_config_ttl = Some(std::time::Duration::from_secs(3600));
        let client = SudClient::new(config).unwrap();

        client.api_url(ApiOperation::PushEvent).await.unwrap();
        client.api_url(ApiOperation::MgList).await.unwrap();
        // expect(1) on the mock verifies the second lookup was served from cache
    }

    #[test_log::test(tokio::test)]
    async fn test_post_signed_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/app/server/push_event"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ret_code": 1002,
                "ret_msg": "app not exist"
            })))
            .mount(&server)
            .await;

        let client = client_against(&server);
        let url: Url = format!("{}/v1/app/server/push_event", server.uri()).parse().unwrap();
        let err = client.post_signed(url, &json!({"platform": 2})).await.unwrap_err();

        match err {
            Error::Remote { code, message } => {
                assert_eq!(code, 1002);
                assert_eq!(message, "app not exist");
            }
            other => panic!("expected Remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_post_signed_success_passes_body_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ret_code": 0,
                "ret_msg": "success",
                "mg_info_list": [{"mg_id": "1468180338417074177"}]
            })))
            .mount(&server)
            .await;

        let client = client_against(&server);
        let url: Url = server.uri().parse().unwrap();
        let value = client.post_signed(url, &json!({"platform": 2})).await.unwrap();

        assert_eq!(value["ret_code"], 0);
        assert!(value["mg_info_list"].is_array());
    }

    #[test_log::test(tokio::test)]
    async fn test_post_signed_sends_verifiable_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ret_code": 0})))
            .mount(&server)
            .await;

        let client = client_against(&server);
        let url: Url = server.uri().parse().unwrap();
        client.post_signed(url, &json!({"platform": 2})).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];

        assert_eq!(request.headers.get("content-type").unwrap().to_str().unwrap(), "application/json");

        let auth_header = request.headers.get("authorization").unwrap().to_str().unwrap().to_string();
        let fields = parse_sud_auth(&auth_header);
        let body = String::from_utf8(request.body.clone()).unwrap();

        assert_eq!(fields["app_id"], "1001");
        assert_eq!(fields["nonce"].len(), signing::NONCE_LENGTH);

        // The signature the client sent must verify against the body it sent
        assert!(crate::auth::callback::verify_parts(
            &fields["app_id"],
            &fields["timestamp"],
            &fields["nonce"],
            &body,
            &fields["signature"],
            "s3cr3t",
        ));
    }

    /// Parse `Sud-Auth k="v",...` into a map. Test-side mirror of the header
    /// the client renders.
    fn parse_sud_auth(header: &str) -> std::collections::HashMap<String, String> {
        let fields = header.strip_prefix("Sud-Auth ").expect("Sud-Auth scheme prefix");
        fields
            .split(',')
            .map(|pair| {
                let (key, value) = pair.split_once('=').expect("key=value pair");
                (key.to_string(), value.trim_matches('"').to_string())
            })
            .collect()
    }
}
