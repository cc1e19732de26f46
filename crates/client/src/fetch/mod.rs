//! HTTP plumbing for the institution engine API.
//!
//! ### Transport
//! - Every request carries `Authorization: Bearer <token>` and `Accept: application/json`
//! - Paths are joined onto the configured base URL, query pairs appended as given
//! - `reqwest` errors never leave this module; they become [`FetchError`]
//!
//! ### Retry
//! - [`ResilientFetcher`] retries 5xx and transport failures with a fixed delay
//! - Everything else (4xx, unexpected 1xx/3xx) is returned on first sight

pub mod error;
pub mod retry;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use eduform_core::AppConfig;

pub use error::FetchError;
pub use retry::{ResilientFetcher, RetryPolicy};

/// HTTP method for an engine request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A transport-agnostic description of one engine request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::Get, path: path.into(), query: Vec::new(), body: None }
    }

    /// POST with a JSON body.
    pub fn post_json<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, FetchError> {
        let body = serde_json::to_value(body).map_err(|e| FetchError::InvalidRequest(e.to_string()))?;
        Ok(Self { method: Method::Post, path: path.into(), query: Vec::new(), body: Some(body) })
    }

    /// Append a query pair; blank values are skipped.
    pub fn with_query(mut self, key: &str, value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        if !value.is_empty() {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }
}

/// Raw response from the engine.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Bytes,
    /// Time taken by the exchange in milliseconds
    pub elapsed_ms: u64,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into(), elapsed_ms: 0 }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

/// Sends one request and reports whatever came back.
///
/// Implementations return `Ok` for any HTTP response, success or not;
/// only failures to complete the exchange are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError>;
}

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL, e.g. `https://engine.eduformacije.com/api/v1`
    pub base_url: String,
    /// Bearer token
    pub token: String,
    /// User agent string (default: "eduform/0.1")
    pub user_agent: String,
    /// Per-request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://engine.eduformacije.com/api/v1".to_string(),
            token: String::new(),
            user_agent: "eduform/0.1".to_string(),
            timeout: Duration::from_millis(20_000),
        }
    }
}

impl HttpConfig {
    /// Build from application configuration; fails without an API token.
    pub fn from_app(config: &AppConfig) -> Result<Self, FetchError> {
        let token = config.require_api_token().map_err(|e| FetchError::MissingToken(e.to_string()))?;

        Ok(Self {
            base_url: config.api_base_url.clone(),
            token: token.to_string(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
        })
    }
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    config: HttpConfig,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self, FetchError> {
        if config.token.trim().is_empty() {
            return Err(FetchError::MissingToken("Set EDUFORM_API_TOKEN environment variable".into()));
        }

        Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidRequest(format!("invalid base URL {}: {e}", config.base_url)))?;

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, FetchError> {
        let raw = format!("{}/{}", self.config.base_url.trim_end_matches('/'), request.path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidRequest(format!("{raw}: {e}")))?;

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        let start = Instant::now();
        let url = self.url_for(request)?;

        let builder = match request.method {
            Method::Get => self.http.get(url.clone()),
            Method::Post => self.http.post(url.clone()),
        };
        let mut builder = builder
            .bearer_auth(&self.config.token)
            .header(header::ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(url = %url, status = status.as_u16(), elapsed_ms, bytes = body.len(), "engine response");

        Ok(ApiResponse { status, body, elapsed_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer) -> HttpTransport {
        HttpTransport::new(HttpConfig {
            base_url: format!("{}/api/v1", server.uri()),
            token: "secret".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_http_config_default() {
        let config = HttpConfig::default();
        assert_eq!(config.user_agent, "eduform/0.1");
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_http_config_requires_token() {
        let config = AppConfig::default();
        assert!(matches!(HttpConfig::from_app(&config), Err(FetchError::MissingToken(_))));

        let config = AppConfig { api_token: Some("t".into()), ..Default::default() };
        assert_eq!(HttpConfig::from_app(&config).unwrap().token, "t");
    }

    #[test]
    fn test_transport_rejects_bad_base_url() {
        let config = HttpConfig { base_url: "not a url".into(), token: "t".into(), ..Default::default() };
        assert!(matches!(HttpTransport::new(config), Err(FetchError::InvalidRequest(_))));
    }

    #[test]
    fn test_with_query_skips_blank() {
        let request = ApiRequest::get("/cities").with_query("region", "  ").with_query("locality", "Split");
        assert_eq!(request.query, vec![("locality".to_string(), "Split".to_string())]);
    }

    #[tokio::test]
    async fn test_get_sends_token_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/cities"))
            .and(query_param("region", "Grad Zagreb"))
            .and(header_eq("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["Zagreb"])))
            .expect(1)
            .mount(&server)
            .await;

        let request = ApiRequest::get("/cities").with_query("region", "Grad Zagreb");
        let response = transport_for(&server).send(&request).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        let cities: Vec<String> = response.json().unwrap();
        assert_eq!(cities, vec!["Zagreb"]);
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "interests": "programiranje", "programs": [] });
        Mock::given(method("POST"))
            .and(path("/api/v1/institutions/recommendations"))
            .and(body_json(body.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "explanation": "ok" })))
            .mount(&server)
            .await;

        let request = ApiRequest::post_json("/institutions/recommendations", &body).unwrap();
        let response = transport_for(&server).send(&request).await.unwrap();
        assert!(response.status.is_success());
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let response = transport_for(&server).send(&ApiRequest::get("/regions")).await.unwrap();
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(HttpConfig {
            base_url: server.uri(),
            token: "secret".to_string(),
            timeout: Duration::from_millis(50),
            ..Default::default()
        })
        .unwrap();

        let err = transport.send(&ApiRequest::get("/regions")).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
    }

    #[test]
    fn test_response_json_parse_error() {
        let response = ApiResponse::new(StatusCode::OK, "not json");
        assert!(matches!(response.json::<Vec<String>>(), Err(FetchError::Parse(_))));
    }
}
