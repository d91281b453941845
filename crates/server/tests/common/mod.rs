//! Common test utilities for in-process E2E testing.
//!
//! Drives the real router through `tower::ServiceExt::oneshot` with a mock
//! debrid registry injected, so no external infrastructure is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use debridge_core::testing::{MockDebridClient, MockRegistry};
use debridge_core::Config;
use debridge_server::api::create_router;
use debridge_server::state::AppState;

/// Re-export fixtures for test convenience
pub use debridge_core::testing::fixtures;

/// In-process server with a controllable mock debrid client.
pub struct TestFixture {
    pub router: Router,
    /// Handle to the mock client handed out by the registry.
    pub client: MockDebridClient,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Raw body text (HTML pages, redirects).
    pub text: String,
    /// Body parsed as JSON, `Null` when it is not JSON.
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_client(MockDebridClient::new())
    }

    pub fn with_client(client: MockDebridClient) -> Self {
        Self::build(Config::default(), client, false)
    }

    pub fn with_config(config: Config, client: MockDebridClient) -> Self {
        Self::build(config, client, false)
    }

    /// Fixture whose registry knows no providers at all.
    pub fn with_empty_registry() -> Self {
        Self::build(Config::default(), MockDebridClient::new(), true)
    }

    fn build(config: Config, client: MockDebridClient, empty_registry: bool) -> Self {
        let registry = if empty_registry {
            MockRegistry::default()
        } else {
            MockRegistry::with_client(client.clone())
        };
        let state = Arc::new(AppState::new(config, Arc::new(registry)));

        Self {
            router: create_router(state),
            client,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Send an OPTIONS preflight request.
    pub async fn options(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method("OPTIONS").uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a user config token the way the configure page's script does,
/// percent-encoded for safe embedding in a URL path segment.
pub fn token(provider: &str, api_key: &str, max_results: usize) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    let raw = STANDARD.encode(format!(
        r#"{{"debridProvider":"{provider}","apiKey":"{api_key}","maxResults":{max_results}}}"#
    ));
    urlencoding::encode(&raw).into_owned()
}
