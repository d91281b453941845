use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::debug;

use debridge_core::{gateway, DebridError, Manifest, StreamsResponse, UserConfig};

use super::pages;
use crate::metrics::RATE_LIMITED_TOTAL;
use crate::state::AppState;

/// Stream responses may be cached briefly by the client.
const STREAM_CACHE_CONTROL: &str = "max-age=300, private";

/// Liveness probe.
pub async fn ping() -> &'static str {
    "OK"
}

pub async fn root() -> Response {
    found("/configure")
}

pub async fn metrics() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::encode_metrics(),
    )
        .into_response()
}

pub async fn configure() -> Html<String> {
    Html(pages::render_configure(&UserConfig::default()))
}

pub async fn configure_with_token(Path(token): Path<String>) -> Html<String> {
    let config = UserConfig::from_token(Some(&token));
    Html(pages::render_configure(&config))
}

/// Serves both the bare and the token-prefixed manifest route; the token
/// carries no manifest-relevant settings.
pub async fn manifest(State(state): State<Arc<AppState>>) -> Json<Manifest> {
    Json(state.manifest())
}

pub async fn stream(
    State(state): State<Arc<AppState>>,
    Path((title_type, id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    handle_stream(state, None, title_type, id, None, query, headers).await
}

pub async fn stream_with_extra(
    State(state): State<Arc<AppState>>,
    Path((title_type, id, extra)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    handle_stream(state, None, title_type, id, Some(extra), query, headers).await
}

pub async fn stream_with_token(
    State(state): State<Arc<AppState>>,
    Path((token, title_type, id)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    handle_stream(state, Some(token), title_type, id, None, query, headers).await
}

pub async fn stream_with_token_and_extra(
    State(state): State<Arc<AppState>>,
    Path((token, title_type, id, extra)): Path<(String, String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    handle_stream(state, Some(token), title_type, id, Some(extra), query, headers).await
}

/// Common stream lookup path.
///
/// Always answers 200 with a streams array for well-formed routes; domain
/// problems are rendered as informational entries by the gateway layer.
async fn handle_stream(
    state: Arc<AppState>,
    token: Option<String>,
    title_type: String,
    id: String,
    extra: Option<String>,
    query: HashMap<String, String>,
    headers: HeaderMap,
) -> Response {
    if title_type != "movie" && title_type != "series" {
        return StatusCode::NOT_FOUND.into_response();
    }

    // With an extra segment the id is bare and the suffix sits on the
    // extra; without one the id itself carries it.
    let (external_id, extra_raw) = match extra {
        Some(extra) => match extra.strip_suffix(".json") {
            Some(extra) => (id, Some(extra.to_string())),
            None => return StatusCode::NOT_FOUND.into_response(),
        },
        None => match id.strip_suffix(".json") {
            Some(id) => (id.to_string(), None),
            None => return StatusCode::NOT_FOUND.into_response(),
        },
    };

    let external_id = if external_id.starts_with("tt") {
        external_id
    } else {
        format!("tt{external_id}")
    };

    // Query parameters take precedence over the path extra segment
    let extra_params = if !query.is_empty() {
        query
    } else {
        parse_extra(extra_raw.as_deref())
    };

    let config = UserConfig::from_token(token.as_deref());
    let base_url = state.base_url(host_header(&headers).as_deref());

    let streams = gateway::list_streams(
        state.registry(),
        &config,
        &title_type,
        &external_id,
        &extra_params,
        &base_url,
    )
    .await;

    (
        [(header::CACHE_CONTROL, STREAM_CACHE_CONTROL)],
        Json(StreamsResponse { streams }),
    )
        .into_response()
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path((provider, api_key, id, host_url)): Path<(String, String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let client = client_ip(&headers);

    if !state.admit(client).await {
        debug!(%client, "Resolve rejected by rate limiter");
        RATE_LIMITED_TOTAL
            .with_label_values(&["/resolve/{provider}/{ref}"])
            .inc();
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "rate_limited",
                "message": "Too many resolve requests, slow down"
            })),
        )
            .into_response();
    }

    match gateway::resolve_direct_url(
        state.registry(),
        &provider,
        &api_key,
        &id,
        &host_url,
        Some(client),
    )
    .await
    {
        Ok(url) => found(&url),
        Err(e) => error_response(e),
    }
}

/// Map the closed error set onto HTTP statuses for the resolve boundary.
fn error_response(error: DebridError) -> Response {
    let status = match &error {
        DebridError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
        DebridError::MissingApiKey => StatusCode::UNAUTHORIZED,
        DebridError::ComingSoon(_) => StatusCode::NOT_IMPLEMENTED,
        DebridError::ResolutionFailed(_) => StatusCode::NOT_FOUND,
        DebridError::Api { .. } | DebridError::ConnectionFailed(_) => StatusCode::BAD_GATEWAY,
        DebridError::Timeout => StatusCode::GATEWAY_TIMEOUT,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

/// 302 with a Location header; `Redirect` only offers 303/307/308.
fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// Parse an `&`-joined `key=value` path segment.
fn parse_extra(extra: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let Some(extra) = extra else {
        return params;
    };

    for pair in extra.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if key.is_empty() || value.is_empty() {
                continue;
            }
            let key = urlencoding::decode(key)
                .map(|k| k.into_owned())
                .unwrap_or_else(|_| key.to_string());
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            params.insert(key, value);
        }
    }
    params
}

fn host_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(|host| host.to_string())
}

/// Best-effort client address for rate limiting and resolve tracing.
fn client_ip(headers: &HeaderMap) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extra_pairs() {
        let params = parse_extra(Some("season=1&episode=2"));
        assert_eq!(params.get("season").map(String::as_str), Some("1"));
        assert_eq!(params.get("episode").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_parse_extra_skips_degenerate_pairs() {
        let params = parse_extra(Some("=1&key=&plain"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_extra_percent_decodes() {
        let params = parse_extra(Some("videoSize=1%2C5GB"));
        assert_eq!(params.get("videoSize").map(String::as_str), Some("1,5GB"));
    }

    #[test]
    fn test_parse_extra_none() {
        assert!(parse_extra(None).is_empty());
    }

    #[test]
    fn test_client_ip_from_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers).to_string(), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_defaults_to_localhost() {
        assert_eq!(client_ip(&HeaderMap::new()).to_string(), "127.0.0.1");
    }
}
