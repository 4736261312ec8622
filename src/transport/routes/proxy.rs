use std::sync::Arc;

use axum::{
    body::{Body, HttpBody},
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use reqwest::Url;
use serde::Deserialize;

use crate::{common::ApiError, server::AppState};

#[derive(Debug, Deserialize)]
struct ProxyQuery {
    url: Option<String>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    #[error("Missing required query parameter 'url'")]
    MissingUrl,
    #[error("Invalid target url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Upstream resource named by the `url` query parameter.
///
/// Only the target's origin, path and query matter: the path the request
/// arrived on under `/proxy` is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    url: Url,
}

impl ProxyTarget {
    pub fn parse(raw: &str) -> Result<Self, ProxyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ProxyError::MissingUrl);
        }

        let invalid = |reason: String| ProxyError::InvalidUrl {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self { url })
    }

    /// Reads the target from a raw request query string.
    pub fn from_uri(uri: &Uri) -> Result<Self, ProxyError> {
        let Query(query) = Query::<ProxyQuery>::try_from_uri(uri).map_err(|e| {
            ProxyError::InvalidUrl {
                url: uri.query().unwrap_or_default().to_string(),
                reason: e.body_text(),
            }
        })?;
        Self::parse(query.url.as_deref().unwrap_or_default())
    }

    /// `scheme://host[:port]`
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// `?query`, or empty when the target has none.
    pub fn search(&self) -> String {
        self.url
            .query()
            .map(|q| format!("?{}", q))
            .unwrap_or_default()
    }

    pub fn path_and_query(&self) -> String {
        format!("{}{}", self.path(), self.search())
    }

    /// Full upstream URL: origin joined with path and query, fragment dropped.
    pub fn upstream_url(&self) -> Url {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url
    }
}

/// Headers that describe a single connection and are never forwarded.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Overwrites CORS headers so browsers accept proxied content from any page.
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
}

/// Header names a sender listed in `Connection`; they apply to that hop only.
fn connection_tokens(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect()
}

fn end_to_end_headers(headers: &HeaderMap, extra: usize) -> HeaderMap {
    let nominated = connection_tokens(headers);
    let mut forwarded = HeaderMap::with_capacity(headers.len() + extra);
    for (name, value) in headers {
        if is_hop_by_hop(name) || nominated.contains(name) {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    forwarded
}

fn forwarded_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = end_to_end_headers(headers, 0);
    // Host is rewritten to the target by the client.
    forwarded.remove(header::HOST);
    forwarded
}

fn forwarded_response_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = end_to_end_headers(headers, 3);
    apply_cors_headers(&mut forwarded);
    forwarded
}

/// ANY /proxy?url=<absolute url>
///
/// Streams the request to the target and the upstream response back without
/// buffering either body. Dropping the response (client went away) drops the
/// upstream body stream and closes that connection.
pub async fn proxy_request(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    if method == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }

    let target = ProxyTarget::from_uri(&uri).map_err(|e| {
        tracing::warn!("{} {}: {}", method, uri.path(), e);
        ApiError::bad_request(e.to_string())
    })?;

    tracing::debug!(
        "{} {} -> {}{}",
        method,
        uri.path(),
        target.origin(),
        target.path_and_query()
    );

    let mut request = state
        .proxy_client
        .request(method.clone(), target.upstream_url())
        .headers(forwarded_request_headers(&headers));

    if body.size_hint().exact() != Some(0) {
        request = request.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    let upstream = request.send().await.map_err(|e| {
        tracing::warn!("{} {} failed: {}", method, target.origin(), e);
        ApiError::bad_gateway(format!("Upstream request failed: {}", e))
    })?;

    let status = upstream.status();
    tracing::debug!(
        "{} {}{} <- {}",
        method,
        target.origin(),
        target.path(),
        status
    );

    let headers = forwarded_response_headers(upstream.headers());
    let origin = target.origin();
    let body = upstream
        .bytes_stream()
        .inspect_err(move |e| tracing::warn!("Upstream body from {} aborted: {}", origin, e));
    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
