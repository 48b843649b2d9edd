//! # Core Types
//!
//! The request descriptor consumed by key derivation and the cached entry
//! stored in the backend.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::core::error::CacheResult;

/// Sentinel recorded for a tracked header that is absent from the request.
/// Distinct from a header explicitly set to the empty string.
pub(crate) const ABSENT_HEADER_SENTINEL: &str = "\u{0}";

/// Headers never persisted with a cached entry. The replacements are
/// recomputed by the HTTP stack when the entry is replayed.
const HOP_BY_HOP_HEADERS: &[&str] = &["connection", "transfer-encoding", "content-length"];

/// Normalized view of a request used for cache key derivation.
///
/// Constructed per incoming request and discarded after the key is derived.
/// Query parameters are sorted so that parameter order never affects the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Request method, e.g. `GET`
    pub method: String,

    /// Full request path, including any mount prefix
    pub path: String,

    /// Query pairs, sorted by (name, value), duplicates preserved
    query: Vec<(String, String)>,

    /// Tracked header values in configured order; absent headers carry the
    /// sentinel value
    headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Build a descriptor from a request and the configured header subset
    pub fn from_request<B>(req: &Request<B>, tracked_headers: &[String]) -> Self {
        let mut query: Vec<(String, String)> = req
            .uri()
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        query.sort();

        let headers = tracked_headers
            .iter()
            .map(|name| {
                let name = name.to_ascii_lowercase();
                let value = req
                    .headers()
                    .get(name.as_str())
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or(ABSENT_HEADER_SENTINEL)
                    .to_string();
                (name, value)
            })
            .collect();

        Self {
            method: req.method().as_str().to_string(),
            path: req.uri().path().to_string(),
            query,
            headers,
        }
    }

    /// Re-encoded query string with pairs in sorted order
    pub fn canonical_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.query {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }

    /// Tracked header pairs in configured order
    pub fn tracked_headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// A cached response entry.
///
/// Owned by the store once written; the middleware replaces entries whole and
/// never mutates one in place. Header order and duplicates are preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers, hop-by-hop headers excluded
    pub headers: Vec<(String, String)>,

    /// Response body bytes
    pub body: Vec<u8>,

    /// When the entry was written
    pub cached_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Capture a downstream response for storage
    pub fn from_parts(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Self {
        let headers = headers
            .iter()
            .filter(|(name, _)| !HOP_BY_HOP_HEADERS.contains(&name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Self {
            status: status.as_u16(),
            headers,
            body: body.to_vec(),
            cached_at: Utc::now(),
        }
    }

    /// Serialize the entry for the store
    pub fn to_bytes(&self) -> CacheResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize an entry read back from the store
    pub fn from_bytes(bytes: &[u8]) -> CacheResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Rebuild the response exactly as the downstream handler produced it.
    /// Headers that no longer parse are skipped rather than failing the replay.
    pub fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.append(name, value);
            }
        }

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
