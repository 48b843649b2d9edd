//! # Cache Middleware
//!
//! The caching decision pipeline as a Tower layer. Per request:
//! eligibility check → key derivation → store lookup → on miss (or backend
//! failure) invoke the downstream service → conditionally store the result →
//! return. A client sees identical responses whether the cache hit, missed,
//! or the backend was down; the only observable difference is latency.

use crate::core::config::ResponseCacheConfig;
use crate::core::error::CacheResult;
use crate::core::types::{CachedResponse, RequestDescriptor};
use crate::directive::has_directive;
use crate::key::KeyDeriver;
use crate::policy::PathRules;
use crate::stores::{Lookup, RedisStore, ResponseStore};
use axum::body::Body;
use axum::extract::Request;
use axum::http::response::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Shared, immutable per-layer state
struct CacheState {
    config: ResponseCacheConfig,
    deriver: KeyDeriver,
    rules: PathRules,
    store: Arc<dyn ResponseStore>,
}

impl CacheState {
    fn is_method_cacheable(&self, method: &str) -> bool {
        self.config
            .cacheable_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
    }

    fn is_response_cacheable(&self, parts: &Parts, body: &[u8]) -> bool {
        self.config
            .cacheable_status_codes
            .contains(&parts.status.as_u16())
            && body.len() <= self.config.max_response_size
            && !has_directive(
                &parts.headers,
                &self.config.control_header,
                &self.config.no_store_token,
            )
    }

    /// Stamp diagnostic headers and hand the response back to the caller
    fn finish(&self, mut response: Response, hit: bool, started: Instant) -> Response {
        if !self.config.diagnostic_headers {
            return response;
        }

        let verdict = if hit { "HIT" } else { "MISS" };
        response
            .headers_mut()
            .insert("x-cache", HeaderValue::from_static(verdict));

        let elapsed = format!("{:.6}", started.elapsed().as_secs_f64());
        if let Ok(value) = HeaderValue::from_str(&elapsed) {
            response.headers_mut().insert("x-processing-time", value);
        }

        response
    }
}

/// Tower layer applying response caching to a wrapped service
#[derive(Clone)]
pub struct ResponseCacheLayer {
    state: Arc<CacheState>,
}

impl ResponseCacheLayer {
    /// Create a layer backed by Redis.
    ///
    /// Fails fast on invalid configuration; an unreachable Redis is not an
    /// error here and degrades per-request instead.
    pub fn new(config: ResponseCacheConfig) -> CacheResult<Self> {
        config.validate()?;
        let store = Arc::new(RedisStore::new(config.redis.clone())?);
        Self::with_store(config, store)
    }

    /// Create a layer over any store implementation
    pub fn with_store(
        config: ResponseCacheConfig,
        store: Arc<dyn ResponseStore>,
    ) -> CacheResult<Self> {
        config.validate()?;
        let deriver = KeyDeriver::new(config.prefix.clone());
        let rules = PathRules::new(config.base_path.clone(), config.rules.clone());

        Ok(Self {
            state: Arc::new(CacheState {
                config,
                deriver,
                rules,
                store,
            }),
        })
    }
}

impl<S> Layer<S> for ResponseCacheLayer {
    type Service = ResponseCacheService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseCacheService {
            inner,
            state: self.state.clone(),
        }
    }
}

/// Service wrapper running the caching pipeline around `S`
#[derive(Clone)]
pub struct ResponseCacheService<S> {
    inner: S,
    state: Arc<CacheState>,
}

impl<S> Service<Request> for ResponseCacheService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let state = self.state.clone();
        let clone = self.inner.clone();
        // The original service is the one poll_ready was called on
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let started = Instant::now();

            let eligible = state.is_method_cacheable(req.method().as_str())
                && state.rules.is_eligible(req.uri().path());
            if !eligible {
                let response = inner.call(req).await?;
                return Ok(state.finish(response, false, started));
            }

            let descriptor = RequestDescriptor::from_request(&req, &state.config.vary_headers);
            let key = state.deriver.derive(&descriptor);

            match state.store.get(&key).await {
                Lookup::Hit(entry) => {
                    debug!(%key, "cache hit");
                    return Ok(state.finish(entry.into_response(), true, started));
                }
                Lookup::Miss => debug!(%key, "cache miss"),
                Lookup::Unavailable(err) => {
                    // Core resilience guarantee: backend failure degrades to
                    // uncached operation, never to request failure
                    warn!(%key, error = %err, "cache backend unavailable, passing through");
                }
            }

            let no_store_requested = has_directive(
                req.headers(),
                &state.config.control_header,
                &state.config.no_store_token,
            );

            // Downstream errors propagate unchanged
            let response = inner.call(req).await?;
            let (parts, body) = response.into_parts();

            let bytes = match axum::body::to_bytes(body, usize::MAX).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(%key, error = %err, "failed to buffer downstream response body");
                    let mut failed = Response::new(Body::empty());
                    *failed.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                    return Ok(state.finish(failed, false, started));
                }
            };

            if !no_store_requested && state.is_response_cacheable(&parts, &bytes) {
                let entry = CachedResponse::from_parts(parts.status, &parts.headers, &bytes);
                if let Err(err) = state
                    .store
                    .set(&key, &entry, state.config.default_ttl)
                    .await
                {
                    warn!(%key, error = %err, "failed to store response, serving uncached");
                }
            }

            let response = Response::from_parts(parts, Body::from(bytes));
            Ok(state.finish(response, false, started))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ResponseCacheConfig;
    use crate::stores::InMemoryStore;

    #[test]
    fn test_layer_rejects_invalid_config() {
        let config = ResponseCacheConfig {
            prefix: String::new(),
            ..Default::default()
        };
        assert!(ResponseCacheLayer::with_store(config, Arc::new(InMemoryStore::new())).is_err());
    }

    #[test]
    fn test_method_eligibility_is_case_insensitive() {
        let config = ResponseCacheConfig::default();
        let layer =
            ResponseCacheLayer::with_store(config, Arc::new(InMemoryStore::new())).unwrap();
        assert!(layer.state.is_method_cacheable("get"));
        assert!(layer.state.is_method_cacheable("GET"));
        assert!(!layer.state.is_method_cacheable("POST"));
    }
}
