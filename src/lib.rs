//! # Response Cache Middleware
//!
//! A Redis-backed HTTP response-caching middleware for Tower/Axum services.
//! The middleware sits between the routing layer and the handlers, serves
//! previously computed responses from Redis for eligible requests, and
//! degrades transparently to pass-through behavior when Redis is unavailable.
//!
//! ## Features
//! - Deterministic, namespaced cache keys (`prefix::METHOD::path::hash`)
//! - Path-based include/exclude eligibility rules, fixed at initialization
//! - `no-store` directive support on requests and responses
//! - TTL-bounded entries with no-stale-reads semantics
//! - Graceful degradation: a dead or slow cache backend never fails a request
//!
//! ## Usage Example
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use response_cache::{PathRule, ResponseCacheConfig, ResponseCacheLayer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResponseCacheConfig {
//!         prefix: "app".to_string(),
//!         rules: vec![PathRule::exclude("/health")],
//!         ..Default::default()
//!     };
//!
//!     let app: Router = Router::new()
//!         .route("/items", get(|| async { "items" }))
//!         .route("/health", get(|| async { "ok" }))
//!         .layer(ResponseCacheLayer::new(config)?);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

/// Error types, configuration, and the request/response data model
pub mod core;

/// Cache key derivation from request descriptors
pub mod key;

/// Path-based cache eligibility rules
pub mod policy;

/// Cache-control directive parsing
pub mod directive;

/// Store adapters over the key-value backend
pub mod stores;

/// The caching decision pipeline as a Tower layer
pub mod middleware;

pub use crate::core::config::{RedisConfig, ResponseCacheConfig};
pub use crate::core::error::{CacheError, CacheResult};
pub use crate::core::types::{CachedResponse, RequestDescriptor};
pub use key::{KeyDeriver, KEY_DELIMITER};
pub use middleware::{ResponseCacheLayer, ResponseCacheService};
pub use policy::{PathRule, PathRules, RuleKind};
pub use stores::{InMemoryStore, Lookup, RedisStore, ResponseStore};
