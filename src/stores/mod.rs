//! # Store Adapters
//!
//! Thin interface over the key-value backend. Lookups return an explicit
//! outcome so the middleware's branching is total: a miss is never conflated
//! with a backend failure.

pub mod memory;
pub mod redis_store;

pub use memory::InMemoryStore;
pub use redis_store::RedisStore;

use crate::core::error::{CacheError, CacheResult};
use crate::core::types::CachedResponse;
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of a cache lookup
#[derive(Debug)]
pub enum Lookup {
    /// An unexpired entry was found
    Hit(CachedResponse),

    /// No entry (or an expired one) exists for the key
    Miss,

    /// The backend could not serve the lookup; treated as a miss by the
    /// middleware but kept distinct for logging and health reporting
    Unavailable(CacheError),
}

/// Trait for response store implementations.
///
/// Implementations must be safe for concurrent use without external locking;
/// the middleware shares one store handle across all in-flight requests.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Look up an entry by key
    async fn get(&self, key: &str) -> Lookup;

    /// Write an entry with the given TTL. Write failures are reported but
    /// must never fail the request that triggered them; the caller logs and
    /// continues.
    async fn set(&self, key: &str, entry: &CachedResponse, ttl: Duration) -> CacheResult<()>;

    /// Probe backend connectivity
    async fn health_check(&self) -> bool;
}
