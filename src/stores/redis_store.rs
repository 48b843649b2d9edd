//! # Redis Store
//!
//! Redis-backed response store. The connection is established lazily so an
//! unreachable backend at startup degrades to pass-through instead of
//! failing initialization; every operation is bounded by the configured
//! timeout and any failure normalizes to the backend-unavailable outcome.

use super::{Lookup, ResponseStore};
use crate::core::config::RedisConfig;
use crate::core::error::{CacheError, CacheResult};
use crate::core::types::CachedResponse;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Redis response store
pub struct RedisStore {
    config: RedisConfig,
    client: Client,
    connection: Arc<RwLock<Option<ConnectionManager>>>,
}

impl RedisStore {
    /// Create a store for the configured backend.
    ///
    /// Only the connection URL is validated here; the connection itself is
    /// established on first use so a dead backend is a per-request
    /// `Unavailable`, not an initialization failure.
    pub fn new(config: RedisConfig) -> CacheResult<Self> {
        let client = Client::open(normalize_redis_url(&config.url).as_str())
            .map_err(|e| CacheError::config(format!("invalid redis url: {}", e)))?;

        Ok(Self {
            config,
            client,
            connection: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the shared connection, establishing it if needed
    async fn connection(&self) -> Option<ConnectionManager> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Some(conn.clone());
        }

        let mut slot = self.connection.write().await;
        // Another request may have connected while we waited for the lock
        if let Some(conn) = slot.as_ref() {
            return Some(conn.clone());
        }

        match timeout(
            self.config.connection_timeout,
            ConnectionManager::new(self.client.clone()),
        )
        .await
        {
            Ok(Ok(conn)) => {
                info!(url = %self.config.url, "connected to redis");
                *slot = Some(conn.clone());
                Some(conn)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "failed to connect to redis");
                None
            }
            Err(_) => {
                warn!(
                    timeout = ?self.config.connection_timeout,
                    "timed out connecting to redis"
                );
                None
            }
        }
    }
}

#[async_trait]
impl ResponseStore for RedisStore {
    async fn get(&self, key: &str) -> Lookup {
        let Some(mut conn) = self.connection().await else {
            return Lookup::Unavailable(CacheError::unavailable("no redis connection"));
        };

        let lookup = timeout(
            self.config.operation_timeout,
            conn.get::<_, Option<Vec<u8>>>(key),
        )
        .await;

        match lookup {
            Ok(Ok(Some(bytes))) => match CachedResponse::from_bytes(&bytes) {
                Ok(entry) => Lookup::Hit(entry),
                Err(err) => {
                    // A corrupt entry is replaced on the next store, never
                    // surfaced as a failure
                    warn!(%key, error = %err, "discarding undecodable cache entry");
                    Lookup::Miss
                }
            },
            Ok(Ok(None)) => Lookup::Miss,
            Ok(Err(err)) => Lookup::Unavailable(CacheError::Redis(err)),
            Err(_) => Lookup::Unavailable(CacheError::Timeout),
        }
    }

    async fn set(&self, key: &str, entry: &CachedResponse, ttl: Duration) -> CacheResult<()> {
        let Some(mut conn) = self.connection().await else {
            return Err(CacheError::unavailable("no redis connection"));
        };

        let bytes = entry.to_bytes()?;
        let written = timeout(
            self.config.operation_timeout,
            conn.set_ex::<_, _, ()>(key, bytes, ttl.as_secs()),
        )
        .await;

        match written {
            Ok(Ok(())) => {
                debug!(%key, ?ttl, "stored response");
                Ok(())
            }
            Ok(Err(err)) => Err(CacheError::Redis(err)),
            Err(_) => Err(CacheError::Timeout),
        }
    }

    async fn health_check(&self) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };

        let pong = timeout(
            self.config.operation_timeout,
            redis::cmd("PING").query_async::<_, String>(&mut conn),
        )
        .await;

        matches!(pong, Ok(Ok(response)) if response == "PONG")
    }
}

/// Accept connection strings with or without an explicit scheme
fn normalize_redis_url(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("redis://{}", url)
    }
}
