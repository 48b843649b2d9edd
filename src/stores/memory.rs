//! # In-Memory Store
//!
//! A process-local store used by the test suite and for running without a
//! Redis backend. Entries expire lazily on read. Time is measured with
//! `tokio::time::Instant`, so tests driving a paused clock see real TTL
//! behavior.

use super::{Lookup, ResponseStore};
use crate::core::error::CacheResult;
use crate::core::types::CachedResponse;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

struct StoredEntry {
    entry: CachedResponse,
    expires_at: Instant,
}

/// In-memory response store backed by a concurrent map
#[derive(Default)]
pub struct InMemoryStore {
    entries: DashMap<String, StoredEntry>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ResponseStore for InMemoryStore {
    async fn get(&self, key: &str) -> Lookup {
        let expired = match self.entries.get(key) {
            Some(stored) if stored.expires_at > Instant::now() => {
                return Lookup::Hit(stored.entry.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        Lookup::Miss
    }

    async fn set(&self, key: &str, entry: &CachedResponse, ttl: Duration) -> CacheResult<()> {
        self.entries.insert(
            key.to_string(),
            StoredEntry {
                entry: entry.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};

    fn entry(body: &[u8]) -> CachedResponse {
        CachedResponse::from_parts(StatusCode::OK, &HeaderMap::new(), body)
    }

    #[tokio::test]
    async fn test_set_then_get_hits() {
        let store = InMemoryStore::new();
        store
            .set("k", &entry(b"value"), Duration::from_secs(60))
            .await
            .unwrap();

        match store.get("k").await {
            Lookup::Hit(e) => assert_eq!(e.body, b"value"),
            other => panic!("expected hit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_key_misses() {
        let store = InMemoryStore::new();
        assert!(matches!(store.get("missing").await, Lookup::Miss));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_reads_as_miss() {
        let store = InMemoryStore::new();
        store
            .set("k", &entry(b"value"), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(matches!(store.get("k").await, Lookup::Miss));
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_survives_until_ttl() {
        let store = InMemoryStore::new();
        store
            .set("k", &entry(b"value"), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;

        assert!(matches!(store.get("k").await, Lookup::Hit(_)));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_entry() {
        let store = InMemoryStore::new();
        store
            .set("k", &entry(b"old"), Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set("k", &entry(b"new"), Duration::from_secs(60))
            .await
            .unwrap();

        match store.get("k").await {
            Lookup::Hit(e) => assert_eq!(e.body, b"new"),
            other => panic!("expected hit, got {:?}", other),
        }
        assert_eq!(store.len(), 1);
    }
}
