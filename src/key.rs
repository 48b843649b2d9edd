//! # Cache Key Derivation
//!
//! Maps a [`RequestDescriptor`] to a namespaced cache key of the form
//! `prefix::METHOD::path::hash`. The method and path segments stay readable
//! so operators can inspect or purge keys by prefix pattern; the trailing
//! segment is a SHA-256 digest over the descriptor's normalized query and
//! tracked headers.

use crate::core::types::RequestDescriptor;
use sha2::{Digest, Sha256};

/// Delimiter between key segments. Reserved: raw segment values are
/// sanitized so this sequence can never occur inside a segment.
pub const KEY_DELIMITER: &str = "::";

/// Derives cache keys within a fixed namespace.
///
/// Deterministic: identical descriptors always yield identical keys, and
/// distinct namespaces never collide even for identical request shapes.
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    prefix: String,
}

impl KeyDeriver {
    /// Create a deriver for the given namespace prefix
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Derive the cache key for a request descriptor
    pub fn derive(&self, descriptor: &RequestDescriptor) -> String {
        let mut hasher = Sha256::new();
        hasher.update(descriptor.canonical_query().as_bytes());
        for (name, value) in descriptor.tracked_headers() {
            hasher.update([0u8]);
            hasher.update(name.as_bytes());
            hasher.update([b'=']);
            hasher.update(value.as_bytes());
        }
        let digest = hex::encode(hasher.finalize());

        [
            sanitize_segment(&self.prefix),
            sanitize_segment(&descriptor.method),
            sanitize_segment(&descriptor.path),
            digest,
        ]
        .join(KEY_DELIMITER)
    }
}

/// Escape a raw segment value so it cannot contain the key delimiter.
/// `%` is escaped first, making the mapping injective.
fn sanitize_segment(raw: &str) -> String {
    raw.replace('%', "%25").replace(':', "%3A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};

    fn descriptor(uri: &str) -> RequestDescriptor {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(())
            .unwrap();
        RequestDescriptor::from_request(&req, &[])
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let deriver = KeyDeriver::new("app");
        assert_eq!(
            deriver.derive(&descriptor("/items?a=1")),
            deriver.derive(&descriptor("/items?a=1"))
        );
    }

    #[test]
    fn test_query_order_does_not_affect_key() {
        let deriver = KeyDeriver::new("app");
        assert_eq!(
            deriver.derive(&descriptor("/items?b=2&a=1")),
            deriver.derive(&descriptor("/items?a=1&b=2"))
        );
    }

    #[test]
    fn test_distinct_queries_produce_distinct_keys() {
        let deriver = KeyDeriver::new("app");
        assert_ne!(
            deriver.derive(&descriptor("/items?a=1")),
            deriver.derive(&descriptor("/items?a=2"))
        );
    }

    #[test]
    fn test_distinct_paths_produce_distinct_keys() {
        let deriver = KeyDeriver::new("app");
        assert_ne!(
            deriver.derive(&descriptor("/items")),
            deriver.derive(&descriptor("/orders"))
        );
    }

    #[test]
    fn test_distinct_namespaces_never_collide() {
        let desc = descriptor("/items");
        assert_ne!(
            KeyDeriver::new("app-a").derive(&desc),
            KeyDeriver::new("app-b").derive(&desc)
        );
    }

    #[test]
    fn test_key_exposes_method_and_path_segments() {
        let deriver = KeyDeriver::new("app");
        let key = deriver.derive(&descriptor("/subpath/items"));
        let segments: Vec<&str> = key.split(KEY_DELIMITER).collect();

        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], "app");
        assert_eq!(segments[1], "GET");
        assert_eq!(segments[2], "/subpath/items");
        assert_eq!(segments[3].len(), 64);
    }

    #[test]
    fn test_delimiter_in_raw_segment_is_escaped() {
        let deriver = KeyDeriver::new("ns::with::colons");
        let key = deriver.derive(&descriptor("/a::b"));
        // Still exactly four segments after sanitization
        assert_eq!(key.split(KEY_DELIMITER).count(), 4);
    }

    #[test]
    fn test_sanitization_is_injective() {
        assert_ne!(sanitize_segment("a:b"), sanitize_segment("a%3Ab"));
    }

    #[test]
    fn test_tracked_header_affects_key() {
        let deriver = KeyDeriver::new("app");
        let tracked = vec!["accept".to_string()];

        let json = Request::builder()
            .uri("/items")
            .header("accept", "application/json")
            .body(())
            .unwrap();
        let html = Request::builder()
            .uri("/items")
            .header("accept", "text/html")
            .body(())
            .unwrap();

        assert_ne!(
            deriver.derive(&RequestDescriptor::from_request(&json, &tracked)),
            deriver.derive(&RequestDescriptor::from_request(&html, &tracked))
        );
    }
}
