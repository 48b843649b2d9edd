//! # Cache-Control Directive Parsing
//!
//! Detects an explicit no-store override in a designated control header.
//! The match is token-based over the header's comma-separated directive
//! list, case-insensitive, and ignores any `=value` suffix. An absent
//! header means no suppression was requested.

use axum::http::HeaderMap;

/// Report whether the given header carries the directive token.
///
/// All values of the header are scanned, so repeated headers behave the
/// same as a single comma-joined value.
pub fn has_directive(headers: &HeaderMap, header_name: &str, token: &str) -> bool {
    headers
        .get_all(header_name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|directive| {
            let name = directive.trim().split('=').next().unwrap_or("");
            name.eq_ignore_ascii_case(token)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert("cache-control", HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_absent_header_means_no_suppression() {
        assert!(!has_directive(&HeaderMap::new(), "cache-control", "no-store"));
    }

    #[test]
    fn test_single_token_detected() {
        assert!(has_directive(&headers("no-store"), "cache-control", "no-store"));
    }

    #[test]
    fn test_token_detected_in_directive_list() {
        assert!(has_directive(
            &headers("max-age=60, no-store, private"),
            "cache-control",
            "no-store"
        ));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert!(has_directive(&headers("No-Store"), "cache-control", "no-store"));
    }

    #[test]
    fn test_substring_does_not_match() {
        assert!(!has_directive(&headers("no-store-x"), "cache-control", "no-store"));
        assert!(!has_directive(&headers("x-no-store"), "cache-control", "no-store"));
    }

    #[test]
    fn test_valued_directive_does_not_match_other_tokens() {
        assert!(!has_directive(&headers("max-age=60"), "cache-control", "no-store"));
    }

    #[test]
    fn test_repeated_headers_are_scanned() {
        let mut map = HeaderMap::new();
        map.append("cache-control", HeaderValue::from_static("max-age=60"));
        map.append("cache-control", HeaderValue::from_static("no-store"));
        assert!(has_directive(&map, "cache-control", "no-store"));
    }
}
