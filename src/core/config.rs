//! # Configuration Module
//!
//! Process-wide configuration for the response cache, set once at startup.
//! Invalid configuration is a fatal initialization error; nothing here is
//! mutable after the middleware has been constructed.

use crate::core::error::{CacheError, CacheResult};
use crate::policy::PathRule;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseCacheConfig {
    /// Namespace prefix, the first segment of every cache key
    pub prefix: String,

    /// TTL applied to every stored entry
    #[serde(with = "humantime_serde")]
    pub default_ttl: Duration,

    /// Mount point of the application this middleware wraps. Include and
    /// exclude patterns are resolved relative to this base, while cache keys
    /// keep the full request path.
    pub base_path: String,

    /// Ordered include/exclude path rules. Exclusion always wins; within a
    /// category the first declared matching rule wins. With no include rules
    /// every non-excluded path is eligible.
    pub rules: Vec<PathRule>,

    /// Header inspected for the no-store directive
    pub control_header: String,

    /// Directive token that suppresses storing a response
    pub no_store_token: String,

    /// HTTP methods eligible for caching
    pub cacheable_methods: Vec<String>,

    /// HTTP status codes eligible for caching
    pub cacheable_status_codes: Vec<u16>,

    /// Request headers that participate in cache key derivation
    pub vary_headers: Vec<String>,

    /// Maximum response body size to cache (in bytes)
    pub max_response_size: usize,

    /// Emit `x-cache` and `x-processing-time` diagnostic headers
    pub diagnostic_headers: bool,

    /// Redis backend settings
    pub redis: RedisConfig,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            prefix: "cache".to_string(),
            default_ttl: Duration::from_secs(300),
            base_path: String::new(),
            rules: Vec::new(),
            control_header: "cache-control".to_string(),
            no_store_token: "no-store".to_string(),
            cacheable_methods: vec!["GET".to_string(), "HEAD".to_string()],
            cacheable_status_codes: vec![200, 203, 204, 206],
            vary_headers: vec!["accept".to_string(), "accept-encoding".to_string()],
            max_response_size: 1024 * 1024,
            diagnostic_headers: true,
            redis: RedisConfig::default(),
        }
    }
}

/// Redis backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL. A bare `host:port` is accepted and normalized to a
    /// `redis://` URL.
    pub url: String,

    /// Timeout for establishing the connection
    #[serde(with = "humantime_serde")]
    pub connection_timeout: Duration,

    /// Ceiling applied to every get/set/ping against the backend
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connection_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(1),
        }
    }
}

impl ResponseCacheConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> CacheResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CacheError::config(format!("failed to read config file: {}", e)))?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, failing fast before any request is served
    pub fn validate(&self) -> CacheResult<()> {
        if self.prefix.is_empty() {
            return Err(CacheError::config("prefix must not be empty"));
        }
        if self.default_ttl < Duration::from_secs(1) {
            return Err(CacheError::config("default_ttl must be at least one second"));
        }
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(CacheError::config(format!(
                "base_path must start with '/': {}",
                self.base_path
            )));
        }
        for rule in &self.rules {
            if !rule.pattern.starts_with('/') {
                return Err(CacheError::config(format!(
                    "path pattern must start with '/': {}",
                    rule.pattern
                )));
            }
        }
        if self.control_header.is_empty() {
            return Err(CacheError::config("control_header must not be empty"));
        }
        if self.no_store_token.is_empty() {
            return Err(CacheError::config("no_store_token must not be empty"));
        }
        if self.cacheable_methods.is_empty() {
            return Err(CacheError::config("cacheable_methods must not be empty"));
        }
        if self.cacheable_status_codes.is_empty() {
            return Err(CacheError::config("cacheable_status_codes must not be empty"));
        }
        if self.redis.url.is_empty() {
            return Err(CacheError::config("redis.url must not be empty"));
        }
        if self.redis.operation_timeout.is_zero() {
            return Err(CacheError::config("redis.operation_timeout must be non-zero"));
        }
        Ok(())
    }
}
