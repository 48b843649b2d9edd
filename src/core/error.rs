//! # Error Handling Module
//!
//! Error types for the response cache. Configuration errors are fatal at
//! initialization time; everything the store can produce at request time is
//! recoverable and must never surface to the caller as a request failure.

use thiserror::Error;

/// Result type used throughout the crate
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-specific error types
#[derive(Debug, Error)]
pub enum CacheError {
    /// Invalid or incomplete initialization configuration
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Transport or protocol error from the Redis backend
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Cached entry could not be serialized or deserialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing error when loading configuration from a file
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A store operation exceeded its configured timeout
    #[error("store operation timed out")]
    Timeout,

    /// The store could not be reached
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl CacheError {
    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a store-unavailable error with a custom message
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Whether this error means the backend could not serve the operation.
    ///
    /// All of these are treated identically by the middleware: the request
    /// proceeds to the downstream handler uncached.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Redis(_) | Self::Timeout | Self::Unavailable { .. }
        )
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        Self::Unavailable {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_unavailable_classification() {
        assert!(CacheError::Timeout.is_backend_unavailable());
        assert!(CacheError::unavailable("connection refused").is_backend_unavailable());
        assert!(!CacheError::config("missing prefix").is_backend_unavailable());
    }

    #[test]
    fn test_error_display() {
        let err = CacheError::config("prefix must not be empty");
        assert_eq!(
            err.to_string(),
            "configuration error: prefix must not be empty"
        );
    }
}
