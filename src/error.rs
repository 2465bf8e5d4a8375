//! Error types for the storage driver, plugin shell and HTTP facade
//!
//! Provides unified error handling using thiserror.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Client Error ==
/// Failure reported by a protocol client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Error from the memcached client library (transport, protocol, pool)
    #[error(transparent)]
    Memcache(#[from] memcache::MemcacheError),

    /// Key containing whitespace or control bytes
    #[error("malformed key: {0:?}")]
    IllegalKey(String),

    /// Error from a non-memcached backend
    #[error("backend error: {0}")]
    Backend(String),
}

// == Error Kind ==
/// What went wrong in a storage operation.
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// The key collection is absent
    #[error("no keys")]
    NoKeys,

    /// A key is blank after trimming
    #[error("empty key")]
    EmptyKey,

    /// An item in the batch is absent
    #[error("empty item")]
    EmptyItem,

    #[error("should set timeout and at least one key")]
    TimeoutAndKeyRequired,

    /// Timeout is not an RFC 3339 timestamp
    #[error("invalid timeout {value:?}")]
    InvalidTimeout {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Timeout does not fit a memcached expiration
    #[error("timeout {0:?} is outside the supported expiration range")]
    TimeoutOutOfRange(String),

    /// Key has no entry (hard error only where a miss is not tolerated)
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("memcached does not support TTL queries")]
    TtlUnsupported,

    #[error("config not found by provided key: {0}")]
    ConfigNotFound(String),

    #[error("invalid config")]
    Config(#[source] serde_json::Error),

    #[error(transparent)]
    Client(#[from] ClientError),
}

// == Storage Error ==
/// Storage error tagged with the operation that failed.
#[derive(Debug)]
pub struct KvError {
    op: &'static str,
    kind: ErrorKind,
}

impl KvError {
    pub fn new(op: &'static str, kind: impl Into<ErrorKind>) -> Self {
        Self {
            op,
            kind: kind.into(),
        }
    }

    /// Operation tag, e.g. `memcached_plugin_get`.
    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for KvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.op, self.kind)
    }
}

impl std::error::Error for KvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

// == Plugin Error ==
/// Errors surfaced to the host by the plugin shell.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The host configuration opts this plugin out; not a failure
    #[error("plugin disabled")]
    Disabled,

    #[error("memcachedkv_plugin_provide: {0}")]
    Provide(KvError),
}

impl PluginError {
    pub fn is_disabled(&self) -> bool {
        matches!(self, PluginError::Disabled)
    }
}

// == API Error ==
/// Errors returned by the HTTP facade.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unknown storage: {0}")]
    UnknownStorage(String),

    #[error(transparent)]
    Kv(#[from] KvError),

    /// Blocking task panicked or was cancelled
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnknownStorage(_) => StatusCode::NOT_FOUND,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Kv(err) => match err.kind() {
                ErrorKind::NoKeys
                | ErrorKind::EmptyKey
                | ErrorKind::EmptyItem
                | ErrorKind::TimeoutAndKeyRequired
                | ErrorKind::InvalidTimeout { .. }
                | ErrorKind::TimeoutOutOfRange(_) => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
                ErrorKind::TtlUnsupported => StatusCode::NOT_IMPLEMENTED,
                ErrorKind::Client(_) => StatusCode::BAD_GATEWAY,
                ErrorKind::ConfigNotFound(_) | ErrorKind::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for storage operations.
pub type Result<T> = std::result::Result<T, KvError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_kv_error_display_includes_op() {
        let err = KvError::new("memcached_plugin_get", ErrorKind::EmptyKey);
        assert_eq!(err.to_string(), "memcached_plugin_get: empty key");
        assert_eq!(err.op(), "memcached_plugin_get");
        assert!(matches!(err.kind(), ErrorKind::EmptyKey));
    }

    #[test]
    fn test_kv_error_source_is_parse_error() {
        let source = chrono::DateTime::parse_from_rfc3339("tomorrow").unwrap_err();
        let err = KvError::new(
            "memcached_plugin_set",
            ErrorKind::InvalidTimeout {
                value: "tomorrow".to_string(),
                source,
            },
        );
        assert!(err.source().is_some());
        assert!(err.to_string().contains("tomorrow"));
    }

    #[test]
    fn test_client_error_converts_into_kind() {
        let err = KvError::new("memcached_plugin_clear", ClientError::Backend("down".into()));
        assert!(matches!(err.kind(), ErrorKind::Client(_)));
        assert_eq!(err.to_string(), "memcached_plugin_clear: backend error: down");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ErrorKind::EmptyKey, StatusCode::BAD_REQUEST),
            (ErrorKind::NotFound("k".into()), StatusCode::NOT_FOUND),
            (ErrorKind::TtlUnsupported, StatusCode::NOT_IMPLEMENTED),
            (
                ErrorKind::Client(ClientError::Backend("x".into())),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (kind, status) in cases {
            let response = ApiError::from(KvError::new("op", kind)).into_response();
            assert_eq!(response.status(), status);
        }

        let response = ApiError::UnknownStorage("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_disabled_is_not_provide() {
        assert!(PluginError::Disabled.is_disabled());
        let err = PluginError::Provide(KvError::new("op", ErrorKind::EmptyKey));
        assert!(!err.is_disabled());
    }
}
