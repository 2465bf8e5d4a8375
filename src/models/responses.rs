//! Response DTOs for the KV HTTP facade
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use serde::Serialize;

fn text(value: &[u8]) -> String {
    String::from_utf8_lossy(value).into_owned()
}

/// Response body for has: present keys mapped to `true`
#[derive(Debug, Clone, Serialize)]
pub struct HasResponse {
    pub items: HashMap<String, bool>,
}

/// Response body for get (GET /kv/:storage/get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value, `null` when the key has no entry
    pub value: Option<String>,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Option<&[u8]>) -> Self {
        Self {
            key: key.into(),
            value: value.map(text),
        }
    }
}

/// Response body for mget: values of the keys that have an entry
#[derive(Debug, Clone, Serialize)]
pub struct MGetResponse {
    pub items: HashMap<String, String>,
}

impl MGetResponse {
    pub fn new(values: HashMap<String, Vec<u8>>) -> Self {
        Self {
            items: values
                .into_iter()
                .map(|(key, value)| (key, text(&value)))
                .collect(),
        }
    }
}

/// Response body for ttl
#[derive(Debug, Clone, Serialize)]
pub struct TtlResponse {
    pub items: HashMap<String, String>,
}

/// Response body for operations without a result (set, mexpire, delete, clear)
#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    /// Success message
    pub message: String,
}

impl OkResponse {
    pub fn new(operation: &str, storage: &str) -> Self {
        Self {
            message: format!("{operation} on '{storage}' succeeded"),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Names of the storages being served
    pub storages: Vec<String>,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(storages: Vec<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            storages,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
