//! Memory Entry Module
//!
//! Defines a stored value and its memcached-style expiration.

use chrono::Utc;

use crate::kv::MAX_RELATIVE_EXPIRATION;

// == Entry ==
/// A stored value with its expiration time.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The stored value
    pub value: Vec<u8>,
    /// Expiration timestamp (unix seconds), None = no expiration
    pub expires_at: Option<i64>,
}

impl Entry {
    // == Constructor ==
    /// Creates an entry from a memcached expiration value.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `expiration` - `0` never expires, up to 30 days is seconds from now,
    ///   anything larger is an absolute unix timestamp
    pub fn new(value: Vec<u8>, expiration: u32) -> Self {
        Self {
            value,
            expires_at: resolve_expiration(expiration, current_timestamp()),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp() >= expires,
            None => false,
        }
    }

    // == Touch ==
    /// Replaces the expiration, keeping the value.
    pub fn touch(&mut self, expiration: u32) {
        self.expires_at = resolve_expiration(expiration, current_timestamp());
    }
}

/// Absolute expiration time for a memcached expiration value.
fn resolve_expiration(expiration: u32, now: i64) -> Option<i64> {
    match expiration {
        0 => None,
        secs if secs <= MAX_RELATIVE_EXPIRATION => Some(now + i64::from(secs)),
        at => Some(i64::from(at)),
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}
