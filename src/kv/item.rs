//! Item Module
//!
//! Defines the key/value/timeout triple written by Set and MExpire.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::ErrorKind;

/// Largest expiration memcached reads as an offset from now (30 days).
/// Larger values are absolute unix timestamps.
pub const MAX_RELATIVE_EXPIRATION: u32 = 60 * 60 * 24 * 30;

// == Item ==
/// A single entry to write or re-expire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub key: String,
    pub value: Vec<u8>,
    /// Absolute expiration as an RFC 3339 timestamp; empty means no expiration
    pub timeout: String,
}

impl Item {
    /// Creates an item that never expires.
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            timeout: String::new(),
        }
    }

    /// Sets the absolute expiration timestamp (RFC 3339).
    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// Creates an item that expires `ttl` from now.
    ///
    /// The lifetime is converted to an absolute timestamp immediately, so the
    /// item carries the same kind of timeout as [`Item::with_timeout`].
    pub fn expiring_in(key: impl Into<String>, value: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        let at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(key, value).with_timeout(at.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// Memcached expiration for this item; `None` when no timeout is set.
    pub fn expiration(&self) -> Result<Option<u32>, ErrorKind> {
        if self.timeout.is_empty() {
            return Ok(None);
        }
        parse_expiration(&self.timeout).map(Some)
    }
}

// == Expiration ==
/// Converts an RFC 3339 timestamp into an absolute memcached expiration.
///
/// Timestamps that would collide with memcached's relative range (or `0`,
/// "never") are moved to the first absolute second, which is already past and
/// expires the entry immediately.
pub fn parse_expiration(timeout: &str) -> Result<u32, ErrorKind> {
    let at = DateTime::parse_from_rfc3339(timeout).map_err(|source| ErrorKind::InvalidTimeout {
        value: timeout.to_string(),
        source,
    })?;

    let secs = at.timestamp();
    if secs <= i64::from(MAX_RELATIVE_EXPIRATION) {
        return Ok(MAX_RELATIVE_EXPIRATION + 1);
    }
    u32::try_from(secs).map_err(|_| ErrorKind::TimeoutOutOfRange(timeout.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_without_timeout() {
        let item = Item::new("k", "v");
        assert_eq!(item.value, b"v");
        assert_eq!(item.expiration().unwrap(), None);
    }

    #[test]
    fn test_parse_utc_timestamp() {
        // 2030-01-01T00:00:00Z
        assert_eq!(parse_expiration("2030-01-01T00:00:00Z").unwrap(), 1_893_456_000);
    }

    #[test]
    fn test_parse_offset_timestamp_is_absolute() {
        assert_eq!(
            parse_expiration("2030-01-01T02:00:00+02:00").unwrap(),
            parse_expiration("2030-01-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_durations_and_garbage() {
        for raw in ["60", "1h", "2030-01-01", "not a date"] {
            let err = parse_expiration(raw).unwrap_err();
            assert!(matches!(err, ErrorKind::InvalidTimeout { .. }), "{raw}");
        }
    }

    #[test]
    fn test_parse_epoch_expires_immediately() {
        assert_eq!(
            parse_expiration("1970-01-01T00:00:00Z").unwrap(),
            MAX_RELATIVE_EXPIRATION + 1
        );
        assert_eq!(
            parse_expiration("1969-07-20T20:17:00Z").unwrap(),
            MAX_RELATIVE_EXPIRATION + 1
        );
    }

    #[test]
    fn test_parse_beyond_u32_range() {
        let err = parse_expiration("2200-01-01T00:00:00Z").unwrap_err();
        assert!(matches!(err, ErrorKind::TimeoutOutOfRange(_)));
    }

    #[test]
    fn test_expiring_in_is_absolute_and_in_future() {
        let item = Item::expiring_in("k", "v", Duration::from_secs(3600));
        let expiration = item.expiration().unwrap().unwrap();
        let now = Utc::now().timestamp() as u32;
        assert!(expiration > now + 3500);
        assert!(expiration <= now + 3600);
    }
}
