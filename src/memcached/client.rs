//! Protocol Client Module
//!
//! The protocol calls the driver needs, the memcache crate adapter, and the
//! tracing wrapper around any client.

use std::time::Duration;

use memcache::{MemcacheError, Url};
use tracing::Span;

use crate::config::Config;
use crate::error::ClientError;

// == Cache Client ==
/// Memcached protocol operations used by the driver.
///
/// A miss is reported in the return value, never as an error.
pub trait CacheClient: Send + Sync {
    /// Fetches a value; `None` on a miss.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ClientError>;

    /// Stores a value. `expiration` follows memcached rules: `0` never expires.
    fn set(&self, key: &str, value: &[u8], expiration: u32) -> Result<(), ClientError>;

    /// Updates the expiration; `false` when the key has no entry.
    fn touch(&self, key: &str, expiration: u32) -> Result<bool, ClientError>;

    /// Removes a key; `false` when the key has no entry.
    fn delete(&self, key: &str) -> Result<bool, ClientError>;

    /// Removes every entry on every server.
    fn flush(&self) -> Result<(), ClientError>;
}

// == Memcache Client ==
/// [`CacheClient`] over the `memcache` crate's pooled client.
pub struct MemcacheClient {
    inner: memcache::Client,
}

impl MemcacheClient {
    /// Creates one pool per listed address.
    ///
    /// Pools fill on demand: nothing is dialed here, and an unreachable
    /// server surfaces on the first call once `connection_timeout_ms` runs
    /// out.
    pub fn connect(config: &Config) -> Result<Self, ClientError> {
        let mut pools = Vec::with_capacity(config.addr.len());
        for url in config.server_urls() {
            let url = server_url(&url, socket_timeout(config))?;

            let mut builder = r2d2::Pool::builder()
                .max_size(config.max_pool_size.max(1))
                .min_idle(Some(0));
            if let Some(ms) = config.connection_timeout_ms.filter(|ms| *ms > 0) {
                builder = builder.connection_timeout(Duration::from_millis(ms));
            }
            let pool = builder
                .build(memcache::ConnectionManager::new(url))
                .map_err(MemcacheError::from)?;
            pools.push(pool);
        }
        if pools.is_empty() {
            return Err(MemcacheError::BadURL("no servers specified".to_string()).into());
        }

        Ok(Self {
            inner: memcache::Client::with_pools(pools)?,
        })
    }
}

/// Parses a server URL, carrying the socket timeout as the `timeout` query
/// parameter the connection manager reads.
fn server_url(raw: &str, timeout: Option<Duration>) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw).map_err(MemcacheError::from)?;
    if !url.scheme().starts_with("memcache") {
        return Err(MemcacheError::BadURL(format!("unsupported scheme: {}", url.scheme())).into());
    }
    if let Some(timeout) = timeout {
        if !url.query_pairs().any(|(k, _)| k == "timeout") {
            url.query_pairs_mut()
                .append_pair("timeout", &timeout.as_secs_f64().to_string());
        }
    }
    Ok(url)
}

/// One timeout covers reads and writes on a connection; the stricter of the
/// two configured values wins.
fn socket_timeout(config: &Config) -> Option<Duration> {
    [config.read_timeout_ms, config.write_timeout_ms]
        .into_iter()
        .flatten()
        .filter(|ms| *ms > 0)
        .min()
        .map(Duration::from_millis)
}

/// Rejects keys memcached cannot carry on its text protocol: whitespace,
/// control bytes and DEL.
fn check_key(key: &str) -> Result<(), ClientError> {
    if key.bytes().any(|b| b <= b' ' || b == 0x7f) {
        return Err(ClientError::IllegalKey(key.to_string()));
    }
    Ok(())
}

impl CacheClient for MemcacheClient {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ClientError> {
        check_key(key)?;
        Ok(self.inner.get::<Vec<u8>>(key)?)
    }

    fn set(&self, key: &str, value: &[u8], expiration: u32) -> Result<(), ClientError> {
        check_key(key)?;
        Ok(self.inner.set(key, value, expiration)?)
    }

    fn touch(&self, key: &str, expiration: u32) -> Result<bool, ClientError> {
        check_key(key)?;
        Ok(self.inner.touch(key, expiration)?)
    }

    fn delete(&self, key: &str) -> Result<bool, ClientError> {
        check_key(key)?;
        Ok(self.inner.delete(key)?)
    }

    fn flush(&self) -> Result<(), ClientError> {
        Ok(self.inner.flush()?)
    }
}

// == Traced ==
/// Runs every call of the wrapped client in a `memcache` span under the
/// tracer span, when one is set.
pub struct Traced<C> {
    inner: C,
    tracer: Option<Span>,
}

impl<C: CacheClient> Traced<C> {
    pub fn new(inner: C, tracer: Option<Span>) -> Self {
        Self { inner, tracer }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn traced<T>(&self, command: &'static str, key: Option<&str>, call: impl FnOnce(&C) -> T) -> T {
        match &self.tracer {
            Some(parent) => {
                let span = tracing::info_span!(parent: parent, "memcache", command, key);
                span.in_scope(|| call(&self.inner))
            }
            None => call(&self.inner),
        }
    }
}

impl<C: CacheClient> CacheClient for Traced<C> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ClientError> {
        self.traced("get", Some(key), |c| c.get(key))
    }

    fn set(&self, key: &str, value: &[u8], expiration: u32) -> Result<(), ClientError> {
        self.traced("set", Some(key), |c| c.set(key, value, expiration))
    }

    fn touch(&self, key: &str, expiration: u32) -> Result<bool, ClientError> {
        self.traced("touch", Some(key), |c| c.touch(key, expiration))
    }

    fn delete(&self, key: &str) -> Result<bool, ClientError> {
        self.traced("delete", Some(key), |c| c.delete(key))
    }

    fn flush(&self) -> Result<(), ClientError> {
        self.traced("flush_all", None, |c| c.flush())
    }
}
