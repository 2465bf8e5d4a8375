//! Memcached Driver Module
//!
//! Implements the [`Storage`] contract on top of a memcached client.

use std::collections::HashMap;

use tracing::{debug, error, Span};

use crate::config::{unmarshal_key, Config, Configurer};
use crate::error::{ErrorKind, KvError, Result};
use crate::kv::{ensure_key, ensure_keys, parse_expiration, Item, Storage};
use crate::memcached::{CacheClient, MemcacheClient, Traced};

// == Driver ==
/// Storage driver bound to one memcached configuration.
///
/// Multi-key operations issue one protocol call per key, in input order.
pub struct Driver<C = MemcacheClient> {
    client: Traced<C>,
    log: Span,
    cfg: Config,
}

impl Driver<MemcacheClient> {
    /// Loads the configuration at `key` and sets up pools for its servers.
    /// Connections open on first use.
    ///
    /// A server listed several times in `addr` receives a proportional share
    /// of the keys.
    pub fn new(
        log: Span,
        key: &str,
        cfg: &dyn Configurer,
        tracer: Option<Span>,
    ) -> Result<Self> {
        const OP: &str = "new_memcached_driver";

        let mut config: Config = unmarshal_key(cfg, key)
            .map_err(|e| KvError::new(OP, ErrorKind::Config(e)))?
            .ok_or_else(|| KvError::new(OP, ErrorKind::ConfigNotFound(key.to_string())))?;
        config.init_defaults();

        let client = MemcacheClient::connect(&config).map_err(|e| KvError::new(OP, e))?;
        debug!(parent: &log, addr = ?config.addr, "memcached driver created");

        Ok(Self::with_client(client, log, config, tracer))
    }
}

impl<C: CacheClient> Driver<C> {
    /// Builds a driver around an already constructed client.
    pub fn with_client(client: C, log: Span, cfg: Config, tracer: Option<Span>) -> Self {
        Self {
            client: Traced::new(client, tracer),
            log,
            cfg,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn client(&self) -> &C {
        self.client.inner()
    }
}

impl<C: CacheClient> Storage for Driver<C> {
    fn has(&self, keys: &[String]) -> Result<HashMap<String, bool>> {
        const OP: &str = "memcached_plugin_has";
        ensure_keys(keys).map_err(|e| KvError::new(OP, e))?;

        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if self
                .client
                .get(key)
                .map_err(|e| KvError::new(OP, e))?
                .is_some()
            {
                found.insert(key.clone(), true);
            }
        }
        Ok(found)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        const OP: &str = "memcached_plugin_get";
        ensure_key(key).map_err(|e| KvError::new(OP, e))?;

        self.client.get(key).map_err(|e| KvError::new(OP, e))
    }

    fn mget(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        const OP: &str = "memcached_plugin_mget";
        ensure_keys(keys).map_err(|e| KvError::new(OP, e))?;

        let mut values = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.client.get(key).map_err(|e| KvError::new(OP, e))? {
                values.insert(key.clone(), value);
            }
        }
        Ok(values)
    }

    fn set(&self, items: &[Option<Item>]) -> Result<()> {
        const OP: &str = "memcached_plugin_set";
        if items.is_empty() {
            return Err(KvError::new(OP, ErrorKind::NoKeys));
        }

        for item in items {
            let item = item
                .as_ref()
                .ok_or_else(|| KvError::new(OP, ErrorKind::EmptyItem))?;
            let expiration = item
                .expiration()
                .map_err(|e| KvError::new(OP, e))?
                .unwrap_or(0);

            self.client
                .set(&item.key, &item.value, expiration)
                .map_err(|e| KvError::new(OP, e))?;
        }
        Ok(())
    }

    fn mexpire(&self, items: &[Option<Item>]) -> Result<()> {
        const OP: &str = "memcached_plugin_mexpire";

        for item in items.iter().flatten() {
            if item.timeout.is_empty() || item.key.trim().is_empty() {
                return Err(KvError::new(OP, ErrorKind::TimeoutAndKeyRequired));
            }
            let expiration = parse_expiration(&item.timeout).map_err(|e| KvError::new(OP, e))?;

            // a miss is a hard error here, unlike the read paths
            if !self
                .client
                .touch(&item.key, expiration)
                .map_err(|e| KvError::new(OP, e))?
            {
                return Err(KvError::new(OP, ErrorKind::NotFound(item.key.clone())));
            }
        }
        Ok(())
    }

    fn ttl(&self, _keys: &[String]) -> Result<HashMap<String, String>> {
        Err(KvError::new("memcached_plugin_ttl", ErrorKind::TtlUnsupported))
    }

    fn delete(&self, keys: &[String]) -> Result<()> {
        const OP: &str = "memcached_plugin_delete";
        ensure_keys(keys).map_err(|e| KvError::new(OP, e))?;

        for key in keys {
            self.client.delete(key).map_err(|e| KvError::new(OP, e))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.client.flush().map_err(|e| {
            error!(parent: &self.log, error = %e, "Clear (flush_all) operation failed");
            KvError::new("memcached_plugin_clear", e)
        })
    }

    fn stop(&self) {
        // the memcache client has no shutdown handle; pools close on drop
    }
}
