//! Configuration Module
//!
//! Typed driver configuration, the host configuration source and the
//! server settings loaded from environment variables.

use std::env;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Address used when the configuration lists no servers.
pub const DEFAULT_ADDR: &str = "127.0.0.1:11211";

// == Driver Config ==
/// Memcached driver configuration, loaded from one `kv.<name>.config` subtree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server addresses. A server listed several times gets a proportional
    /// share of the keys.
    pub addr: Vec<String>,
    /// Connections kept per server
    pub max_pool_size: u32,
    /// Pool checkout / connect timeout in milliseconds
    pub connection_timeout_ms: Option<u64>,
    /// Socket read timeout in milliseconds
    pub read_timeout_ms: Option<u64>,
    /// Socket write timeout in milliseconds
    pub write_timeout_ms: Option<u64>,
}

impl Config {
    /// Fills in values the configuration left empty.
    pub fn init_defaults(&mut self) {
        if self.addr.is_empty() {
            self.addr = vec![DEFAULT_ADDR.to_string()];
        }
        if self.max_pool_size == 0 {
            self.max_pool_size = 1;
        }
    }

    /// Server URLs in the form the memcache client expects.
    pub fn server_urls(&self) -> Vec<String> {
        self.addr
            .iter()
            .map(|addr| {
                let addr = addr.trim();
                if addr.contains("://") {
                    addr.to_string()
                } else {
                    format!("memcache://{addr}")
                }
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: Vec::new(),
            max_pool_size: 1,
            connection_timeout_ms: None,
            read_timeout_ms: None,
            write_timeout_ms: None,
        }
    }
}

// == Configurer ==
/// Host configuration source. Names are dotted paths, e.g. `kv.cache.config`.
pub trait Configurer: Send + Sync {
    /// Checks whether a section exists.
    fn has(&self, name: &str) -> bool;

    /// Returns a copy of the raw section, if present.
    fn section(&self, name: &str) -> Option<Value>;
}

/// Deserializes the section at `name` into `T`.
///
/// Returns `Ok(None)` when the section is missing or `null`.
pub fn unmarshal_key<T: DeserializeOwned>(
    cfg: &dyn Configurer,
    name: &str,
) -> Result<Option<T>, serde_json::Error> {
    match cfg.section(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some),
    }
}

// == JSON Config ==
/// Configurer backed by a JSON document.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    root: Value,
}

impl JsonConfig {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Self::new)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        name.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.root, |node, segment| node.get(segment))
    }
}

impl Configurer for JsonConfig {
    fn has(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn section(&self, name: &str) -> Option<Value> {
        self.lookup(name).cloned()
    }
}

// == Server Config ==
/// Settings for the `memcached-kv` binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port
    pub server_port: u16,
    /// Path of the JSON host configuration
    pub config_path: String,
}

impl ServerConfig {
    /// Loads the server settings from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `KV_CONFIG` - host configuration file (default: kv.json)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            config_path: env::var("KV_CONFIG").unwrap_or_else(|_| "kv.json".to_string()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            config_path: "kv.json".to_string(),
        }
    }
}
