//! Plugin Module
//!
//! Host-facing shell: resolves configuration and hands out storage drivers.

use std::sync::Arc;

use serde_json::Value;
use tracing::Span;

use crate::config::Configurer;
use crate::error::PluginError;
use crate::kv::Storage;
use crate::memcached::Driver;

/// Name the host registry knows this plugin by.
pub const PLUGIN_NAME: &str = "memcached";

/// Configuration section that must exist for the plugin to be enabled.
pub const ROOT_PLUGIN_NAME: &str = "kv";

// == Host Traits ==
/// Hands out loggers scoped to a plugin.
pub trait Logger: Send + Sync {
    fn named_logger(&self, name: &str) -> Span;
}

/// Logger factory backed by the global tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn named_logger(&self, name: &str) -> Span {
        tracing::info_span!("plugin", name)
    }
}

/// Plugin that provides a tracer for protocol calls.
pub trait Tracer: Send + Sync {
    fn tracer(&self) -> Span;
}

// == Plugin ==
pub struct Plugin {
    log: Span,
    cfg: Arc<dyn Configurer>,
    tracer: Option<Span>,
}

impl Plugin {
    /// Captures the logger and configuration.
    ///
    /// Returns [`PluginError::Disabled`] when the host configuration has no
    /// `kv` section, telling the host to skip this plugin.
    pub fn init(log: &dyn Logger, cfg: Arc<dyn Configurer>) -> Result<Self, PluginError> {
        if !cfg.has(ROOT_PLUGIN_NAME) {
            return Err(PluginError::Disabled);
        }

        Ok(Self {
            log: log.named_logger(PLUGIN_NAME),
            cfg,
            tracer: None,
        })
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// Optional dependency: protocol calls of drivers created afterwards are
    /// traced under the provided span.
    pub fn collects(&mut self, tracer: &dyn Tracer) {
        self.tracer = Some(tracer.tracer());
    }

    pub fn has_tracer(&self) -> bool {
        self.tracer.is_some()
    }

    /// Builds a new driver for the configuration subtree at `key`.
    ///
    /// Every call creates its own driver and connection pools.
    pub fn kv_from_config(&self, key: &str) -> Result<Arc<dyn Storage>, PluginError> {
        let driver = Driver::new(self.log.clone(), key, self.cfg.as_ref(), self.tracer.clone())
            .map_err(PluginError::Provide)?;
        Ok(Arc::new(driver))
    }
}

// == Storage Discovery ==
/// Storages under `kv` whose driver is memcached, as
/// `(name, config key)` pairs sorted by name.
pub fn memcached_storages(cfg: &dyn Configurer) -> Vec<(String, String)> {
    let Some(Value::Object(sections)) = cfg.section(ROOT_PLUGIN_NAME) else {
        return Vec::new();
    };

    let mut storages: Vec<(String, String)> = sections
        .iter()
        .filter(|(_, section)| section.get("driver").and_then(Value::as_str) == Some(PLUGIN_NAME))
        .map(|(name, _)| (name.clone(), format!("{ROOT_PLUGIN_NAME}.{name}.config")))
        .collect();
    storages.sort();
    storages
}
