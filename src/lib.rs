//! Memcached KV - memcached-backed key-value storage for a host runtime
//!
//! Provides a storage driver translating a uniform KV contract into memcached
//! protocol calls, the plugin shell a host uses to construct drivers, and an
//! HTTP facade over the configured storages.

pub mod api;
pub mod config;
pub mod error;
pub mod kv;
pub mod memcached;
pub mod memory;
pub mod models;
pub mod plugin;

pub use api::AppState;
pub use config::{Config, Configurer, JsonConfig};
pub use error::{ErrorKind, KvError, PluginError};
pub use kv::{Item, Storage};
pub use memcached::Driver;
pub use plugin::Plugin;
