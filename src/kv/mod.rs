//! KV Module
//!
//! The storage contract a host runtime consumes, independent of the backend.

mod item;

use std::collections::HashMap;

pub use item::{parse_expiration, Item, MAX_RELATIVE_EXPIRATION};

use crate::error::{ErrorKind, Result};

// == Storage ==
/// Uniform key-value contract.
///
/// Batch operations report independent per-key outcomes and stop at the first
/// hard error. An empty key slice or item slice stands for an absent
/// collection; `None` entries in an item slice stand for absent items.
pub trait Storage: Send + Sync {
    /// Returns the subset of `keys` that currently have an entry, mapped to `true`.
    /// Keys without an entry are left out of the map.
    fn has(&self, keys: &[String]) -> Result<HashMap<String, bool>>;

    /// Returns the value stored under `key`, or `None` on a miss.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Returns the values of the keys that have an entry.
    fn mget(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>>;

    /// Writes the items in order. Items written before a failure stay written.
    fn set(&self, items: &[Option<Item>]) -> Result<()>;

    /// Updates the expiration of existing entries without touching their values.
    fn mexpire(&self, items: &[Option<Item>]) -> Result<()>;

    /// Remaining time to live per key.
    fn ttl(&self, keys: &[String]) -> Result<HashMap<String, String>>;

    /// Removes the keys. Keys without an entry are not an error.
    fn delete(&self, keys: &[String]) -> Result<()>;

    /// Removes every entry.
    fn clear(&self) -> Result<()>;

    /// Releases backend resources.
    fn stop(&self);
}

// == Validation ==
/// Checks a single key is not blank.
pub fn ensure_key(key: &str) -> std::result::Result<(), ErrorKind> {
    if key.trim().is_empty() {
        return Err(ErrorKind::EmptyKey);
    }
    Ok(())
}

/// Checks the key collection is present and every key is non-blank.
pub fn ensure_keys(keys: &[String]) -> std::result::Result<(), ErrorKind> {
    if keys.is_empty() {
        return Err(ErrorKind::NoKeys);
    }
    keys.iter().try_for_each(|key| ensure_key(key))
}
