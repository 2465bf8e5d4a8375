//! Memory Store Module
//!
//! HashMap-backed [`CacheClient`] with memcached expiration semantics.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ClientError;
use crate::memcached::CacheClient;
use crate::memory::{ClientStats, Entry, MAX_KEY_LENGTH};

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    stats: ClientStats,
    /// Every call fails with this message when set
    fail_all: Option<String>,
    /// Calls for these keys fail
    failing_keys: HashSet<String>,
}

impl State {
    fn check(&self, key: Option<&str>) -> Result<(), ClientError> {
        if let Some(message) = &self.fail_all {
            return Err(ClientError::Backend(message.clone()));
        }
        if let Some(key) = key {
            if self.failing_keys.contains(key) {
                return Err(ClientError::Backend(format!("injected failure for key {key}")));
            }
            if key.len() > MAX_KEY_LENGTH {
                return Err(ClientError::Backend(format!(
                    "key exceeds maximum length of {MAX_KEY_LENGTH} bytes"
                )));
            }
        }
        Ok(())
    }

    /// Returns the live entry for `key`, dropping it first if expired.
    fn live(&mut self, key: &str) -> Option<&mut Entry> {
        if self.entries.get(key).is_some_and(Entry::is_expired) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }
}

// == Memory Client ==
/// In-process memcached stand-in. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    state: Arc<Mutex<State>>,
}

impl MemoryClient {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Stats ==
    /// Returns the call counters so far.
    pub fn stats(&self) -> ClientStats {
        self.lock().stats.clone()
    }

    // == Failure Injection ==
    /// Makes every following call fail with `message`; `None` restores service.
    pub fn fail_all(&self, message: Option<&str>) {
        self.lock().fail_all = message.map(str::to_string);
    }

    /// Makes every following call for `key` fail.
    pub fn fail_key(&self, key: &str) {
        self.lock().failing_keys.insert(key.to_string());
    }

    // == Length ==
    /// Number of stored entries, expired ones included until next access.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheClient for MemoryClient {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ClientError> {
        let mut state = self.lock();
        if let Err(err) = state.check(Some(key)) {
            state.stats.gets += 1;
            return Err(err);
        }

        let value = state.live(key).map(|entry| entry.value.clone());
        state.stats.record_get(value.is_some());
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8], expiration: u32) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.stats.sets += 1;
        state.check(Some(key))?;

        state
            .entries
            .insert(key.to_string(), Entry::new(value.to_vec(), expiration));
        Ok(())
    }

    fn touch(&self, key: &str, expiration: u32) -> Result<bool, ClientError> {
        let mut state = self.lock();
        state.stats.touches += 1;
        state.check(Some(key))?;

        match state.live(key) {
            Some(entry) => {
                entry.touch(expiration);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, key: &str) -> Result<bool, ClientError> {
        let mut state = self.lock();
        state.stats.deletes += 1;
        state.check(Some(key))?;

        let existed = state.live(key).is_some();
        state.entries.remove(key);
        Ok(existed)
    }

    fn flush(&self) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.stats.flushes += 1;
        state.check(None)?;

        state.entries.clear();
        Ok(())
    }
}
