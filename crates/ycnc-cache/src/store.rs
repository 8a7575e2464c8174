//! Key/value storage media for the persistent cache.
//!
//! The persistent cache does not own its medium: it shares it with whatever
//! else writes there and only ever touches keys under its own prefix. This
//! module defines that medium as a trait so the cache can sit on SQLite in
//! production and on a plain map in tests.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::error::{Result, StoreError};

/// A string key/value medium.
///
/// Implementations must tolerate interleaved calls from several tasks;
/// a lost update is acceptable, a torn value is not.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any existing one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Snapshot of every key currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-process store backed by an ordered map.
///
/// An optional quota makes writes of new keys fail once the map holds
/// `limit` entries, which is how a browser-style storage area behaves when
/// it fills up.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create an empty store with no quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that holds at most `limit` keys.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota: Some(limit),
        }
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if let Some(limit) = self.quota
            && !entries.contains_key(key)
            && entries.len() >= limit
        {
            return Err(StoreError::QuotaExceeded { limit });
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().keys().cloned().collect())
    }
}
