//! Durable handle → name cache with sliding expiry.
//!
//! Entries live in a shared [`KeyValueStore`] under `<prefix>:<handle>` as
//! JSON `{"name": .., "timestamp": ..}`. Nothing here ever returns an error:
//! unreadable entries are misses and failed writes are logged and dropped,
//! so the worst case is a repeated network fetch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::config::CacheConfig;
use crate::store::KeyValueStore;
use crate::ttl::{self, Clock, SystemClock};

/// A persisted name together with the time it was last written or used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Handle the name belongs to (`@xxxx`).
    pub handle: String,

    /// Resolved display name.
    pub name: String,

    /// Milliseconds since the Unix epoch of the last write or refresh.
    pub timestamp: i64,
}

/// On-disk shape of an entry.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    name: String,
    timestamp: i64,
}

/// Persistent name cache over a prefixed key/value store.
#[derive(Clone)]
pub struct PersistentCache {
    store: Arc<dyn KeyValueStore>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for PersistentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PersistentCache {
    /// Create a cache over `store` using the wall clock.
    pub fn new(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current time according to the configured clock.
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Read the stored entry for `handle`, valid or not.
    ///
    /// Missing keys, storage errors and unparseable values are all `None`.
    /// An entry with an empty name or a non-positive timestamp counts as
    /// unparseable.
    pub fn get(&self, handle: &str) -> Option<CacheEntry> {
        let key = self.config.key_for(handle);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(handle = %handle, error = %e, "Failed to read cached name");
                return None;
            }
        };

        match serde_json::from_str::<StoredEntry>(&raw) {
            Ok(stored) if !stored.name.is_empty() && stored.timestamp > 0 => Some(CacheEntry {
                handle: handle.to_string(),
                name: stored.name,
                timestamp: stored.timestamp,
            }),
            Ok(_) => {
                debug!(handle = %handle, "Ignoring incomplete cached entry");
                None
            }
            Err(e) => {
                debug!(handle = %handle, error = %e, "Ignoring unparseable cached entry");
                None
            }
        }
    }

    /// Store `name` for `handle` with a fresh timestamp, replacing any entry.
    pub fn put(&self, handle: &str, name: &str) {
        self.write(handle, name, "save");
    }

    /// Rewrite an entry with a fresh timestamp and the same name.
    ///
    /// This is what makes expiry sliding: every successful read pushes the
    /// deadline out by another TTL.
    pub fn touch(&self, handle: &str, name: &str) {
        self.write(handle, name, "refresh");
    }

    /// Whether `entry` is expired at `now`.
    pub fn is_expired(&self, entry: &CacheEntry, now: i64) -> bool {
        ttl::is_expired(entry.timestamp, now, self.config.ttl_millis())
    }

    /// Return the name for `handle` if a valid entry exists, refreshing it.
    pub fn lookup(&self, handle: &str) -> Option<String> {
        let entry = self.get(handle)?;
        if self.is_expired(&entry, self.now()) {
            trace!(handle = %handle, "Cached name expired");
            return None;
        }
        self.touch(handle, &entry.name);
        Some(entry.name)
    }

    /// All readable entries under this cache's prefix, expired ones included.
    pub fn entries(&self) -> Vec<CacheEntry> {
        let namespace = self.config.namespace();
        self.owned_keys()
            .into_iter()
            .filter_map(|key| {
                let handle = key.strip_prefix(&namespace)?;
                self.get(handle)
            })
            .collect()
    }

    /// Delete every expired entry under the prefix and return how many went.
    ///
    /// Unreadable entries are left alone; the next fetch overwrites them.
    pub fn sweep_expired(&self) -> usize {
        let now = self.now();
        let namespace = self.config.namespace();
        let mut removed = 0;

        for key in self.owned_keys() {
            let Some(handle) = key.strip_prefix(&namespace) else {
                continue;
            };
            let Some(entry) = self.get(handle) else {
                continue;
            };
            if !self.is_expired(&entry, now) {
                continue;
            }
            match self.store.remove(&key) {
                Ok(()) => removed += 1,
                Err(e) => warn!(key = %key, error = %e, "Failed to remove expired entry"),
            }
        }

        if removed > 0 {
            debug!(count = removed, "Swept expired cached names");
        }
        removed
    }

    /// Delete every entry under the prefix. Other keys are untouched.
    pub fn clear(&self) -> usize {
        let mut removed = 0;
        for key in self.owned_keys() {
            match self.store.remove(&key) {
                Ok(()) => removed += 1,
                Err(e) => warn!(key = %key, error = %e, "Failed to remove cached name"),
            }
        }
        info!(count = removed, "Cleared persisted names");
        removed
    }

    fn owned_keys(&self) -> Vec<String> {
        let namespace = self.config.namespace();
        match self.store.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| k.starts_with(&namespace))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list cached names");
                Vec::new()
            }
        }
    }

    fn write(&self, handle: &str, name: &str, op: &'static str) {
        let stored = StoredEntry {
            name: name.to_string(),
            timestamp: self.now(),
        };
        let result = serde_json::to_string(&stored)
            .map_err(crate::StoreError::from)
            .and_then(|json| self.store.set(&self.config.key_for(handle), &json));

        if let Err(e) = result {
            warn!(handle = %handle, op, error = %e, "Failed to persist cached name");
        }
    }
}
