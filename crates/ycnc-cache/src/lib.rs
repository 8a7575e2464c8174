//! Channel name caching for ycnc.
//!
//! Two layers:
//! - [`NameCache`]: a session-scoped handle → name map, no expiry
//! - [`PersistentCache`]: durable entries with a sliding 30-day TTL, kept in a
//!   shared [`KeyValueStore`] under a fixed key prefix
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ycnc_cache::{CacheConfig, PersistentCache, SqliteStore};
//!
//! let store = Arc::new(SqliteStore::open("cache.db")?);
//! let cache = PersistentCache::new(store, CacheConfig::default());
//! cache.sweep_expired();
//! ```

mod config;
mod error;
mod memory;
mod persistent;
mod sqlite;
mod store;
mod ttl;

pub use config::{CacheConfig, DEFAULT_KEY_PREFIX, DEFAULT_TTL};
pub use error::{Result, StoreError};
pub use memory::NameCache;
pub use persistent::{CacheEntry, PersistentCache};
pub use sqlite::SqliteStore;
pub use store::{KeyValueStore, MemoryStore};
pub use ttl::{Clock, ManualClock, SystemClock, is_expired};
