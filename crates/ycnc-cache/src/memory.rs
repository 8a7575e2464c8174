//! Session-scoped handle → name map.

use std::collections::HashMap;

use parking_lot::RwLock;

/// In-memory name cache for the current session.
///
/// No expiry: entries live until [`clear`](Self::clear) or drop. Expiry is
/// the persistent layer's job.
#[derive(Debug, Default)]
pub struct NameCache {
    names: RwLock<HashMap<String, String>>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &str) -> Option<String> {
        self.names.read().get(handle).cloned()
    }

    pub fn set(&self, handle: &str, name: &str) {
        self.names
            .write()
            .insert(handle.to_string(), name.to_string());
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.names.read().contains_key(handle)
    }

    pub fn clear(&self) {
        self.names.write().clear();
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let cache = NameCache::new();
        assert!(cache.get("@foo").is_none());

        cache.set("@foo", "Foo Channel");
        assert_eq!(cache.get("@foo").as_deref(), Some("Foo Channel"));
        assert!(cache.contains("@foo"));

        cache.set("@foo", "Renamed");
        assert_eq!(cache.get("@foo").as_deref(), Some("Renamed"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let cache = NameCache::new();
        cache.set("@a", "A");
        cache.set("@b", "B");

        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.contains("@a"));
    }
}
