//! Configuration for the channel name cache.

use std::time::Duration;

/// Default time-to-live for persisted names (30 days).
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Default namespace prefix for persisted keys.
pub const DEFAULT_KEY_PREFIX: &str = "YCNC";

/// Configuration for the persistent cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry stays valid after its last write or successful read.
    pub ttl: Duration,

    /// Prefix shared by every key this cache owns. Keys without it are never
    /// touched by sweeps or clears.
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL for persisted entries.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the key namespace prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// TTL in milliseconds, saturating at `i64::MAX`.
    pub fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    /// Full storage key for a handle (`<prefix>:<handle>`).
    pub fn key_for(&self, handle: &str) -> String {
        format!("{}:{}", self.key_prefix, handle)
    }

    /// Namespace marker every owned key starts with (`<prefix>:`).
    pub fn namespace(&self) -> String {
        format!("{}:", self.key_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_millis(), 30 * 24 * 60 * 60 * 1000);
        assert_eq!(config.key_for("@foo"), "YCNC:@foo");
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::new()
            .with_ttl(Duration::from_secs(5))
            .with_key_prefix("TEST");
        assert_eq!(config.ttl_millis(), 5_000);
        assert_eq!(config.namespace(), "TEST:");
    }
}
