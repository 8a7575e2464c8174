//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [fetch]       # where channel pages come from
//! [resolver]    # concurrency ceiling
//! [cache]       # persistent name cache
//! [channels]    # allow-list
//! [logging]     # log file output
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ycnc_cache::{CacheConfig, DEFAULT_KEY_PREFIX, DEFAULT_TTL};
use ycnc_resolver::{
    DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENT_REQUESTS, FetchConfig, Handle, ResolverConfig,
};

use crate::{ConfigError, Result};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Application name for platform directory resolution.
pub(crate) const APP_NAME: &str = "ycnc";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YcncConfig {
    pub fetch: Option<FetchSection>,
    pub resolver: Option<ResolverSection>,
    pub cache: Option<CacheSection>,
    pub channels: Option<ChannelsSection>,
    pub logging: Option<LoggingSection>,
}

impl YcncConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: YcncConfig) {
        if other.fetch.is_some() {
            self.fetch = other.fetch;
        }
        if other.resolver.is_some() {
            self.resolver = other.resolver;
        }
        if other.cache.is_some() {
            self.cache = other.cache;
        }
        if other.channels.is_some() {
            self.channels = other.channels;
        }
        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Fetcher settings, defaults filled in.
    pub fn fetch_config(&self) -> FetchConfig {
        self.fetch.clone().unwrap_or_default().into()
    }

    /// Resolver settings, defaults filled in.
    pub fn resolver_config(&self) -> ResolverConfig {
        let max = self
            .resolver
            .as_ref()
            .map(|r| r.max_concurrent_requests)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS);
        ResolverConfig::new().with_max_concurrent_requests(max)
    }

    /// Persistent cache settings, defaults filled in.
    pub fn cache_config(&self) -> CacheConfig {
        let section = self.cache.clone().unwrap_or_default();
        CacheConfig::new()
            .with_ttl(section.ttl())
            .with_key_prefix(section.key_prefix)
    }

    /// Cache database location: `[cache] path`, else the platform data dir.
    pub fn cache_path(&self) -> Option<PathBuf> {
        self.cache
            .as_ref()
            .and_then(|c| c.path.clone())
            .or_else(default_cache_path)
    }

    /// Configured allow-list. Empty means every channel.
    pub fn allowed_channels(&self) -> &[String] {
        self.channels
            .as_ref()
            .map(|c| c.allowed.as_slice())
            .unwrap_or_default()
    }

    /// Add `handle` to the allow-list.
    ///
    /// The input is trimmed; it must be a handle and not already listed.
    /// Returns the stored form.
    pub fn add_channel(&mut self, handle: &str) -> Result<String> {
        let parsed =
            Handle::parse(handle).ok_or_else(|| ConfigError::InvalidHandle(handle.to_string()))?;
        let channels = self.channels.get_or_insert_with(ChannelsSection::default);
        if channels.allowed.iter().any(|h| h == parsed.as_str()) {
            return Err(ConfigError::DuplicateHandle(parsed.into()));
        }
        channels.allowed.push(parsed.to_string());
        Ok(parsed.into())
    }

    /// Remove `handle` from the allow-list. Returns whether it was listed.
    pub fn remove_channel(&mut self, handle: &str) -> bool {
        let handle = handle.trim();
        let Some(channels) = self.channels.as_mut() else {
            return false;
        };
        let before = channels.allowed.len();
        channels.allowed.retain(|h| h != handle);
        channels.allowed.len() != before
    }

    pub fn logging(&self) -> LoggingSection {
        self.logging.clone().unwrap_or_default()
    }
}

fn default_cache_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_NAME).join("cache.db"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// `[fetch]`: channel page requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSection {
    /// Origin channel pages are requested from.
    pub base_url: String,
    /// User agent override.
    pub user_agent: Option<String>,
    /// Per-request timeout. Unset means no timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: None,
            timeout_secs: None,
        }
    }
}

impl From<FetchSection> for FetchConfig {
    fn from(section: FetchSection) -> Self {
        let defaults = FetchConfig::default();
        FetchConfig {
            base_url: section.base_url,
            user_agent: section.user_agent.unwrap_or(defaults.user_agent),
            timeout: section.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// `[resolver]`: request scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSection {
    /// Fetches allowed to run at once. 0 is treated as 1.
    pub max_concurrent_requests: usize,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

/// `[cache]`: persistent name cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// SQLite database file.
    pub path: Option<PathBuf>,
    /// Days a name stays valid without being read.
    pub ttl_days: u64,
    /// Namespace prefix for stored keys.
    pub key_prefix: String,
}

impl CacheSection {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_days.saturating_mul(SECS_PER_DAY))
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            path: None,
            ttl_days: DEFAULT_TTL.as_secs() / SECS_PER_DAY,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// `[channels]`: where conversion runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsSection {
    /// Channel handles. Empty means every channel.
    pub allowed: Vec<String>,
}

/// `[logging]`: JSON log file output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Also write daily-rotated JSON logs.
    pub file: bool,
    /// Log directory. Defaults to `logs/` under the user config dir.
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_defaults() {
        let config = YcncConfig::from_toml("").unwrap();
        assert_eq!(config, YcncConfig::new());

        assert_eq!(config.fetch_config().base_url, DEFAULT_BASE_URL);
        assert!(config.fetch_config().timeout.is_none());
        assert_eq!(
            config.resolver_config().max_concurrent_requests,
            DEFAULT_MAX_CONCURRENT_REQUESTS
        );
        assert_eq!(config.cache_config().ttl, DEFAULT_TTL);
        assert_eq!(config.cache_config().key_prefix, "YCNC");
        assert!(config.allowed_channels().is_empty());
    }

    #[test]
    fn test_parse_full() {
        let config = YcncConfig::from_toml(
            r#"
[fetch]
base_url = "http://localhost:8080"
user_agent = "test-agent"
timeout_secs = 10

[resolver]
max_concurrent_requests = 2

[cache]
path = "/tmp/names.db"
ttl_days = 7
key_prefix = "TEST"

[channels]
allowed = ["@a", "@b"]

[logging]
file = true
"#,
        )
        .unwrap();

        let fetch = config.fetch_config();
        assert_eq!(fetch.base_url, "http://localhost:8080");
        assert_eq!(fetch.user_agent, "test-agent");
        assert_eq!(fetch.timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.resolver_config().max_concurrent_requests, 2);
        assert_eq!(config.cache_config().ttl, Duration::from_secs(7 * SECS_PER_DAY));
        assert_eq!(config.cache_config().key_prefix, "TEST");
        assert_eq!(config.cache_path(), Some(PathBuf::from("/tmp/names.db")));
        assert_eq!(config.allowed_channels(), ["@a", "@b"]);
        assert!(config.logging().file);
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config = YcncConfig::from_toml("[cache]\nttl_days = 1\n").unwrap();
        assert_eq!(config.cache_config().key_prefix, DEFAULT_KEY_PREFIX);
        assert_eq!(config.fetch_config().base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        let config = YcncConfig::from_toml("[resolver]\nmax_concurrent_requests = 0\n").unwrap();
        assert_eq!(config.resolver_config().max_concurrent_requests, 1);
    }

    #[test]
    fn test_merge_replaces_sections() {
        let mut base = YcncConfig::from_toml(
            "[channels]\nallowed = [\"@a\"]\n\n[resolver]\nmax_concurrent_requests = 3\n",
        )
        .unwrap();
        let overlay = YcncConfig::from_toml("[channels]\nallowed = []\n").unwrap();
        base.merge(overlay);

        assert!(base.allowed_channels().is_empty());
        assert_eq!(base.resolver_config().max_concurrent_requests, 3);
    }

    #[test]
    fn test_add_channel_validates() {
        let mut config = YcncConfig::new();
        assert_eq!(config.add_channel("  @streamer ").unwrap(), "@streamer");

        assert!(matches!(
            config.add_channel("streamer"),
            Err(ConfigError::InvalidHandle(_))
        ));
        assert!(matches!(
            config.add_channel("@streamer"),
            Err(ConfigError::DuplicateHandle(h)) if h == "@streamer"
        ));
        assert_eq!(config.allowed_channels(), ["@streamer"]);
    }

    #[test]
    fn test_remove_channel() {
        let mut config = YcncConfig::new();
        assert!(!config.remove_channel("@a"));
        config.add_channel("@a").unwrap();
        config.add_channel("@b").unwrap();
        assert!(config.remove_channel("@a"));
        assert!(!config.remove_channel("@a"));
        assert_eq!(config.allowed_channels(), ["@b"]);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = YcncConfig::new();
        config.add_channel("@a").unwrap();
        config.resolver = Some(ResolverSection {
            max_concurrent_requests: 4,
        });
        let text = config.to_toml().unwrap();
        assert!(text.contains("[channels]"));
        assert_eq!(YcncConfig::from_toml(&text).unwrap(), config);
    }
}
