//! CLI command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use ycnc_cache::{PersistentCache, SqliteStore};
use ycnc_config::{ConfigError, LoadedConfig, YcncConfig};
use ycnc_resolver::{HttpFetcher, Resolver};

pub mod cache;
pub mod channels;
pub mod config;
pub mod resolve;
pub mod rewrite;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration and where it came from.
    pub loaded: LoadedConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    pub fn config(&self) -> &YcncConfig {
        &self.loaded.config
    }

    /// User config file that edits are written to.
    pub fn user_config_path(&self) -> Result<PathBuf> {
        Ok(self
            .loaded
            .user_path
            .clone()
            .ok_or(ConfigError::NoConfigDir)?)
    }

    /// Open the persistent name cache.
    pub fn open_cache(&self) -> Result<PersistentCache> {
        let path = self
            .config()
            .cache_path()
            .context("no data directory for the cache; set [cache] path")?;
        let store = SqliteStore::open(&path)
            .with_context(|| format!("failed to open cache at {}", path.display()))?;
        Ok(PersistentCache::new(
            Arc::new(store),
            self.config().cache_config(),
        ))
    }

    /// Resolver over the persistent cache, fetching over HTTP.
    pub fn build_resolver(&self) -> Result<Resolver> {
        let fetcher = HttpFetcher::with_config(self.config().fetch_config())?;
        Ok(Resolver::new(
            Arc::new(fetcher),
            self.open_cache()?,
            self.config().resolver_config(),
        ))
    }
}
