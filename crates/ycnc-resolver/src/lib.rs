//! Channel handle resolution for ycnc.
//!
//! Turns `@handle` author names into channel display names:
//! - [`Resolver`]: cache lookup, one fetch per handle in flight, a global
//!   ceiling on concurrent fetches
//! - [`Fetcher`] / [`HttpFetcher`]: one request per handle, name read from
//!   the page `<title>`
//! - [`AllowList`] / [`is_allowed`]: whether conversion runs on a channel
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ycnc_cache::{CacheConfig, MemoryStore, PersistentCache};
//! use ycnc_resolver::{Handle, HttpFetcher, Resolver, ResolverConfig};
//!
//! let persistent = PersistentCache::new(Arc::new(MemoryStore::new()), CacheConfig::default());
//! let resolver = Resolver::new(Arc::new(HttpFetcher::new()?), persistent, ResolverConfig::default());
//!
//! let handle = Handle::parse("@example").unwrap();
//! if let Some(name) = resolver.resolve(&handle).await {
//!     println!("{handle} is {name}");
//! }
//! ```

mod config;
mod error;
mod fetcher;
mod handle;
mod policy;
mod resolver;
mod title;

pub use config::{DEFAULT_MAX_CONCURRENT_REQUESTS, ResolverConfig};
pub use error::{FetchError, Result};
pub use fetcher::{DEFAULT_BASE_URL, FetchConfig, Fetcher, HttpFetcher};
pub use handle::{Handle, InvalidHandle};
pub use policy::{AllowList, is_allowed};
pub use resolver::{Resolver, ResolverStats};
pub use title::{TITLE_SUFFIX, decode_entities, extract_channel_name};
