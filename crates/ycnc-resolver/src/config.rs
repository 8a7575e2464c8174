//! Resolver configuration.

/// Default ceiling on concurrent channel page fetches.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;

/// Configuration for the [`Resolver`](crate::Resolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Fetches allowed in flight at once across all handles. Clamped to at
    /// least one.
    pub max_concurrent_requests: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrent fetch ceiling.
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max.max(1);
        self
    }
}
