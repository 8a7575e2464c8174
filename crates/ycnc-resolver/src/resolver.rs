//! Handle → name resolution with request coalescing and a fetch ceiling.
//!
//! Lookup order for [`Resolver::resolve`]:
//! 1. session [`NameCache`]
//! 2. [`PersistentCache`] (valid entries are refreshed on read)
//! 3. an in-flight fetch for the same handle, if one exists
//! 4. a new fetch, queued FIFO behind at most `max_concurrent_requests`
//!    running ones
//!
//! Each queued fetch runs on its own task and finishes even if every caller
//! stops waiting. Failures are never cached, so the next call retries.

use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::Shared;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};
use ycnc_cache::{NameCache, PersistentCache};

use crate::config::ResolverConfig;
use crate::fetcher::Fetcher;
use crate::handle::Handle;

/// Completion shared by every caller waiting on the same handle.
type PendingName = Shared<oneshot::Receiver<Option<String>>>;

/// Ledger entry for a handle that has a fetch queued or running.
struct InFlight {
    /// Request id, so a completion only clears its own entry.
    id: u64,
    pending: PendingName,
}

/// A fetch waiting for a free slot.
struct QueuedFetch {
    id: u64,
    handle: Handle,
    done: oneshot::Sender<Option<String>>,
}

#[derive(Default)]
struct QueueState {
    queue: VecDeque<QueuedFetch>,
    in_flight: HashMap<String, InFlight>,
    active: usize,
    next_id: u64,
}

struct ResolverInner {
    names: NameCache,
    persistent: PersistentCache,
    fetcher: Arc<dyn Fetcher>,
    max_concurrent: usize,
    state: Mutex<QueueState>,
}

/// Outcome of the synchronous part of a resolve.
enum Lookup {
    Ready(String),
    Pending(PendingName),
}

/// Point-in-time counters for a [`Resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverStats {
    /// Fetches currently running.
    pub active: usize,
    /// Fetches waiting for a slot.
    pub queued: usize,
    /// Handles with a queued or running fetch.
    pub in_flight: usize,
    /// Names in the session cache.
    pub cached: usize,
}

/// Resolves channel handles to display names.
///
/// Cheap to clone; clones share caches, queue and ledger. Must be used from
/// within a Tokio runtime, since fetches run on spawned tasks.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("max_concurrent", &self.inner.max_concurrent)
            .field("stats", &self.stats())
            .finish()
    }
}

impl Resolver {
    /// Create a resolver over `persistent` that fetches misses with `fetcher`.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        persistent: PersistentCache,
        config: ResolverConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                names: NameCache::new(),
                persistent,
                fetcher,
                max_concurrent: config.max_concurrent_requests.max(1),
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// Resolve `handle` to a display name.
    ///
    /// `None` means the name could not be fetched this time. Never fails
    /// otherwise.
    pub async fn resolve(&self, handle: &Handle) -> Option<String> {
        match self.lookup_or_enqueue(handle) {
            Lookup::Ready(name) => Some(name),
            // A dropped sender means the fetch task died; treat as unresolved.
            Lookup::Pending(pending) => pending.await.unwrap_or(None),
        }
    }

    /// Session cache lookup only. Never suspends, never touches storage.
    pub fn cached_name(&self, handle: &Handle) -> Option<String> {
        self.inner.names.get(handle.as_str())
    }

    /// The persistent layer this resolver writes through to.
    pub fn persistent(&self) -> &PersistentCache {
        &self.inner.persistent
    }

    /// Drop expired persisted names. Meant to run once at startup.
    pub fn sweep_expired(&self) -> usize {
        self.inner.persistent.sweep_expired()
    }

    /// Forget everything: session names, in-flight ledger and every
    /// persisted name under the cache prefix.
    ///
    /// Fetches already queued or running still complete and deliver their
    /// result to whoever was waiting on them.
    pub fn reset(&self) {
        self.inner.names.clear();
        let abandoned = {
            let mut state = self.inner.state.lock();
            let count = state.in_flight.len();
            state.in_flight.clear();
            count
        };
        let removed = self.inner.persistent.clear();
        info!(abandoned, removed, "Name cache reset");
    }

    /// Snapshot of queue and cache counters.
    pub fn stats(&self) -> ResolverStats {
        let state = self.inner.state.lock();
        ResolverStats {
            active: state.active,
            queued: state.queue.len(),
            in_flight: state.in_flight.len(),
            cached: self.inner.names.len(),
        }
    }

    fn lookup_or_enqueue(&self, handle: &Handle) -> Lookup {
        let key = handle.as_str();

        if let Some(name) = self.inner.names.get(key) {
            trace!(handle = %handle, "Name found in session cache");
            return Lookup::Ready(name);
        }

        if let Some(name) = self.inner.persistent.lookup(key) {
            trace!(handle = %handle, "Name loaded from persistent cache");
            self.inner.names.set(key, &name);
            return Lookup::Ready(name);
        }

        let pending = {
            let mut state = self.inner.state.lock();
            if let Some(existing) = state.in_flight.get(key) {
                trace!(handle = %handle, "Joining in-flight fetch");
                return Lookup::Pending(existing.pending.clone());
            }

            let id = state.next_id;
            state.next_id += 1;

            let (done, rx) = oneshot::channel();
            let pending = rx.shared();
            state.queue.push_back(QueuedFetch {
                id,
                handle: handle.clone(),
                done,
            });
            state.in_flight.insert(
                key.to_string(),
                InFlight {
                    id,
                    pending: pending.clone(),
                },
            );
            debug!(handle = %handle, queued = state.queue.len(), "Queued name fetch");
            pending
        };

        Self::drain_queue(&self.inner);
        Lookup::Pending(pending)
    }

    /// Start queued fetches, oldest first, until the ceiling is reached.
    fn drain_queue(inner: &Arc<ResolverInner>) {
        loop {
            let item = {
                let mut state = inner.state.lock();
                if state.active >= inner.max_concurrent {
                    return;
                }
                let Some(item) = state.queue.pop_front() else {
                    return;
                };
                state.active += 1;
                item
            };

            let task_inner = Arc::clone(inner);
            tokio::spawn(async move {
                // A panicking fetcher still has to give its slot and ledger
                // entry back.
                let name = AssertUnwindSafe(task_inner.fetch_and_store(&item.handle))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        warn!(handle = %item.handle, "Channel name fetch panicked");
                        None
                    });

                {
                    let mut state = task_inner.state.lock();
                    state.active -= 1;
                    let owned = state
                        .in_flight
                        .get(item.handle.as_str())
                        .is_some_and(|entry| entry.id == item.id);
                    if owned {
                        state.in_flight.remove(item.handle.as_str());
                    }
                }

                // Nobody waiting is fine.
                let _ = item.done.send(name);
                Resolver::drain_queue(&task_inner);
            });
        }
    }
}

impl ResolverInner {
    async fn fetch_and_store(&self, handle: &Handle) -> Option<String> {
        match self.fetcher.fetch(handle).await {
            Ok(name) => {
                self.names.set(handle.as_str(), &name);
                self.persistent.put(handle.as_str(), &name);
                Some(name)
            }
            Err(e) if e.is_not_found() => {
                debug!(handle = %handle, "No channel page for handle");
                None
            }
            Err(e) => {
                warn!(handle = %handle, error = %e, "Failed to fetch channel name");
                None
            }
        }
    }
}
