//! Per-session registry of live resource handles.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use viewstash_cache::{BoundedCache, CacheStats};

use crate::error::{Error, Result};
use crate::handle::ResourceHandle;
use crate::id::{ResourceId, RetiredToken};

/// Eviction failures kept for [`SessionResourceRegistry::take_teardown_failures`];
/// beyond this the oldest are dropped (each was already logged).
pub const MAX_QUEUED_FAILURES: usize = 1024;

/// Outcome of [`SessionResourceRegistry::teardown_all`].
#[derive(Debug, Default)]
pub struct TeardownSummary {
    /// Handles whose teardown succeeded.
    pub torn_down: usize,

    /// Failures, one per handle that reported one, each naming its resource.
    ///
    /// Failures from evictions that were not yet drained with
    /// [`SessionResourceRegistry::take_teardown_failures`] come first.
    pub failed: Vec<Error>,
}

impl TeardownSummary {
    /// Check if every handle tore down cleanly.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Live resource handles of one session, bounded by LRU eviction.
///
/// Two independent caches of the same capacity back the registry:
/// - `resources` maps identifiers to handles; an evicted handle is torn down
///   by the eviction listener after the cache lock is released.
/// - `retired` remembers tokens of recently retired resources; the oldest
///   record silently drops out when it is full.
///
/// Every handle still in `resources` has not been torn down by the registry.
pub struct SessionResourceRegistry<H: ResourceHandle> {
    resources: BoundedCache<ResourceId, Arc<H>>,
    retired: BoundedCache<RetiredToken, bool>,
    eviction_failures: Arc<Mutex<VecDeque<Error>>>,
}

impl<H: ResourceHandle> SessionResourceRegistry<H> {
    /// Create a registry holding at most `capacity` handles and remembering at
    /// most `capacity` retired tokens (`0` = unbounded).
    pub fn new(capacity: usize) -> Self {
        let eviction_failures = Arc::new(Mutex::new(VecDeque::new()));
        let sink = Arc::clone(&eviction_failures);

        let resources = BoundedCache::with_listener(capacity, move |id: ResourceId, handle: Arc<H>| {
            debug!(resource_id = %id, "Tearing down evicted resource");
            if let Err(source) = handle.teardown() {
                warn!(resource_id = %id, error = %source, "Teardown of evicted resource failed");
                let mut queue = sink.lock();
                if queue.len() == MAX_QUEUED_FAILURES {
                    queue.pop_front();
                }
                queue.push_back(Error::Teardown { id, source });
            }
        });

        Self {
            resources,
            retired: BoundedCache::new(capacity),
            eviction_failures,
        }
    }

    /// Configured capacity of both caches.
    pub fn capacity(&self) -> usize {
        self.resources.capacity()
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if no handles are live.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Statistics of the handle cache.
    pub fn stats(&self) -> CacheStats {
        self.resources.stats()
    }

    /// Return `candidate` if it still names a live handle.
    ///
    /// This is a membership test and does not refresh the handle's recency.
    pub fn active_id(&self, candidate: Option<ResourceId>) -> Option<ResourceId> {
        candidate.filter(|id| self.resources.contains_key(id))
    }

    /// Look up a live handle, marking it as most recently used.
    ///
    /// Handles are never created here; an unknown or evicted identifier
    /// yields `None` and the caller is expected to build one and
    /// [`associate`](Self::associate) it.
    pub fn get(&self, id: &ResourceId) -> Option<Arc<H>> {
        let handle = self.resources.get(id);
        trace!(resource_id = %id, hit = handle.is_some(), "Resource lookup");
        handle
    }

    /// Store a handle under `id`.
    ///
    /// If the registry is full, the least recently used handle is evicted and
    /// torn down; a teardown failure there is queued for
    /// [`take_teardown_failures`](Self::take_teardown_failures) and otherwise
    /// reported by [`teardown_all`](Self::teardown_all). A handle
    /// already stored under `id` is replaced and returned without teardown.
    pub fn associate(&self, id: ResourceId, handle: Arc<H>) -> Option<Arc<H>> {
        let previous = self.resources.put(id, handle);
        if previous.is_some() {
            debug!(resource_id = %id, "Resource handle replaced without teardown");
        } else {
            trace!(resource_id = %id, live = self.resources.len(), "Resource associated");
        }
        previous
    }

    /// Remove the handle stored under `id` and tear it down.
    ///
    /// `token`, when given, is remembered as recently retired whether or not
    /// `id` was live. Returns the retired handle, or `None` if there was
    /// nothing to retire (so a second call is a no-op). A teardown failure is
    /// returned as [`Error::Teardown`]; the handle is gone from the registry
    /// either way.
    pub fn retire(&self, id: &ResourceId, token: Option<RetiredToken>) -> Result<Option<Arc<H>>> {
        let handle = self.resources.remove(id);

        if let Some(token) = token {
            trace!(token = token.as_str(), "Recording retired token");
            self.retired.put(token, true);
        }

        let Some(handle) = handle else {
            return Ok(None);
        };

        debug!(resource_id = %id, "Retiring resource");
        handle.teardown().map_err(|source| {
            warn!(resource_id = %id, error = %source, "Teardown of retired resource failed");
            Error::Teardown { id: *id, source }
        })?;

        Ok(Some(handle))
    }

    /// Check if `token` was retired recently enough to still be remembered.
    ///
    /// Best effort: under heavy churn a token ages out as soon as `capacity`
    /// newer tokens have been retired.
    pub fn is_recently_retired(&self, token: &str) -> bool {
        self.retired.contains_key(token)
    }

    /// Number of remembered retired tokens.
    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    /// Drain failures reported while tearing down evicted handles, oldest
    /// first. At most [`MAX_QUEUED_FAILURES`] are kept.
    pub fn take_teardown_failures(&self) -> Vec<Error> {
        self.eviction_failures.lock().drain(..).collect()
    }

    /// Tear down every live handle, for use when the session ends.
    ///
    /// Works on a snapshot, so no lock is held while handles tear down. The
    /// handles are left in place; the registry is expected to be dropped
    /// right after. Queued eviction failures are drained into the summary.
    pub fn teardown_all(&self) -> TeardownSummary {
        let mut summary = TeardownSummary {
            torn_down: 0,
            failed: self.take_teardown_failures(),
        };

        for (id, handle) in self.resources.entries() {
            match handle.teardown() {
                Ok(()) => summary.torn_down += 1,
                Err(source) => {
                    warn!(resource_id = %id, error = %source, "Teardown during session end failed");
                    summary.failed.push(Error::Teardown { id, source });
                }
            }
        }

        debug!(
            torn_down = summary.torn_down,
            failed = summary.failed.len(),
            "Session resources torn down"
        );
        summary
    }
}

impl<H: ResourceHandle> std::fmt::Debug for SessionResourceRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResourceRegistry")
            .field("capacity", &self.capacity())
            .field("live", &self.resources.len())
            .field("retired", &self.retired.len())
            .finish()
    }
}
