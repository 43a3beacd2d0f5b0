//! Session lifecycle host: one registry per live session.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use viewstash_config::{CapacityCell, ParamSource};

use crate::error::Result;
use crate::handle::ResourceHandle;
use crate::registry::{SessionResourceRegistry, TeardownSummary};

/// Tracks the registry of every live session.
///
/// All registries share the capacity given at construction. Destroying a
/// session removes its registry first and tears its handles down afterwards,
/// outside the directory lock.
pub struct SessionDirectory<H: ResourceHandle> {
    sessions: RwLock<HashMap<String, Arc<SessionResourceRegistry<H>>>>,
    capacity: usize,
}

impl<H: ResourceHandle> SessionDirectory<H> {
    /// Create a directory whose sessions hold at most `capacity` handles.
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Create a directory with the capacity held by `cell`, resolving it from
    /// `source` if this is the first use.
    ///
    /// A malformed capacity parameter is returned as an error rather than
    /// falling back to a default.
    pub fn from_params(cell: &CapacityCell, source: &dyn ParamSource) -> Result<Self> {
        let resolved = cell.get_or_resolve(source)?;
        info!(capacity = resolved.value, source = %resolved.source, "Session directory ready");
        Ok(Self::new(resolved.value))
    }

    /// Capacity given to every session registry.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Check if there are no live sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Handle a "session created" event, returning the session's registry.
    ///
    /// Creating a session that already exists returns its current registry.
    pub fn session_created(&self, session_id: &str) -> Arc<SessionResourceRegistry<H>> {
        let mut sessions = self.sessions.write();
        Arc::clone(sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!(session_id = %session_id, capacity = self.capacity, "Session registry created");
            Arc::new(SessionResourceRegistry::new(self.capacity))
        }))
    }

    /// Get the registry of a live session.
    pub fn session(&self, session_id: &str) -> Option<Arc<SessionResourceRegistry<H>>> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Handle a "session destroyed" event.
    ///
    /// Returns `None` for an unknown session, otherwise the outcome of tearing
    /// down every handle the session still held.
    pub fn session_destroyed(&self, session_id: &str) -> Option<TeardownSummary> {
        let registry = self.sessions.write().remove(session_id)?;
        let summary = registry.teardown_all();
        debug!(
            session_id = %session_id,
            torn_down = summary.torn_down,
            failed = summary.failed.len(),
            "Session registry destroyed"
        );
        Some(summary)
    }
}

impl<H: ResourceHandle> std::fmt::Debug for SessionDirectory<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionDirectory")
            .field("capacity", &self.capacity)
            .field("sessions", &self.len())
            .finish()
    }
}
