//! Resource handles and the default bundle implementation.

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::error::TeardownError;

/// A caller-defined group of stateful objects with a single teardown step.
///
/// The registry stores handles behind `Arc` and never looks inside them. It
/// calls [`teardown`](ResourceHandle::teardown) at most once per eviction or
/// retirement, so implementations only need to be safe against a repeated
/// call across those events, not against concurrent ones.
pub trait ResourceHandle: Send + Sync + 'static {
    /// Release everything held by this handle.
    fn teardown(&self) -> std::result::Result<(), TeardownError>;
}

type TeardownAction = Box<dyn FnOnce() -> std::result::Result<(), String> + Send>;

/// A [`ResourceHandle`] made of named teardown actions.
///
/// The first call to [`teardown`](ResourceHandle::teardown) runs every action
/// in registration order, continuing past failures and reporting the first
/// one. Later calls do nothing.
pub struct ResourceBundle {
    actions: Mutex<Option<Vec<(String, TeardownAction)>>>,
}

impl ResourceBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self {
            actions: Mutex::new(Some(Vec::new())),
        }
    }

    /// Register an action to run on teardown.
    ///
    /// Returns `false` (and drops the action unrun) if the bundle has already
    /// been torn down.
    pub fn on_teardown<F>(&self, name: impl Into<String>, action: F) -> bool
    where
        F: FnOnce() -> std::result::Result<(), String> + Send + 'static,
    {
        let name = name.into();
        let action: TeardownAction = Box::new(action);
        match self.actions.lock().as_mut() {
            Some(actions) => {
                actions.push((name, action));
                true
            }
            None => {
                warn!(action = %name, "Bundle already torn down, action not registered");
                false
            }
        }
    }

    /// Number of actions waiting to run.
    pub fn len(&self) -> usize {
        self.actions.lock().as_ref().map_or(0, Vec::len)
    }

    /// Check if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if teardown has already run.
    pub fn is_torn_down(&self) -> bool {
        self.actions.lock().is_none()
    }
}

impl Default for ResourceBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandle for ResourceBundle {
    fn teardown(&self) -> std::result::Result<(), TeardownError> {
        // Take the actions under the lock, run them without it.
        let Some(actions) = self.actions.lock().take() else {
            return Ok(());
        };

        let mut first_failure = None;
        for (name, action) in actions {
            trace!(action = %name, "Running teardown action");
            if let Err(reason) = action() {
                warn!(action = %name, error = %reason, "Teardown action failed");
                first_failure
                    .get_or_insert_with(|| TeardownError::new(format!("{}: {}", name, reason)));
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ResourceBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let actions = self.actions.lock();
        f.debug_struct("ResourceBundle")
            .field(
                "actions",
                &actions
                    .as_ref()
                    .map(|a| a.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>()),
            )
            .finish()
    }
}
