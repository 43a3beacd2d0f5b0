//! Session-scoped resource registry with LRU-bounded teardown.
//!
//! Each session owns a [`SessionResourceRegistry`] with:
//! - A bounded map of live resource handles, where eviction tears the
//!   least recently used handle down
//! - A bounded set of recently retired tokens, used as a grace-period signal
//! - Bulk teardown when the session ends
//!
//! [`SessionDirectory`] ties registries to session lifecycle events.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use viewstash_session::{ResourceBundle, ResourceId, RetiredToken, SessionResourceRegistry};
//!
//! let registry = SessionResourceRegistry::new(20);
//! let id = ResourceId::new();
//! registry.associate(id, Arc::new(ResourceBundle::new()));
//!
//! registry.retire(&id, Some(RetiredToken::new("state-1")?))?;
//! assert!(registry.is_recently_retired("state-1"));
//! # Ok::<(), viewstash_session::Error>(())
//! ```

mod directory;
mod error;
mod handle;
mod id;
mod registry;

pub use directory::SessionDirectory;
pub use error::{Error, Result, TeardownError};
pub use handle::{ResourceBundle, ResourceHandle};
pub use id::{ResourceId, RetiredToken};
pub use registry::{MAX_QUEUED_FAILURES, SessionResourceRegistry, TeardownSummary};
