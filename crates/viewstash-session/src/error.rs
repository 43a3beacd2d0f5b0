//! Error types for session registry operations.

use crate::id::ResourceId;

/// Failure reported by a [`ResourceHandle`](crate::ResourceHandle) teardown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TeardownError(String);

impl TeardownError {
    /// Create a teardown error with a human-readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// The reason given by the handle.
    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// Error type for session registry operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An identifier or token was empty or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A handle failed to tear down. The entry has already been removed.
    #[error("Teardown of resource {id} failed: {source}")]
    Teardown {
        id: ResourceId,
        #[source]
        source: TeardownError,
    },

    /// The scope capacity could not be resolved.
    #[error(transparent)]
    Config(#[from] viewstash_config::ConfigError),
}

/// Result type for session registry operations.
pub type Result<T> = std::result::Result<T, Error>;
