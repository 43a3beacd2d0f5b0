//! Identifier and token types.

use std::borrow::Borrow;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::{Error, Result};

/// Identity of one stored resource handle (a random 128-bit value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Generate a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| Error::InvalidArgument(format!("resource id '{}': {}", s, e)))
    }
}

/// Opaque token remembered for a while after its resource was retired.
///
/// Tokens are never empty; construction rejects blank text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RetiredToken(String);

impl RetiredToken {
    /// Create a token, rejecting empty or whitespace-only text.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "retired token must not be empty".to_string(),
            ));
        }
        Ok(Self(token))
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hash and Eq are derived from the single String field, so they agree with str.
impl Borrow<str> for RetiredToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RetiredToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for RetiredToken {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for RetiredToken {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}
