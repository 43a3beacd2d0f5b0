//! Scope capacity resolution.
//!
//! The capacity is the maximum number of live scopes a single session keeps
//! before the least recently used one is evicted. It is looked up from a small
//! ordered list of parameter names; the first one present decides.

use std::sync::OnceLock;

use tracing::{debug, info};

use crate::source::ParamSource;
use crate::{ConfigError, Result};

/// Primary capacity parameter.
pub const PARAM_MAX_ACTIVE_SCOPES: &str = "VIEWSTASH_MAX_ACTIVE_SCOPES";

/// Fallback parameter shared with hosts that count logical views.
pub const PARAM_LOGICAL_VIEWS: &str = "VIEWSTASH_LOGICAL_VIEWS";

/// Fallback parameter shared with hosts that count views per session.
pub const PARAM_VIEWS_IN_SESSION: &str = "VIEWSTASH_VIEWS_IN_SESSION";

/// Parameter names in precedence order.
pub const PARAM_NAMES: [&str; 3] = [
    PARAM_MAX_ACTIVE_SCOPES,
    PARAM_LOGICAL_VIEWS,
    PARAM_VIEWS_IN_SESSION,
];

/// Capacity used when no parameter is set.
pub const DEFAULT_MAX_ACTIVE_SCOPES: usize = 20;

/// Where a resolved capacity came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacitySource {
    /// Read from the named parameter.
    Param(String),
    /// No parameter was set.
    Default,
}

impl std::fmt::Display for CapacitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapacitySource::Param(name) => write!(f, "parameter {}", name),
            CapacitySource::Default => write!(f, "built-in default"),
        }
    }
}

/// A capacity together with how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCapacity {
    /// Maximum live scopes per session (`0` = unbounded).
    pub value: usize,
    /// How the value was resolved.
    pub source: CapacitySource,
}

/// Resolve the capacity using [`PARAM_NAMES`] and [`DEFAULT_MAX_ACTIVE_SCOPES`].
pub fn resolve_capacity(source: &dyn ParamSource) -> Result<ResolvedCapacity> {
    resolve_capacity_from(source, &PARAM_NAMES, DEFAULT_MAX_ACTIVE_SCOPES)
}

/// Resolve a capacity from an explicit list of parameter names.
///
/// The first name with a value decides: a malformed value is an error even if
/// a later parameter holds a valid number.
pub fn resolve_capacity_from(
    source: &dyn ParamSource,
    names: &[&str],
    default: usize,
) -> Result<ResolvedCapacity> {
    for name in names {
        let Some(raw) = source.param(name) else {
            continue;
        };

        let value = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidCapacity {
                name: name.to_string(),
                value: raw.clone(),
            })?;

        debug!(param = %name, value, "Capacity parameter found");
        return Ok(ResolvedCapacity {
            value,
            source: CapacitySource::Param(name.to_string()),
        });
    }

    Ok(ResolvedCapacity {
        value: default,
        source: CapacitySource::Default,
    })
}

/// Holds a capacity that is resolved at most once.
///
/// The first successful resolution is kept for the lifetime of the cell and
/// later calls ignore their source. A failed resolution is not stored, so
/// every attempt reports the configuration error again.
#[derive(Debug, Default)]
pub struct CapacityCell {
    cell: OnceLock<ResolvedCapacity>,
}

impl CapacityCell {
    /// Create an unresolved cell.
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// The process-wide cell used by hosts that share one capacity.
    pub fn global() -> &'static CapacityCell {
        static GLOBAL: CapacityCell = CapacityCell::new();
        &GLOBAL
    }

    /// Return the cached capacity, resolving it from `source` on first use.
    pub fn get_or_resolve(&self, source: &dyn ParamSource) -> Result<ResolvedCapacity> {
        if let Some(resolved) = self.cell.get() {
            return Ok(resolved.clone());
        }

        let resolved = resolve_capacity(source)?;
        // Another thread may have won the race; its value is kept.
        let stored = self.cell.get_or_init(|| resolved);
        info!(capacity = stored.value, source = %stored.source, "Scope capacity resolved");
        Ok(stored.clone())
    }

    /// The cached capacity, if it has been resolved.
    pub fn get(&self) -> Option<&ResolvedCapacity> {
        self.cell.get()
    }
}
