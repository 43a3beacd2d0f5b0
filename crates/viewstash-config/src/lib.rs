//! Configuration for viewstash sessions.
//!
//! Resolves the per-session scope capacity from an ordered list of named
//! parameters:
//! - Parameter sources (environment, in-memory maps, flat TOML files)
//!   chained with first-hit-wins precedence
//! - Fail-fast parsing that names the offending parameter and value
//! - A one-time cell so the capacity is resolved once and never changes

pub mod capacity;
pub mod error;
pub mod source;

pub use capacity::{
    resolve_capacity, resolve_capacity_from, CapacityCell, CapacitySource, ResolvedCapacity,
    DEFAULT_MAX_ACTIVE_SCOPES, PARAM_LOGICAL_VIEWS, PARAM_MAX_ACTIVE_SCOPES, PARAM_NAMES,
    PARAM_VIEWS_IN_SESSION,
};
pub use error::{ConfigError, Result};
pub use source::{EnvSource, Layered, MapSource, ParamSource, TomlSource};
