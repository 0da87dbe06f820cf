//! Engine configuration
//!
//! [`CoreConfig`] holds every tunable of the engine: error fatality flags,
//! substitution tokens and depth, date/time formats, cache and path lexer
//! settings. [`ErrorPolicy`] is the subset consulted at the query boundary.

mod policy;
mod settings;

pub use policy::{ErrorPolicy, LogLevel};
pub use settings::{CoreConfig, DEFAULT_SECRET_PATTERN, RFC3339};

pub(crate) use policy::log_at;
