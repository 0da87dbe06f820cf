//! Deciding which collected errors fail a lookup.

use cfgweave_model::{Level, ValidationError};
use serde::{Deserialize, Serialize};

/// Fatality rules applied at the query boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorPolicy {
    pub treat_warnings_as_errors: bool,
    pub treat_missing_array_index_as_error: bool,
    pub treat_missing_values_as_errors: bool,
    pub treat_missing_discretionary_values_as_errors: bool,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            treat_warnings_as_errors: false,
            treat_missing_array_index_as_error: true,
            treat_missing_values_as_errors: true,
            treat_missing_discretionary_values_as_errors: false,
        }
    }
}

impl ErrorPolicy {
    /// Whether `error` fails the lookup that reported it.
    pub fn is_fatal(&self, error: &ValidationError) -> bool {
        if let ValidationError::ArrayMissingIndex { .. } = error {
            return self.treat_missing_array_index_as_error;
        }
        match error.level() {
            Level::Error => true,
            Level::MissingValue => self.treat_missing_values_as_errors,
            Level::MissingOptionalValue => self.treat_missing_discretionary_values_as_errors,
            Level::Warning => self.treat_warnings_as_errors,
            Level::Info => false,
        }
    }

    pub fn has_fatal(&self, errors: &[ValidationError]) -> bool {
        errors.iter().any(|e| self.is_fatal(e))
    }
}

/// Log level for configurable log statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Log `message` at a level chosen at runtime.
pub(crate) fn log_at(level: LogLevel, path: &str, message: &str) {
    match level {
        LogLevel::Error => tracing::error!(path, "{}", message),
        LogLevel::Warn => tracing::warn!(path, "{}", message),
        LogLevel::Info => tracing::info!(path, "{}", message),
        LogLevel::Debug => tracing::debug!(path, "{}", message),
        LogLevel::Trace => tracing::trace!(path, "{}", message),
    }
}
