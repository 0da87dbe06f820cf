//! Operational errors for the cfgweave engine.
//!
//! Problems with the configuration itself travel as [`ValidationError`]s
//! inside a [`cfgweave_model::GResult`]. [`CfgweaveError`] covers failures to
//! read or parse sources, bad engine settings, and lookups whose collected
//! validation errors are fatal.

use cfgweave_lexer::LexerError;
use cfgweave_model::ValidationError;
use std::io;

/// Error types for engine operations
#[derive(Debug, thiserror::Error)]
pub enum CfgweaveError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse properties at line {line}: {reason}")]
    Properties { line: usize, reason: String },

    #[error("invalid path lexer settings: {0}")]
    Lexer(#[from] LexerError),

    #[error("invalid pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid setting: {0}")]
    InvalidConfig(String),

    #[error("source {0} provides neither a stream nor a list")]
    SourceUnavailable(String),

    #[error("no loader accepts format {format} for source {source_name}")]
    NoLoaderForFormat { format: String, source_name: String },

    #[error("no configuration sources registered")]
    NoSources,

    #[error("configuration has not been loaded")]
    NotLoaded,

    #[error("failed to load configuration:{}", render_errors(.errors))]
    Load { errors: Vec<ValidationError> },

    #[error("failed getting config path: {path}:{}", render_errors(.errors))]
    Validation {
        path: String,
        errors: Vec<ValidationError>,
    },
}

impl CfgweaveError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        CfgweaveError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn pattern(pattern: &str, error: regex_lite::Error) -> Self {
        CfgweaveError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: error.to_string(),
        }
    }

    /// Validation errors carried by a load or lookup failure.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            CfgweaveError::Load { errors } | CfgweaveError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn render_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("\n - level: {}, message: {}", e.level(), e))
        .collect()
}
