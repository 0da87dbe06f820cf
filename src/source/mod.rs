//! Configuration sources
//!
//! A source hands raw configuration to a loader, either as a text stream
//! (a TOML or JSON document) or as a list of `(path, value)` pairs. The
//! source's format picks the loader.

mod env;
mod map;
mod text;

pub use env::EnvironmentConfigSource;
pub use map::MapConfigSource;
pub use text::{FileConfigSource, StringConfigSource};

use crate::error::CfgweaveError;
use cfgweave_model::{SourceId, Tags};

/// Format of list sources built from in-memory pairs.
pub const MAP_FORMAT: &str = "mapConfig";

/// Format of the environment variable source.
pub const ENV_FORMAT: &str = "envVars";

/// A provider of raw configuration.
pub trait ConfigSource: Send + Sync {
    fn id(&self) -> &SourceId;

    /// Human-readable name for logs and errors.
    fn name(&self) -> String;

    /// Format used to select a loader, e.g. `toml` or `envVars`.
    fn format(&self) -> &str;

    fn tags(&self) -> &Tags;

    fn has_stream(&self) -> bool {
        false
    }

    fn load_stream(&self) -> Result<String, CfgweaveError> {
        Err(CfgweaveError::SourceUnavailable(self.name()))
    }

    fn has_list(&self) -> bool {
        false
    }

    fn load_list(&self) -> Result<Vec<(String, String)>, CfgweaveError> {
        Err(CfgweaveError::SourceUnavailable(self.name()))
    }
}

pub(crate) fn new_source_id() -> SourceId {
    SourceId::new(uuid::Uuid::new_v4().to_string())
}
