//! Config loaders
//!
//! A loader turns a [`ConfigSource`] of a format it accepts into node
//! containers. The [`LoaderRegistry`] picks the first registered loader that
//! accepts a source's format.

mod document;
mod pairs;
mod properties;

pub use document::{JsonConfigLoader, TomlConfigLoader};
pub use pairs::{EnvironmentVarsLoader, MapConfigLoader};
pub use properties::{parse_properties, PropertiesConfigLoader};

use crate::error::CfgweaveError;
use crate::source::ConfigSource;
use cfgweave_lexer::PathLexer;
use cfgweave_model::{ConfigNodeContainer, GResult};
use std::sync::Arc;

/// Turns a source into node containers.
pub trait ConfigLoader: Send + Sync {
    fn name(&self) -> &str;

    fn accepts(&self, format: &str) -> bool;

    /// Load `source`.
    ///
    /// `Err` means the source could not be read or parsed at all; problems
    /// inside the configuration are reported in the `GResult`.
    fn load_source(
        &self,
        source: &dyn ConfigSource,
    ) -> Result<GResult<Vec<ConfigNodeContainer>>, CfgweaveError>;
}

/// Ordered set of loaders.
/// The built-in loaders: map, environment, TOML, JSON and properties.
pub fn default_loaders(lexer: Arc<PathLexer>) -> Vec<Arc<dyn ConfigLoader>> {
    vec![
        Arc::new(MapConfigLoader::new(Arc::clone(&lexer))),
        Arc::new(EnvironmentVarsLoader::new(Arc::clone(&lexer))),
        Arc::new(TomlConfigLoader::new(Arc::clone(&lexer))),
        Arc::new(JsonConfigLoader::new(Arc::clone(&lexer))),
        Arc::new(PropertiesConfigLoader::new(lexer)),
    ]
}

#[derive(Clone)]
pub struct LoaderRegistry {
    loaders: Vec<Arc<dyn ConfigLoader>>,
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.loaders.iter().map(|l| l.name()).collect();
        f.debug_struct("LoaderRegistry").field("loaders", &names).finish()
    }
}

impl LoaderRegistry {
    pub fn new(loaders: Vec<Arc<dyn ConfigLoader>>) -> Self {
        Self { loaders }
    }

    /// Map, environment, TOML, JSON and properties loaders.
    pub fn with_defaults(lexer: Arc<PathLexer>) -> Self {
        Self::new(default_loaders(lexer))
    }

    /// Add a loader after the existing ones.
    pub fn push(&mut self, loader: Arc<dyn ConfigLoader>) {
        self.loaders.push(loader);
    }

    pub fn loader_for(&self, format: &str) -> Option<&Arc<dyn ConfigLoader>> {
        self.loaders.iter().find(|l| l.accepts(format))
    }

    pub fn load(
        &self,
        source: &dyn ConfigSource,
    ) -> Result<GResult<Vec<ConfigNodeContainer>>, CfgweaveError> {
        let loader = self
            .loader_for(source.format())
            .ok_or_else(|| CfgweaveError::NoLoaderForFormat {
                format: source.format().to_string(),
                source_name: source.name(),
            })?;
        tracing::debug!(source = %source.name(), loader = loader.name(), "loading source");
        loader.load_source(source)
    }
}
