//! Loaders for list sources.

use super::ConfigLoader;
use crate::error::CfgweaveError;
use crate::node::compile;
use crate::source::{ConfigSource, ENV_FORMAT, MAP_FORMAT};
use cfgweave_lexer::PathLexer;
use cfgweave_model::{ConfigNodeContainer, GResult};
use std::sync::Arc;

fn list_pairs(source: &dyn ConfigSource) -> Result<Vec<(String, String)>, CfgweaveError> {
    if !source.has_list() {
        return Err(CfgweaveError::SourceUnavailable(source.name()));
    }
    source.load_list()
}

/// Compiles `(path, value)` pairs from a map source.
#[derive(Debug, Clone)]
pub struct MapConfigLoader {
    lexer: Arc<PathLexer>,
}

impl MapConfigLoader {
    pub fn new(lexer: Arc<PathLexer>) -> Self {
        Self { lexer }
    }
}

impl ConfigLoader for MapConfigLoader {
    fn name(&self) -> &str {
        "mapConfig"
    }

    fn accepts(&self, format: &str) -> bool {
        format == MAP_FORMAT
    }

    fn load_source(
        &self,
        source: &dyn ConfigSource,
    ) -> Result<GResult<Vec<ConfigNodeContainer>>, CfgweaveError> {
        let pairs = list_pairs(source)?;
        Ok(compile(&self.lexer, pairs).map(|node| {
            vec![ConfigNodeContainer::new(node, source.id().clone(), source.tags().clone())]
        }))
    }
}

/// Compiles environment variables.
///
/// Variables whose names do not form a valid path are skipped silently;
/// a process environment routinely holds names like `_` or `A__B`.
#[derive(Debug, Clone)]
pub struct EnvironmentVarsLoader {
    lexer: Arc<PathLexer>,
}

impl EnvironmentVarsLoader {
    pub fn new(lexer: Arc<PathLexer>) -> Self {
        Self { lexer }
    }
}

impl ConfigLoader for EnvironmentVarsLoader {
    fn name(&self) -> &str {
        "envVars"
    }

    fn accepts(&self, format: &str) -> bool {
        format == ENV_FORMAT
    }

    fn load_source(
        &self,
        source: &dyn ConfigSource,
    ) -> Result<GResult<Vec<ConfigNodeContainer>>, CfgweaveError> {
        let pairs = list_pairs(source)?;
        let (node, errors) = compile(&self.lexer, pairs).into_parts();
        if !errors.is_empty() {
            tracing::debug!(skipped = errors.len(), "skipped environment variables with invalid names");
        }
        Ok(GResult::from_parts(
            node.map(|node| {
                vec![ConfigNodeContainer::new(node, source.id().clone(), source.tags().clone())]
            }),
            Vec::new(),
        ))
    }
}
