//! Process environment source.

use super::{new_source_id, ConfigSource, ENV_FORMAT};
use crate::error::CfgweaveError;
use cfgweave_model::{SourceId, Tags};
use std::env;

/// Environment variables as config paths.
///
/// `DB_HOSTS_0_PASSWORD` becomes `db.hosts.0.password`: lower-cased, with
/// `_` turned into the path delimiter `.`.
#[derive(Debug, Clone)]
pub struct EnvironmentConfigSource {
    id: SourceId,
    prefix: Option<String>,
    remove_prefix: bool,
    tags: Tags,
}

impl Default for EnvironmentConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentConfigSource {
    /// Every environment variable.
    pub fn new() -> Self {
        Self {
            id: new_source_id(),
            prefix: None,
            remove_prefix: false,
            tags: Tags::new(),
        }
    }

    /// Only variables starting with `prefix`, optionally stripped from the path.
    pub fn with_prefix(prefix: impl Into<String>, remove_prefix: bool) -> Self {
        Self {
            prefix: Some(prefix.into()),
            remove_prefix,
            ..Self::new()
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    fn to_pairs(&self, vars: impl Iterator<Item = (String, String)>) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = vars
            .filter_map(|(key, value)| {
                let key = match &self.prefix {
                    Some(prefix) if !key.starts_with(prefix.as_str()) => return None,
                    Some(prefix) if self.remove_prefix => key[prefix.len()..].to_string(),
                    _ => key,
                };
                let key = key.trim_matches('_');
                if key.is_empty() {
                    return None;
                }
                Some((key.to_lowercase().replace('_', "."), value))
            })
            .collect();
        // stable ordering across runs
        pairs.sort();
        pairs
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("envVars({})", prefix),
            None => "envVars".to_string(),
        }
    }

    fn format(&self) -> &str {
        ENV_FORMAT
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn has_list(&self) -> bool {
        true
    }

    fn load_list(&self) -> Result<Vec<(String, String)>, CfgweaveError> {
        Ok(self.to_pairs(env::vars()))
    }
}
