//! Marks secret leaves.

use super::ConfigNodeProcessor;
use crate::config::DEFAULT_SECRET_PATTERN;
use crate::error::CfgweaveError;
use cfgweave_model::{ConfigNode, GResult, LeafNode, MetadataKey};
use regex_lite::Regex;

/// Flags leaves whose key matches a pattern as `secret` and `noCache`.
///
/// Secret values are masked in debug output and never held in the lookup
/// cache.
#[derive(Debug, Clone)]
pub struct SecretMarkingProcessor {
    pattern: Regex,
}

impl Default for SecretMarkingProcessor {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_SECRET_PATTERN).expect("default secret pattern is valid"),
        }
    }
}

impl SecretMarkingProcessor {
    pub fn new(pattern: &str) -> Result<Self, CfgweaveError> {
        let pattern = Regex::new(pattern).map_err(|e| CfgweaveError::pattern(pattern, e))?;
        Ok(Self { pattern })
    }

    fn is_secret_path(&self, path: &str) -> bool {
        let key = path.rsplit('.').next().unwrap_or(path);
        let key = key.split('[').next().unwrap_or(key);
        !key.is_empty() && self.pattern.is_match(key)
    }
}

impl ConfigNodeProcessor for SecretMarkingProcessor {
    fn name(&self) -> &str {
        "secretMarking"
    }

    fn process(&self, path: &str, node: ConfigNode) -> GResult<ConfigNode> {
        match node {
            ConfigNode::Leaf(leaf) if self.is_secret_path(path) => {
                let metadata = leaf
                    .metadata
                    .with(MetadataKey::Secret, "true")
                    .with(MetadataKey::NoCache, "true");
                GResult::ok(ConfigNode::Leaf(LeafNode {
                    value: leaf.value,
                    metadata,
                }))
            }
            other => GResult::ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::apply_processors;
    use std::sync::Arc;

    #[test]
    fn test_marks_matching_keys() {
        let processor: Arc<dyn ConfigNodeProcessor> = Arc::new(SecretMarkingProcessor::default());
        let tree = ConfigNode::map([(
            "db",
            ConfigNode::map([
                ("password", ConfigNode::leaf("hunter2")),
                ("host", ConfigNode::leaf("localhost")),
                ("api_tokens", ConfigNode::array([ConfigNode::leaf("t1")])),
            ]),
        )]);
        let processed = apply_processors(&[processor], "", tree).into_value().unwrap();
        let db = processed.get_key("db").unwrap();

        let password = db.get_key("password").unwrap().metadata().unwrap();
        assert!(password.is_secret());
        assert!(password.is_no_cache());
        assert!(!db.get_key("host").unwrap().metadata().unwrap().is_secret());
        let token = db.get_key("api_tokens").unwrap().get_index(0).unwrap();
        assert!(token.metadata().unwrap().is_secret());
    }

    #[test]
    fn test_custom_pattern() {
        let processor = SecretMarkingProcessor::new("^pin$").unwrap();
        assert!(processor.is_secret_path("card.pin"));
        assert!(!processor.is_secret_path("card.password"));
        assert!(SecretMarkingProcessor::new("(").is_err());
    }
}
