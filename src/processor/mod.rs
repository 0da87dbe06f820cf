//! Node processors
//!
//! Processors rewrite every loaded fragment before it is merged. They run
//! top-down: each processor sees a node before its children, so a node an
//! include brings in is itself processed.

mod include;
mod secret;

pub use include::{FileSourceFactory, IncludeProcessor, SourceFactory, SourceFactoryRegistry};
pub use secret::SecretMarkingProcessor;

use cfgweave_model::{ConfigNode, GResult};
use std::sync::Arc;

/// Rewrites a node during loading.
pub trait ConfigNodeProcessor: Send + Sync {
    fn name(&self) -> &str;

    /// Process one node. Children are visited separately.
    fn process(&self, path: &str, node: ConfigNode) -> GResult<ConfigNode>;
}

/// Run every processor over `node` and its descendants.
pub fn apply_processors(
    processors: &[Arc<dyn ConfigNodeProcessor>],
    path: &str,
    node: ConfigNode,
) -> GResult<ConfigNode> {
    let mut errors = Vec::new();
    let mut current = node;
    for processor in processors {
        match processor.process(path, current).drain_into(&mut errors) {
            Some(next) => current = next,
            None => return GResult::fail(errors),
        }
    }

    let processed = match current {
        ConfigNode::Map(entries) => {
            let mut out = std::collections::BTreeMap::new();
            for (key, child) in entries {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                if let Some(child) =
                    apply_processors(processors, &child_path, child).drain_into(&mut errors)
                {
                    out.insert(key, child);
                }
            }
            ConfigNode::Map(out)
        }
        ConfigNode::Array(items) => ConfigNode::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    item.and_then(|child| {
                        apply_processors(processors, &format!("{}[{}]", path, i), child)
                            .drain_into(&mut errors)
                    })
                })
                .collect(),
        ),
        leaf => leaf,
    };

    GResult::with_errors(processed, errors)
}
