//! Merged trees per tag-set, swapped atomically on reload.

use super::merge::merge_layers;
use cfgweave_model::{ConfigNode, ConfigNodeContainer, GResult, Tags};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Merged trees per tag-set.
///
/// The tree for a tag-set folds, in registration order, every container
/// whose tags are a subset of it. Untagged containers therefore appear in
/// every tree. Trees for the untagged set and for each container's own
/// tags are merged when the snapshot is built, so merge errors surface at
/// load time; any other tag-set is merged on first request and kept.
#[derive(Debug, Default)]
pub struct NodeSnapshot {
    containers: Vec<ConfigNodeContainer>,
    roots: RwLock<HashMap<Tags, Arc<ConfigNode>>>,
    loaded: bool,
}

impl NodeSnapshot {
    pub fn build(containers: &[ConfigNodeContainer]) -> GResult<NodeSnapshot> {
        let mut tag_sets: Vec<&Tags> = vec![];
        let untagged = Tags::new();
        tag_sets.push(&untagged);
        for container in containers {
            if !tag_sets.contains(&&container.tags) {
                tag_sets.push(&container.tags);
            }
        }

        let mut roots = HashMap::new();
        let mut errors = Vec::new();
        for tags in tag_sets {
            let (root, merge_errors) = merge_for(containers, tags).into_parts();
            for error in merge_errors {
                if !errors.contains(&error) {
                    errors.push(error);
                }
            }
            if let Some(root) = root {
                tracing::debug!(tags = %tags, "merged configuration tree");
                roots.insert(tags.clone(), Arc::new(root));
            }
        }

        let snapshot = NodeSnapshot {
            containers: containers.to_vec(),
            loaded: !roots.is_empty(),
            roots: RwLock::new(roots),
        };
        GResult::with_errors(snapshot, errors)
    }

    pub fn is_empty(&self) -> bool {
        !self.loaded
    }

    /// The tree for `tags`; an empty map when no container applies.
    pub fn root(&self, tags: &Tags) -> Option<Arc<ConfigNode>> {
        if let Some(root) = self
            .roots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(tags)
        {
            return Some(Arc::clone(root));
        }

        let (root, errors) = merge_for(&self.containers, tags).into_parts();
        for error in &errors {
            tracing::warn!(tags = %tags, "{}", error);
        }
        let root = Arc::new(root?);
        tracing::debug!(tags = %tags, "merged configuration tree on request");
        let mut roots = self.roots.write().unwrap_or_else(|e| e.into_inner());
        Some(Arc::clone(roots.entry(tags.clone()).or_insert(root)))
    }
}

fn merge_for(containers: &[ConfigNodeContainer], tags: &Tags) -> GResult<ConfigNode> {
    let layers = containers
        .iter()
        .filter(|c| c.tags.is_subset(tags))
        .map(|c| c.node.clone());
    merge_layers(layers)
}

/// Holds the active snapshot.
///
/// Readers clone the `Arc` and release the lock, so a reload never exposes
/// a half-built snapshot.
#[derive(Debug, Default)]
pub struct ConfigNodeManager {
    current: RwLock<Arc<NodeSnapshot>>,
}

impl ConfigNodeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<NodeSnapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub fn install(&self, snapshot: NodeSnapshot) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(snapshot);
    }

    pub fn is_loaded(&self) -> bool {
        !self.snapshot().is_empty()
    }
}
