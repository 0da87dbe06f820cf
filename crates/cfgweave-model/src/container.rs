//! Loaded fragments awaiting merge.

use crate::node::ConfigNode;
use crate::tags::Tags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a config source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        SourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node fragment together with the source and tags it came from.
///
/// Containers are merged in the order their sources were registered; later
/// sources win on conflicting leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigNodeContainer {
    pub node: ConfigNode,
    pub source_id: SourceId,
    pub tags: Tags,
}

impl ConfigNodeContainer {
    pub fn new(node: ConfigNode, source_id: SourceId, tags: Tags) -> Self {
        Self {
            node,
            source_id,
            tags,
        }
    }
}
