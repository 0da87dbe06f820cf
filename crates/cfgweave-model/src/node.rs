//! The configuration node tree.
//!
//! A tree is built from three kinds of nodes:
//! - [`ConfigNode::Leaf`]: an optional string value plus metadata flags
//! - [`ConfigNode::Array`]: ordered children, entries may be absent
//! - [`ConfigNode::Map`]: keyed children
//!
//! Trees are never mutated after construction; merge and substitution build
//! new trees.

use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Keys for leaf metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetadataKey {
    /// The value is sensitive and is masked when printed.
    Secret,
    /// Lookups resolving to this value are never cached.
    NoCache,
    /// Free-form metadata set by a source or processor.
    Custom(String),
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataKey::Secret => write!(f, "secret"),
            MetadataKey::NoCache => write!(f, "noCache"),
            MetadataKey::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Metadata attached to a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    entries: BTreeMap<MetadataKey, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata with a single flag set to `true`.
    pub fn flag(key: MetadataKey) -> Self {
        Self::new().with(key, "true")
    }

    pub fn with(mut self, key: MetadataKey, value: impl Into<String>) -> Self {
        self.entries.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &MetadataKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetadataKey, &String)> {
        self.entries.iter()
    }

    fn is_set(&self, key: &MetadataKey) -> bool {
        self.get(key).is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    pub fn is_secret(&self) -> bool {
        self.is_set(&MetadataKey::Secret)
    }

    pub fn is_no_cache(&self) -> bool {
        self.is_set(&MetadataKey::NoCache)
    }

    /// Union of two metadata maps, `overlay` wins on a shared key.
    pub fn union(&self, overlay: &Metadata) -> Metadata {
        let mut entries = self.entries.clone();
        for (key, value) in &overlay.entries {
            entries.insert(key.clone(), value.clone());
        }
        Metadata { entries }
    }
}

/// A leaf value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafNode {
    pub value: Option<String>,
    pub metadata: Metadata,
}

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNode {
    Leaf(LeafNode),
    Array(Vec<Option<ConfigNode>>),
    Map(BTreeMap<String, ConfigNode>),
}

impl ConfigNode {
    /// A leaf holding `value`.
    pub fn leaf(value: impl Into<String>) -> Self {
        ConfigNode::Leaf(LeafNode {
            value: Some(value.into()),
            metadata: Metadata::default(),
        })
    }

    /// A leaf holding `value` with metadata.
    pub fn leaf_with_metadata(value: impl Into<String>, metadata: Metadata) -> Self {
        ConfigNode::Leaf(LeafNode {
            value: Some(value.into()),
            metadata,
        })
    }

    /// A leaf with no value.
    pub fn empty_leaf() -> Self {
        ConfigNode::Leaf(LeafNode::default())
    }

    /// An empty map.
    pub fn empty_map() -> Self {
        ConfigNode::Map(BTreeMap::new())
    }

    /// A map built from key/node pairs.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, ConfigNode)>) -> Self {
        ConfigNode::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// An array with every entry present.
    pub fn array(items: impl IntoIterator<Item = ConfigNode>) -> Self {
        ConfigNode::Array(items.into_iter().map(Some).collect())
    }

    /// Human-readable kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConfigNode::Leaf(_) => "leaf",
            ConfigNode::Array(_) => "array",
            ConfigNode::Map(_) => "map",
        }
    }

    /// Number of direct children; 1 for a leaf with a value, 0 otherwise.
    pub fn size(&self) -> usize {
        match self {
            ConfigNode::Leaf(leaf) => usize::from(leaf.value.is_some()),
            ConfigNode::Array(items) => items.len(),
            ConfigNode::Map(entries) => entries.len(),
        }
    }

    /// The value of a leaf.
    pub fn value(&self) -> Option<&str> {
        match self {
            ConfigNode::Leaf(leaf) => leaf.value.as_deref(),
            _ => None,
        }
    }

    /// Metadata of a leaf.
    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            ConfigNode::Leaf(leaf) => Some(&leaf.metadata),
            _ => None,
        }
    }

    /// Child of a map by key.
    pub fn get_key(&self, key: &str) -> Option<&ConfigNode> {
        match self {
            ConfigNode::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Child of an array by index, `None` for an absent entry.
    pub fn get_index(&self, index: usize) -> Option<&ConfigNode> {
        match self {
            ConfigNode::Array(items) => items.get(index).and_then(Option::as_ref),
            _ => None,
        }
    }

    /// Child addressed by a single token.
    pub fn get(&self, token: &Token) -> Option<&ConfigNode> {
        match token {
            Token::Field(name) => self.get_key(name),
            Token::Index(index) => self.get_index(*index),
        }
    }

    /// False if any leaf in this subtree is flagged no-cache.
    pub fn is_cacheable(&self) -> bool {
        match self {
            ConfigNode::Leaf(leaf) => !leaf.metadata.is_no_cache(),
            ConfigNode::Array(items) => items.iter().flatten().all(ConfigNode::is_cacheable),
            ConfigNode::Map(entries) => entries.values().all(ConfigNode::is_cacheable),
        }
    }

    /// Every leaf with the tokens leading to it, in tree order.
    pub fn leaves(&self) -> Vec<(Vec<Token>, &LeafNode)> {
        let mut out = Vec::new();
        collect_leaves(self, &mut Vec::new(), &mut out);
        out
    }
}

fn collect_leaves<'a>(
    node: &'a ConfigNode,
    prefix: &mut Vec<Token>,
    out: &mut Vec<(Vec<Token>, &'a LeafNode)>,
) {
    match node {
        ConfigNode::Leaf(leaf) => out.push((prefix.clone(), leaf)),
        ConfigNode::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if let Some(item) = item {
                    prefix.push(Token::Index(i));
                    collect_leaves(item, prefix, out);
                    prefix.pop();
                }
            }
        }
        ConfigNode::Map(entries) => {
            for (key, child) in entries {
                prefix.push(Token::Field(key.clone()));
                collect_leaves(child, prefix, out);
                prefix.pop();
            }
        }
    }
}
