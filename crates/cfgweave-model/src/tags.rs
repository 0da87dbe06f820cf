//! Tags identify an environment or variant dimension of a config source.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single `key=value` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// An `environment=<value>` tag.
    pub fn environment(value: impl Into<String>) -> Self {
        Self::new("environment", value)
    }

    /// A `profile=<value>` tag.
    pub fn profile(value: impl Into<String>) -> Self {
        Self::new("profile", value)
    }

    /// Parse `key=value`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (key, value) = raw.split_once('=')?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self::new(key, value))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An ordered set of tags.
///
/// Ordering is canonical so equal sets hash identically regardless of
/// construction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tags(BTreeSet<Tag>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags from `(key, value)` pairs.
    pub fn of<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Tags(pairs.into_iter().map(|(k, v)| Tag::new(k, v)).collect())
    }

    pub fn with(mut self, tag: Tag) -> Self {
        self.0.insert(tag);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|t| t.key == key)
    }

    /// True if every tag of `self` is also in `other`.
    pub fn is_subset(&self, other: &Tags) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Union where tags of `overlay` replace any tag of `self` sharing a key.
    pub fn union_overriding(&self, overlay: &Tags) -> Tags {
        let mut merged: BTreeSet<Tag> = self
            .0
            .iter()
            .filter(|t| !overlay.contains_key(&t.key))
            .cloned()
            .collect();
        merged.extend(overlay.0.iter().cloned());
        Tags(merged)
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Tags(iter.into_iter().collect())
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", tag)?;
        }
        write!(f, "}}")
    }
}
