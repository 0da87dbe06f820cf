//! `$include` nodes.
//!
//! A map entry whose key starts with the include keyword names another
//! source to merge into that map:
//!
//! ```toml
//! [db]
//! "$include" = "source=file,path=/etc/app/db.toml"
//! "$include:1" = "source=file,path=/etc/app/db-overrides.toml"
//! ```
//!
//! The value holds comma-separated `key=value` parameters (`\,` and `\=`
//! escape the separators); `source` picks a [`SourceFactory`]. The optional
//! number after `:` orders the import relative to the host map, which sits
//! at 0. Imports without a number use -1, so the host map overrides them.

use super::ConfigNodeProcessor;
use crate::error::CfgweaveError;
use crate::loader::LoaderRegistry;
use crate::node::merge;
use crate::source::{ConfigSource, FileConfigSource};
use cfgweave_model::{ConfigNode, GResult, ValidationError};
use std::collections::BTreeMap;
use std::sync::Arc;

const MAX_INCLUDE_DEPTH: usize = 16;

/// Builds a source from include parameters.
pub trait SourceFactory: Send + Sync {
    /// Value of the `source` parameter selecting this factory.
    fn name(&self) -> &str;

    fn build(&self, parameters: &BTreeMap<String, String>)
        -> Result<Box<dyn ConfigSource>, CfgweaveError>;
}

/// `source=file,path=<path>[,format=<format>]`
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSourceFactory;

impl SourceFactory for FileSourceFactory {
    fn name(&self) -> &str {
        "file"
    }

    fn build(
        &self,
        parameters: &BTreeMap<String, String>,
    ) -> Result<Box<dyn ConfigSource>, CfgweaveError> {
        let path = parameters
            .get("path")
            .ok_or_else(|| CfgweaveError::InvalidConfig("file include requires a path".to_string()))?;
        let mut source = FileConfigSource::new(path);
        if let Some(format) = parameters.get("format") {
            source = source.with_format(format);
        }
        Ok(Box::new(source))
    }
}

/// Factories by name.
#[derive(Clone, Default)]
pub struct SourceFactoryRegistry {
    factories: Vec<Arc<dyn SourceFactory>>,
}

impl std::fmt::Debug for SourceFactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.factories.iter().map(|s| s.name()).collect();
        f.debug_struct("SourceFactoryRegistry").field("factories", &names).finish()
    }
}

impl SourceFactoryRegistry {
    pub fn new(factories: Vec<Arc<dyn SourceFactory>>) -> Self {
        Self { factories }
    }

    /// The built-in `file` factory.
    pub fn with_defaults() -> Self {
        Self::new(vec![Arc::new(FileSourceFactory)])
    }

    pub fn push(&mut self, factory: Arc<dyn SourceFactory>) {
        self.factories.push(factory);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn SourceFactory>> {
        self.factories.iter().find(|f| f.name() == name)
    }
}

/// Merges sources named by include entries into their host map.
#[derive(Debug, Clone)]
pub struct IncludeProcessor {
    keyword: String,
    factories: SourceFactoryRegistry,
    loaders: LoaderRegistry,
}

impl IncludeProcessor {
    pub fn new(
        keyword: impl Into<String>,
        factories: SourceFactoryRegistry,
        loaders: LoaderRegistry,
    ) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            factories,
            loaders,
        }
    }

    fn process_at(&self, path: &str, node: ConfigNode, depth: usize) -> GResult<ConfigNode> {
        let ConfigNode::Map(entries) = node else {
            return GResult::ok(node);
        };
        if !entries.keys().any(|k| self.is_include_key(k)) {
            return GResult::ok(ConfigNode::Map(entries));
        }
        if depth >= MAX_INCLUDE_DEPTH {
            return GResult::fail_one(ValidationError::SourceLoadFailed {
                source_name: path.to_string(),
                reason: format!("includes nested more than {} deep", MAX_INCLUDE_DEPTH),
            });
        }

        let mut errors = Vec::new();
        let mut host = BTreeMap::new();
        let mut ordered: Vec<(i64, ConfigNode)> = Vec::new();

        for (key, child) in entries {
            if !self.is_include_key(&key) {
                host.insert(key, child);
                continue;
            }
            if let Some(nodes) = self.import(path, &child).drain_into(&mut errors) {
                let order = import_order(&key);
                ordered.extend(nodes.into_iter().map(|n| (order, n)));
            }
        }

        if ordered.is_empty() {
            return GResult::with_errors(ConfigNode::Map(host), errors);
        }

        ordered.push((0, ConfigNode::Map(host)));
        // stable: equal orders keep declaration order
        ordered.sort_by_key(|(order, _)| *order);

        let merged = ordered
            .into_iter()
            .map(|(_, node)| node)
            .reduce(|acc, next| {
                let (merged, merge_errors) = merge(path, acc, next).into_parts();
                errors.extend(merge_errors);
                merged.unwrap_or_else(ConfigNode::empty_map)
            })
            .unwrap_or_else(ConfigNode::empty_map);

        // imported sources may themselves include
        self.process_at(path, merged, depth + 1)
            .and_then(|node| GResult::with_errors(node, errors))
    }

    fn is_include_key(&self, key: &str) -> bool {
        key.to_lowercase().starts_with(&self.keyword)
    }

    fn import(&self, path: &str, node: &ConfigNode) -> GResult<Vec<ConfigNode>> {
        let ConfigNode::Leaf(leaf) = node else {
            return GResult::fail_one(ValidationError::ConfigNodeImportWrongNodeType {
                path: path.to_string(),
                found: node.kind_name().to_string(),
            });
        };
        let raw = match leaf.value.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => {
                return GResult::fail_one(ValidationError::ConfigNodeImportNodeEmpty {
                    path: path.to_string(),
                })
            }
        };

        let mut errors = Vec::new();
        let parameters = parse_parameters(path, raw, &mut errors);
        if !errors.is_empty() {
            return GResult::fail(errors);
        }

        let Some(factory_name) = parameters.get("source") else {
            return GResult::fail_one(ValidationError::ConfigNodeImportMalformed {
                path: path.to_string(),
                parameters: raw.to_string(),
                entry: "source".to_string(),
            });
        };
        let Some(factory) = self.factories.get(factory_name) else {
            return GResult::fail_one(ValidationError::NoSourceFactoryFound {
                path: path.to_string(),
                factory: factory_name.clone(),
            });
        };

        let loaded = factory
            .build(&parameters)
            .and_then(|source| self.loaders.load(source.as_ref()));
        match loaded {
            Ok(result) => result.map(|containers| containers.into_iter().map(|c| c.node).collect()),
            Err(err) => GResult::fail_one(ValidationError::SourceLoadFailed {
                source_name: raw.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

impl ConfigNodeProcessor for IncludeProcessor {
    fn name(&self) -> &str {
        "include"
    }

    fn process(&self, path: &str, node: ConfigNode) -> GResult<ConfigNode> {
        self.process_at(path, node, 0)
    }
}

/// `$include:3` → 3, otherwise -1.
fn import_order(key: &str) -> i64 {
    key.split(':')
        .nth(1)
        .and_then(|order| order.trim().parse().ok())
        .unwrap_or(-1)
}

/// `key=value` pairs separated by commas; `\,`, `\=` and `\\` escape
/// those characters inside a key or value.
fn parse_parameters(
    path: &str,
    raw: &str,
    errors: &mut Vec<ValidationError>,
) -> BTreeMap<String, String> {
    let mut parameters = BTreeMap::new();
    for entry in split_unescaped(raw, ',') {
        match split_unescaped(entry, '=').as_slice() {
            [key, value] if !key.trim().is_empty() && !value.trim().is_empty() => {
                parameters.insert(unescape(key.trim()), unescape(value.trim()));
            }
            _ => errors.push(ValidationError::ConfigNodeImportMalformed {
                path: path.to_string(),
                parameters: raw.to_string(),
                entry: entry.to_string(),
            }),
        }
    }
    parameters
}

/// Split on `separator` where it is not preceded by a backslash; escapes
/// are kept for [`unescape`].
fn split_unescaped(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == separator {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ (',' | '=' | '\\')) => out.push(next),
            // other backslashes are literal, as in Windows paths
            Some(next) => {
                out.push(c);
                out.push(next);
            }
            None => out.push(c),
        }
    }
    out
}
