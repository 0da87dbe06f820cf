//! Lists, sets, maps, optionals and raw nodes.

use super::descriptor::TypeDescriptor;
use super::{Decoder, DecoderContext, Value};
use cfgweave_model::{ConfigNode, GResult, Tags, ValidationError};
use std::collections::BTreeMap;

/// Lists and sets.
///
/// Decodes an array element by element. A leaf is split on commas not
/// preceded by a backslash (`a,b\,c` → `a`, `b,c`). A missing entry of a
/// sparse array yields [`Value::Null`] and an `ArrayMissingIndex` error;
/// elements that fail to decode are left out and their errors kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListDecoder;

impl ListDecoder {
    fn decode_items<'n>(
        &self,
        path: &str,
        tags: &Tags,
        items: impl Iterator<Item = Option<&'n ConfigNode>>,
        inner: &TypeDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let mut errors = Vec::new();
        let mut values = Vec::new();
        for (index, item) in items.enumerate() {
            let item_path = format!("{}[{}]", path, index);
            match item {
                None => {
                    errors.push(ValidationError::ArrayMissingIndex {
                        path: path.to_string(),
                        index,
                        fatal: ctx.settings.treat_missing_array_index_as_error,
                    });
                    values.push(Value::Null);
                }
                Some(node) => {
                    if let Some(value) = ctx
                        .decode_child(&item_path, tags, Some(node), inner)
                        .drain_into(&mut errors)
                    {
                        values.push(value);
                    }
                }
            }
        }
        GResult::with_errors(Value::List(values), errors)
    }
}

impl Decoder for ListDecoder {
    fn name(&self) -> &str {
        "List"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        matches!(ty, TypeDescriptor::List(_) | TypeDescriptor::Set(_))
    }

    fn decode(
        &self,
        path: &str,
        tags: &Tags,
        node: &ConfigNode,
        ty: &TypeDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let (TypeDescriptor::List(inner) | TypeDescriptor::Set(inner)) = ty else {
            return GResult::fail_one(ValidationError::NoDecodersFound {
                type_name: ty.to_string(),
                path: path.to_string(),
            });
        };

        match node {
            ConfigNode::Array(items) if items.is_empty() => {
                GResult::fail_one(ValidationError::DecodingArrayMissingValue {
                    path: path.to_string(),
                    decoder: self.name().to_string(),
                })
            }
            ConfigNode::Array(items) => {
                self.decode_items(path, tags, items.iter().map(Option::as_ref), inner, ctx)
            }
            ConfigNode::Leaf(leaf) => match leaf.value.as_deref() {
                Some(text) => {
                    let parts: Vec<ConfigNode> = split_unescaped(text)
                        .into_iter()
                        .map(|part| ConfigNode::leaf(part.trim()))
                        .collect();
                    self.decode_items(path, tags, parts.iter().map(Some), inner, ctx)
                }
                None => GResult::fail_one(ValidationError::DecodingLeafMissingValue {
                    path: path.to_string(),
                    decoder: self.name().to_string(),
                }),
            },
            ConfigNode::Map(_) => {
                GResult::fail_one(ValidationError::DecodingExpectedArrayNodeType {
                    path: path.to_string(),
                    found: node.kind_name().to_string(),
                    decoder: self.name().to_string(),
                })
            }
        }
    }
}

/// Split on `,` unless escaped as `\,`.
fn split_unescaped(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// String-keyed maps. Entries that fail to decode are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapDecoder;

impl Decoder for MapDecoder {
    fn name(&self) -> &str {
        "Map"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        matches!(ty, TypeDescriptor::Map(_))
    }

    fn decode(
        &self,
        path: &str,
        tags: &Tags,
        node: &ConfigNode,
        ty: &TypeDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let TypeDescriptor::Map(inner) = ty else {
            return GResult::fail_one(ValidationError::NoDecodersFound {
                type_name: ty.to_string(),
                path: path.to_string(),
            });
        };
        let ConfigNode::Map(entries) = node else {
            return GResult::fail_one(ValidationError::DecodingExpectedMapNodeType {
                path: path.to_string(),
                found: node.kind_name().to_string(),
                decoder: self.name().to_string(),
            });
        };

        let mut errors = Vec::new();
        let mut values = BTreeMap::new();
        for (key, child) in entries {
            let child_path = ctx.navigator.lexer().join(path, key);
            if let Some(value) = ctx
                .decode_child(&child_path, tags, Some(child), inner)
                .drain_into(&mut errors)
            {
                values.insert(key.clone(), value);
            }
        }
        GResult::with_errors(Value::Map(values), errors)
    }
}

/// `Option<T>`: a valueless leaf is `Null`, anything else decodes as `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalDecoder;

impl Decoder for OptionalDecoder {
    fn name(&self) -> &str {
        "Optional"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        ty.is_optional()
    }

    fn decode(
        &self,
        path: &str,
        tags: &Tags,
        node: &ConfigNode,
        ty: &TypeDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let TypeDescriptor::Optional(inner) = ty else {
            return GResult::fail_one(ValidationError::NoDecodersFound {
                type_name: ty.to_string(),
                path: path.to_string(),
            });
        };
        if matches!(node, ConfigNode::Leaf(leaf) if leaf.value.is_none()) {
            return GResult::ok(Value::Null);
        }
        ctx.registry.decode_node(path, tags, Some(node), inner, ctx)
    }
}

/// Hands back the node itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeDecoder;

impl Decoder for NodeDecoder {
    fn name(&self) -> &str {
        "ConfigNode"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        *ty == TypeDescriptor::Node
    }

    fn decode(
        &self,
        _path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        _ty: &TypeDescriptor,
        _ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        GResult::ok(Value::Node(node.clone()))
    }
}
