//! Node merge logic
//!
//! Merges two node trees with:
//! - Maps: deep-merge by key
//! - Arrays: merge index by index, extras of the longer side kept
//! - Leaves: overlay wins, metadata unioned
//! - Mismatched kinds: overlay wins, with a warning

use cfgweave_model::{ConfigNode, GResult, LeafNode, ValidationError};

/// Deep merge two nodes, `overlay` taking precedence.
///
/// Merge semantics:
/// - Map + Map: union of keys, shared keys merged recursively
/// - Array + Array: entries merged pairwise up to the shorter length; an
///   absent entry on either side takes the other side's entry; the tail of
///   the longer array is kept as-is
/// - Leaf + Leaf: overlay value wins, metadata unioned with overlay winning
/// - Any other pairing: overlay wins and a `TypeMismatchDuringMerge` warning
///   is recorded
///
/// Always produces a tree.
pub fn merge(path: &str, base: ConfigNode, overlay: ConfigNode) -> GResult<ConfigNode> {
    let mut errors = Vec::new();
    let merged = merge_into(path, base, overlay, &mut errors);
    GResult::with_errors(merged, errors)
}

fn merge_into(
    path: &str,
    base: ConfigNode,
    overlay: ConfigNode,
    errors: &mut Vec<ValidationError>,
) -> ConfigNode {
    match (base, overlay) {
        (ConfigNode::Map(mut base_map), ConfigNode::Map(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => {
                        merge_into(&key_path(path, &key), base_value, overlay_value, errors)
                    }
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            ConfigNode::Map(base_map)
        }

        (ConfigNode::Array(base_items), ConfigNode::Array(overlay_items)) => {
            let length = base_items.len().max(overlay_items.len());
            let mut base_iter = base_items.into_iter();
            let mut overlay_iter = overlay_items.into_iter();
            let mut merged = Vec::with_capacity(length);

            for index in 0..length {
                let base_entry = base_iter.next().flatten();
                let overlay_entry = overlay_iter.next().flatten();
                merged.push(match (base_entry, overlay_entry) {
                    (Some(b), Some(o)) => Some(merge_into(&index_path(path, index), b, o, errors)),
                    (b, o) => o.or(b),
                });
            }
            ConfigNode::Array(merged)
        }

        (ConfigNode::Leaf(base_leaf), ConfigNode::Leaf(overlay_leaf)) => ConfigNode::Leaf(LeafNode {
            metadata: base_leaf.metadata.union(&overlay_leaf.metadata),
            value: overlay_leaf.value,
        }),

        (base, overlay) => {
            tracing::warn!(
                path,
                base = base.kind_name(),
                overlay = overlay.kind_name(),
                "type mismatch during merge, overlay wins"
            );
            errors.push(ValidationError::TypeMismatchDuringMerge {
                path: path.to_string(),
                base: base.kind_name().to_string(),
                overlay: overlay.kind_name().to_string(),
            });
            overlay
        }
    }
}

/// Merge nodes in order (first is base, last has highest precedence).
///
/// An empty input yields an empty map.
pub fn merge_layers(layers: impl IntoIterator<Item = ConfigNode>) -> GResult<ConfigNode> {
    let mut errors = Vec::new();
    let merged = layers
        .into_iter()
        .reduce(|acc, next| merge_into("", acc, next, &mut errors))
        .unwrap_or_else(ConfigNode::empty_map);
    GResult::with_errors(merged, errors)
}

fn key_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn index_path(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}
