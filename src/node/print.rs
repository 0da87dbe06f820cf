//! Debug rendering of a merged tree.

use cfgweave_lexer::PathLexer;
use cfgweave_model::ConfigNode;

/// Shown in place of secret values.
pub const SECRET_MASK: &str = "*****";

/// Render one `path = value` line per leaf, secrets masked.
///
/// Leaves without a value render as `<none>`; absent array entries are
/// skipped.
pub fn debug_print(lexer: &PathLexer, root: &ConfigNode) -> String {
    let mut out = String::new();
    for (tokens, leaf) in root.leaves() {
        let value = if leaf.metadata.is_secret() {
            SECRET_MASK
        } else {
            leaf.value.as_deref().unwrap_or("<none>")
        };
        out.push_str(&lexer.render(&tokens));
        out.push_str(" = ");
        out.push_str(value);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgweave_model::{Metadata, MetadataKey};

    #[test]
    fn test_masks_secrets() {
        let root = ConfigNode::map([(
            "db",
            ConfigNode::map([
                ("port", ConfigNode::leaf("5432")),
                (
                    "password",
                    ConfigNode::leaf_with_metadata("hunter2", Metadata::flag(MetadataKey::Secret)),
                ),
                ("hosts", ConfigNode::Array(vec![None, Some(ConfigNode::empty_leaf())])),
            ]),
        )]);
        let text = debug_print(&PathLexer::default(), &root);
        assert_eq!(
            text,
            "db.hosts[1] = <none>\ndb.password = *****\ndb.port = 5432\n"
        );
        assert!(!text.contains("hunter2"));
    }
}
