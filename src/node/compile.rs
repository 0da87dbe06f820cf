//! Building a tree from flat `(path, value)` pairs.

use super::merge::merge;
use cfgweave_lexer::PathLexer;
use cfgweave_model::{ConfigNode, GResult, Token};

/// Compile ordered `(path, value)` pairs into one tree.
///
/// Each path becomes a single-branch tree which is merged over the trees
/// before it, so a later pair wins over an earlier one for the same path.
/// Array indexes may be sparse: defining only `hosts[1]` leaves an absent
/// entry at index 0. Pairs whose path fails to tokenize are skipped and
/// their errors reported.
pub fn compile<P, V>(lexer: &PathLexer, pairs: impl IntoIterator<Item = (P, V)>) -> GResult<ConfigNode>
where
    P: AsRef<str>,
    V: Into<String>,
{
    let mut errors = Vec::new();
    let mut root = ConfigNode::empty_map();

    for (path, value) in pairs {
        let path = path.as_ref();
        let Some(tokens) = lexer.scan(path).drain_into(&mut errors) else {
            continue;
        };
        let branch = build_branch(&tokens, ConfigNode::leaf(value));
        let current = std::mem::replace(&mut root, ConfigNode::empty_map());
        root = merge(path, current, branch)
            .drain_into(&mut errors)
            .unwrap_or_else(ConfigNode::empty_map);
    }

    GResult::with_errors(root, errors)
}

/// Wrap `leaf` in the maps and arrays the tokens describe.
pub fn build_branch(tokens: &[Token], leaf: ConfigNode) -> ConfigNode {
    tokens.iter().rev().fold(leaf, |child, token| match token {
        Token::Field(name) => ConfigNode::map([(name.clone(), child)]),
        Token::Index(index) => {
            let mut items = vec![None; *index];
            items.push(Some(child));
            ConfigNode::Array(items)
        }
    })
}
