//! Substitution tree nodes.

/// A node of a parsed substitution tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionNode {
    /// Literal text, escapes already removed.
    Text(String),
    /// A `${...}` region; its children make up the transform expression.
    Transform(Vec<SubstitutionNode>),
}

impl SubstitutionNode {
    pub fn text(text: impl Into<String>) -> Self {
        SubstitutionNode::Text(text.into())
    }
}
