//! Structural path tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single step of a config path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Token {
    /// Key lookup in a map node.
    Field(String),
    /// Position lookup in an array node.
    Index(usize),
}

impl Token {
    /// Create a field token.
    pub fn field(name: impl Into<String>) -> Self {
        Token::Field(name.into())
    }

    /// Create an index token.
    pub fn index(index: usize) -> Self {
        Token::Index(index)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Field(name) => write!(f, "{}", name),
            Token::Index(index) => write!(f, "[{}]", index),
        }
    }
}
