//! Lexer configuration.

use serde::{Deserialize, Serialize};

/// Default word delimiter.
pub const DEFAULT_DELIMITER: &str = ".";

/// Default word pattern.
///
/// Named groups:
/// - `name`: the field name (required); any text without brackets, so
///   non-ASCII keys tokenize
/// - `array`: the whole `[...]` suffix, present for array access
/// - `index`: the text between the brackets
///
/// The index group accepts any text; the lexer validates it as a
/// non-negative integer.
pub const DEFAULT_PATH_PATTERN: &str =
    r"^(?P<name>[^\[\]]+)(?P<array>\[(?P<index>[^\]]*)\])?$";

/// Default largest accepted array index.
pub const DEFAULT_MAX_ARRAY_INDEX: usize = 10_000;

/// Configuration for a [`crate::PathLexer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerConfig {
    /// Literal string separating path words.
    pub delimiter: String,

    /// Regular expression each word must match (see [`DEFAULT_PATH_PATTERN`]).
    pub pattern: String,

    /// When false (the default) paths are lower-cased before tokenizing.
    pub case_sensitive: bool,

    /// Largest index an `[n]` suffix may name. Sources build arrays up to
    /// the index, so this bounds what a single key can allocate.
    pub max_array_index: usize,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            pattern: DEFAULT_PATH_PATTERN.to_string(),
            case_sensitive: false,
            max_array_index: DEFAULT_MAX_ARRAY_INDEX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LexerConfig::default();
        assert_eq!(config.delimiter, ".");
        assert_eq!(config.pattern, DEFAULT_PATH_PATTERN);
        assert!(!config.case_sensitive);
        assert_eq!(config.max_array_index, DEFAULT_MAX_ARRAY_INDEX);
    }
}
