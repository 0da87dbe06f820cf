//! Sentence lexer for config paths.
//!
//! A path ("sentence") is split on the delimiter into words, and each word is
//! matched against the word pattern to produce a field token and, when it has
//! an `[n]` suffix, an index token.

use crate::config::LexerConfig;
use cfgweave_model::{GResult, Token, ValidationError};
use regex_lite::{Regex, RegexBuilder};

/// Errors building a lexer from configuration.
#[derive(Debug, thiserror::Error)]
pub enum LexerError {
    #[error("path delimiter must not be empty")]
    EmptyDelimiter,

    #[error("invalid path pattern: {0}")]
    InvalidPattern(#[from] regex_lite::Error),

    #[error("path pattern must define a capture group named 'name'")]
    MissingNameGroup,
}

/// Tokenizes config paths.
#[derive(Debug, Clone)]
pub struct PathLexer {
    delimiter: String,
    pattern: Regex,
    case_sensitive: bool,
    max_array_index: usize,
}

impl Default for PathLexer {
    fn default() -> Self {
        let config = LexerConfig::default();
        let pattern = RegexBuilder::new(&config.pattern)
            .case_insensitive(true)
            .build()
            .expect("default path pattern is a valid regex");
        Self {
            delimiter: config.delimiter,
            pattern,
            case_sensitive: config.case_sensitive,
            max_array_index: config.max_array_index,
        }
    }
}

impl PathLexer {
    /// Build a lexer from configuration.
    pub fn new(config: &LexerConfig) -> Result<Self, LexerError> {
        if config.delimiter.is_empty() {
            return Err(LexerError::EmptyDelimiter);
        }
        let pattern = RegexBuilder::new(&config.pattern)
            .case_insensitive(true)
            .build()?;
        if !pattern.capture_names().any(|n| n == Some("name")) {
            return Err(LexerError::MissingNameGroup);
        }
        Ok(Self {
            delimiter: config.delimiter.clone(),
            pattern,
            case_sensitive: config.case_sensitive,
            max_array_index: config.max_array_index,
        })
    }

    /// A lexer splitting on `delimiter` with the default word pattern.
    pub fn with_delimiter(delimiter: &str) -> Result<Self, LexerError> {
        Self::new(&LexerConfig {
            delimiter: delimiter.to_string(),
            ..LexerConfig::default()
        })
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Normalize a path or key before it is compared against the tree.
    pub fn normalize_sentence(&self, sentence: &str) -> String {
        if self.case_sensitive {
            sentence.to_string()
        } else {
            sentence.to_lowercase()
        }
    }

    /// Tokenize a path.
    ///
    /// Every word is evaluated even after a failure so all problems in the
    /// path are reported together. Any error means no tokens are returned.
    pub fn scan(&self, sentence: &str) -> GResult<Vec<Token>> {
        if sentence.is_empty() {
            return GResult::fail_one(ValidationError::EmptyPath);
        }

        let normalized = self.normalize_sentence(sentence);
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for word in normalized.split(self.delimiter.as_str()) {
            if let Some(word_tokens) = self.evaluate(word, sentence).drain_into(&mut errors) {
                tokens.extend(word_tokens);
            }
        }

        if errors.is_empty() {
            GResult::ok(tokens)
        } else {
            GResult::fail(errors)
        }
    }

    fn evaluate(&self, word: &str, sentence: &str) -> GResult<Vec<Token>> {
        if word.is_empty() {
            return GResult::fail_one(ValidationError::EmptyElement {
                path: sentence.to_string(),
            });
        }

        let Some(captures) = self.pattern.captures(word) else {
            return GResult::fail_one(ValidationError::FailedToTokenizeElement {
                element: word.to_string(),
                path: sentence.to_string(),
            });
        };

        let name = match captures.name("name") {
            Some(m) if !m.as_str().is_empty() => m.as_str().to_string(),
            _ => {
                return GResult::fail_one(ValidationError::UnableToParseName {
                    path: sentence.to_string(),
                })
            }
        };

        let array = captures.name("array");
        let index = captures.name("index").map(|m| m.as_str()).unwrap_or("");

        match array {
            None => GResult::ok(vec![Token::Field(name)]),
            Some(_) if index.is_empty() => {
                GResult::fail_one(ValidationError::InvalidArrayIndexToken {
                    element: word.to_string(),
                    path: sentence.to_string(),
                })
            }
            Some(_) => match index.trim().parse::<i64>() {
                Ok(i) if i < 0 => {
                    GResult::fail_one(ValidationError::InvalidArrayNegativeIndexToken {
                        element: word.to_string(),
                        index: i,
                        path: sentence.to_string(),
                    })
                }
                Ok(i) => match usize::try_from(i) {
                    Ok(i) if i <= self.max_array_index => {
                        GResult::ok(vec![Token::Field(name), Token::Index(i)])
                    }
                    _ => GResult::fail_one(ValidationError::InvalidArrayToken {
                        element: word.to_string(),
                        index: index.to_string(),
                        path: sentence.to_string(),
                    }),
                },
                Err(_) => GResult::fail_one(ValidationError::InvalidArrayToken {
                    element: word.to_string(),
                    index: index.to_string(),
                    path: sentence.to_string(),
                }),
            },
        }
    }

    /// Render tokens back into a path, e.g. `db.hosts[1].password`.
    pub fn render(&self, tokens: &[Token]) -> String {
        let mut path = String::new();
        for token in tokens {
            match token {
                Token::Field(name) => {
                    if !path.is_empty() {
                        path.push_str(&self.delimiter);
                    }
                    path.push_str(name);
                }
                Token::Index(i) => {
                    path.push('[');
                    path.push_str(&i.to_string());
                    path.push(']');
                }
            }
        }
        path
    }

    /// Join a parent path and a child key with the delimiter.
    pub fn join(&self, parent: &str, child: &str) -> String {
        if parent.is_empty() {
            child.to_string()
        } else {
            format!("{}{}{}", parent, self.delimiter, child)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scan(path: &str) -> GResult<Vec<Token>> {
        PathLexer::default().scan(path)
    }

    #[test]
    fn test_fields_and_index() {
        let tokens = scan("a.b[2].c").into_value().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::field("a"),
                Token::field("b"),
                Token::index(2),
                Token::field("c"),
            ]
        );
    }

    #[test]
    fn test_empty_path() {
        let result = scan("");
        assert!(!result.has_results());
        assert_eq!(result.errors(), &[ValidationError::EmptyPath]);
    }

    #[test]
    fn test_negative_index() {
        let result = scan("a.b[-1]");
        assert!(!result.has_results());
        assert!(matches!(
            result.errors()[0],
            ValidationError::InvalidArrayNegativeIndexToken { index: -1, .. }
        ));
    }

    #[test]
    fn test_non_numeric_index() {
        let result = scan("a.b[x]");
        assert!(matches!(
            &result.errors()[0],
            ValidationError::InvalidArrayToken { index, .. } if index == "x"
        ));
    }

    #[test]
    fn test_index_above_limit() {
        let result = scan("hosts[4611686018427387903]");
        assert!(!result.has_results());
        assert!(matches!(
            &result.errors()[0],
            ValidationError::InvalidArrayToken { index, .. } if index == "4611686018427387903"
        ));

        let lexer = PathLexer::new(&LexerConfig {
            max_array_index: 3,
            ..LexerConfig::default()
        })
        .unwrap();
        assert!(lexer.scan("hosts[3]").has_results());
        assert!(!lexer.scan("hosts[4]").has_results());
    }

    #[test]
    fn test_non_ascii_names() {
        let tokens = scan("données.größe[1]").into_value().unwrap();
        assert_eq!(
            tokens,
            vec![Token::field("données"), Token::field("größe"), Token::index(1)]
        );
    }

    #[test]
    fn test_missing_index() {
        let result = scan("a.b[]");
        assert!(matches!(
            result.errors()[0],
            ValidationError::InvalidArrayIndexToken { .. }
        ));
    }

    #[test]
    fn test_empty_element() {
        let result = scan("a..b");
        assert!(matches!(
            &result.errors()[0],
            ValidationError::EmptyElement { path } if path == "a..b"
        ));
    }

    #[test]
    fn test_word_failing_pattern() {
        let result = scan("a.b[1]x");
        assert!(matches!(
            result.errors()[0],
            ValidationError::FailedToTokenizeElement { .. }
        ));
    }

    #[test]
    fn test_all_errors_reported() {
        let result = scan("a[-1]..b[z]");
        assert_eq!(result.errors().len(), 3);
    }

    #[test]
    fn test_lower_cases_by_default() {
        let tokens = scan("DB.Port").into_value().unwrap();
        assert_eq!(tokens, vec![Token::field("db"), Token::field("port")]);
    }

    #[test]
    fn test_case_sensitive() {
        let lexer = PathLexer::new(&LexerConfig {
            case_sensitive: true,
            ..LexerConfig::default()
        })
        .unwrap();
        let tokens = lexer.scan("DB.Port").into_value().unwrap();
        assert_eq!(tokens, vec![Token::field("DB"), Token::field("Port")]);
    }

    #[test]
    fn test_custom_delimiter() {
        let lexer = PathLexer::with_delimiter("/").unwrap();
        let tokens = lexer.scan("db/hosts[0]").into_value().unwrap();
        assert_eq!(
            tokens,
            vec![Token::field("db"), Token::field("hosts"), Token::index(0)]
        );
        assert_eq!(lexer.render(&tokens), "db/hosts[0]");
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            PathLexer::with_delimiter(""),
            Err(LexerError::EmptyDelimiter)
        ));
        let bad_group = LexerConfig {
            pattern: r"^(?P<word>\w+)$".to_string(),
            ..LexerConfig::default()
        };
        assert!(matches!(
            PathLexer::new(&bad_group),
            Err(LexerError::MissingNameGroup)
        ));
        let bad_regex = LexerConfig {
            pattern: "([".to_string(),
            ..LexerConfig::default()
        };
        assert!(matches!(
            PathLexer::new(&bad_regex),
            Err(LexerError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_join() {
        let lexer = PathLexer::default();
        assert_eq!(lexer.join("", "db"), "db");
        assert_eq!(lexer.join("db", "port"), "db.port");
    }

    proptest! {
        #[test]
        fn prop_render_then_scan_round_trips(
            words in prop::collection::vec(("[a-z][a-z0-9_]{0,8}", prop::option::of(0usize..64)), 1..6)
        ) {
            let lexer = PathLexer::default();
            let mut tokens = Vec::new();
            for (name, index) in &words {
                tokens.push(Token::field(name.clone()));
                if let Some(i) = index {
                    tokens.push(Token::index(*i));
                }
            }
            let path = lexer.render(&tokens);
            let scanned = lexer.scan(&path).into_value().unwrap();
            prop_assert_eq!(scanned, tokens);
        }
    }
}
