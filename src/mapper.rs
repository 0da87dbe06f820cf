//! Path mappers.
//!
//! When a field name is looked up in a map node, each mapper turns the name
//! into a candidate token sequence. The navigator tries the candidates in
//! mapper priority order and the first one that resolves wins, so a field
//! declared as `dbPort` can be found under `db_port` or `db-port`.

use cfgweave_lexer::PathLexer;
use cfgweave_model::{GResult, Token, ValidationError};

/// Maps a field name to the tokens used to look it up.
pub trait PathMapper: Send + Sync {
    fn name(&self) -> &str;

    /// Higher priorities are tried first.
    fn priority(&self) -> i32;

    fn map(&self, path: &str, sentence: &str, lexer: &PathLexer) -> GResult<Vec<Token>>;
}

/// The name as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPathMapper;

impl PathMapper for StandardPathMapper {
    fn name(&self) -> &str {
        "standard"
    }

    fn priority(&self) -> i32 {
        1000
    }

    fn map(&self, _path: &str, sentence: &str, lexer: &PathLexer) -> GResult<Vec<Token>> {
        lexer.scan(sentence)
    }
}

/// camelCase names looked up as snake_case.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCasePathMapper;

impl PathMapper for SnakeCasePathMapper {
    fn name(&self) -> &str {
        "snakeCase"
    }

    fn priority(&self) -> i32 {
        550
    }

    fn map(&self, path: &str, sentence: &str, lexer: &PathLexer) -> GResult<Vec<Token>> {
        let mapped = camel_words(sentence).join("_");
        rescan(path, &mapped, lexer, "snake case path mapping")
    }
}

/// camelCase and snake_case names looked up as kebab-case.
#[derive(Debug, Clone, Copy, Default)]
pub struct KebabCasePathMapper;

impl PathMapper for KebabCasePathMapper {
    fn name(&self) -> &str {
        "kebabCase"
    }

    fn priority(&self) -> i32 {
        500
    }

    fn map(&self, path: &str, sentence: &str, lexer: &PathLexer) -> GResult<Vec<Token>> {
        let mapped = camel_words(sentence).join("-").replace('_', "-");
        rescan(path, &mapped, lexer, "kebab case path mapping")
    }
}

fn rescan(path: &str, mapped: &str, lexer: &PathLexer, stage: &str) -> GResult<Vec<Token>> {
    let scanned = lexer.scan(mapped);
    if scanned.has_results() {
        scanned
    } else {
        GResult::fail_one(ValidationError::NoResultsFoundForNode {
            path: path.to_string(),
            token: mapped.to_string(),
            stage: stage.to_string(),
        })
    }
}

/// Split a camelCase word, lower-casing each part.
///
/// A word boundary sits before an uppercase letter that follows a
/// non-uppercase character, and before the last capital of an acronym that
/// starts a new word (`HTTPServer` → `http`, `server`).
fn camel_words(sentence: &str) -> Vec<String> {
    let chars: Vec<char> = sentence.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if !prev.is_uppercase() || next_is_lower {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
