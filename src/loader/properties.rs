//! Loader for `.properties` documents.

use super::ConfigLoader;
use crate::error::CfgweaveError;
use crate::node::compile;
use crate::source::ConfigSource;
use cfgweave_lexer::PathLexer;
use cfgweave_model::{ConfigNodeContainer, GResult};
use std::sync::Arc;

/// Parses `key=value` documents and compiles the pairs like a map source.
///
/// Accepts the `properties` and `props` formats.
#[derive(Debug, Clone)]
pub struct PropertiesConfigLoader {
    lexer: Arc<PathLexer>,
}

impl PropertiesConfigLoader {
    pub fn new(lexer: Arc<PathLexer>) -> Self {
        Self { lexer }
    }
}

impl ConfigLoader for PropertiesConfigLoader {
    fn name(&self) -> &str {
        "properties"
    }

    fn accepts(&self, format: &str) -> bool {
        matches!(format, "properties" | "props")
    }

    fn load_source(
        &self,
        source: &dyn ConfigSource,
    ) -> Result<GResult<Vec<ConfigNodeContainer>>, CfgweaveError> {
        if !source.has_stream() {
            return Err(CfgweaveError::SourceUnavailable(source.name()));
        }
        let pairs = parse_properties(&source.load_stream()?)?;
        tracing::trace!(source = %source.name(), pairs = pairs.len(), "parsed properties");
        Ok(compile(&self.lexer, pairs).map(|node| {
            vec![ConfigNodeContainer::new(node, source.id().clone(), source.tags().clone())]
        }))
    }
}

/// Split a properties document into `(key, value)` pairs in file order.
///
/// Lines starting with `#` or `!` are comments. A key ends at the first
/// unescaped `=`, `:` or whitespace. A line ending in an odd number of
/// backslashes continues on the next line with its leading whitespace
/// dropped. Escapes: `\t \n \r \f \uXXXX`; any other escaped character
/// stands for itself.
pub fn parse_properties(text: &str) -> Result<Vec<(String, String)>, CfgweaveError> {
    let mut pairs = Vec::new();
    let mut lines = text.lines().enumerate();

    while let Some((number, line)) = lines.next() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        let line = number + 1;
        pairs.push((unescape(key, line)?, unescape(value, line)?));
    }
    Ok(pairs)
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Raw key and value text, escapes still in place.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            key_end = i;
            break;
        }
    }

    let key = &line[..key_end];
    let rest = line[key_end..].trim_start();
    let rest = match rest.strip_prefix(&['=', ':'][..]) {
        Some(value) => value.trim_start(),
        None => rest,
    };
    (key, rest)
}

fn unescape(raw: &str, line: usize) -> Result<String, CfgweaveError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| CfgweaveError::Properties {
                        line,
                        reason: format!("malformed \\u escape: \\u{}", hex),
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MapConfigSource, StringConfigSource};

    fn pairs(text: &str) -> Vec<(String, String)> {
        parse_properties(text).unwrap()
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_separators_and_comments() {
        let parsed = pairs(
            "# database\n\
             ! legacy comment\n\
             \n\
             db.port=5432\n\
             db.host : db.example.com\n\
             db.name   app\n\
             db.empty\n",
        );
        assert_eq!(
            parsed,
            vec![
                pair("db.port", "5432"),
                pair("db.host", "db.example.com"),
                pair("db.name", "app"),
                pair("db.empty", ""),
            ]
        );
    }

    #[test]
    fn test_continuation_lines() {
        let parsed = pairs("db.replicas = r1.example.com, \\\n    r2.example.com\nnext=1\n");
        assert_eq!(
            parsed,
            vec![pair("db.replicas", "r1.example.com, r2.example.com"), pair("next", "1")]
        );

        // an escaped backslash does not continue
        let parsed = pairs("path=c:\\\\\nnext=1\n");
        assert_eq!(parsed, vec![pair("path", "c:\\"), pair("next", "1")]);
    }

    #[test]
    fn test_escapes() {
        let parsed = pairs("a\\=b\\:c=tab\\there\nunicode=caf\\u00e9\nurl=http\\://x\n");
        assert_eq!(
            parsed,
            vec![
                pair("a=b:c", "tab\there"),
                pair("unicode", "café"),
                pair("url", "http://x"),
            ]
        );
    }

    #[test]
    fn test_bad_unicode_escape() {
        let err = parse_properties("ok=1\nbad=\\u12\n").unwrap_err();
        assert!(matches!(err, CfgweaveError::Properties { line: 2, .. }));
    }

    #[test]
    fn test_load_source_compiles_paths() {
        let loader = PropertiesConfigLoader::new(Arc::new(PathLexer::default()));
        let source = StringConfigSource::new(
            "db.hosts[0].url=jdbc:a\ndb.hosts[1].url=jdbc:b\ndb.port=1\ndb.port=2\n",
            "properties",
        );
        let containers = loader.load_source(&source).unwrap().into_value().unwrap();
        let db = containers[0].node.get_key("db").unwrap();
        assert_eq!(db.get_key("port").unwrap().value(), Some("2"));
        assert_eq!(
            db.get_key("hosts").unwrap().get_index(1).unwrap().get_key("url").unwrap().value(),
            Some("jdbc:b")
        );
    }

    #[test]
    fn test_rejects_list_source() {
        let loader = PropertiesConfigLoader::new(Arc::new(PathLexer::default()));
        assert!(loader.accepts("props"));
        assert!(matches!(
            loader.load_source(&MapConfigSource::new([("a", "1")])),
            Err(CfgweaveError::SourceUnavailable(_))
        ));
    }
}
