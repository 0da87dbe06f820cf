//! Loaders for TOML and JSON documents.

use super::ConfigLoader;
use crate::error::CfgweaveError;
use crate::source::ConfigSource;
use cfgweave_lexer::PathLexer;
use cfgweave_model::{ConfigNode, ConfigNodeContainer, GResult};
use std::sync::Arc;

fn stream_text(source: &dyn ConfigSource) -> Result<String, CfgweaveError> {
    if !source.has_stream() {
        return Err(CfgweaveError::SourceUnavailable(source.name()));
    }
    source.load_stream()
}

fn single(node: ConfigNode, source: &dyn ConfigSource) -> GResult<Vec<ConfigNodeContainer>> {
    GResult::ok(vec![ConfigNodeContainer::new(
        node,
        source.id().clone(),
        source.tags().clone(),
    )])
}

/// Parses TOML documents.
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    lexer: Arc<PathLexer>,
}

impl TomlConfigLoader {
    pub fn new(lexer: Arc<PathLexer>) -> Self {
        Self { lexer }
    }

    /// Convert a TOML value into a node; scalars become leaf strings.
    fn to_node(&self, value: toml::Value) -> ConfigNode {
        match value {
            toml::Value::String(s) => ConfigNode::leaf(s),
            toml::Value::Integer(i) => ConfigNode::leaf(i.to_string()),
            toml::Value::Float(f) => ConfigNode::leaf(f.to_string()),
            toml::Value::Boolean(b) => ConfigNode::leaf(b.to_string()),
            toml::Value::Datetime(dt) => ConfigNode::leaf(dt.to_string()),
            toml::Value::Array(items) => {
                ConfigNode::array(items.into_iter().map(|v| self.to_node(v)))
            }
            toml::Value::Table(table) => ConfigNode::Map(
                table
                    .into_iter()
                    .map(|(k, v)| (self.lexer.normalize_sentence(&k), self.to_node(v)))
                    .collect(),
            ),
        }
    }
}

impl ConfigLoader for TomlConfigLoader {
    fn name(&self) -> &str {
        "toml"
    }

    fn accepts(&self, format: &str) -> bool {
        format == "toml"
    }

    fn load_source(
        &self,
        source: &dyn ConfigSource,
    ) -> Result<GResult<Vec<ConfigNodeContainer>>, CfgweaveError> {
        let text = stream_text(source)?;
        let table: toml::Table = toml::from_str(&text)?;
        Ok(single(self.to_node(toml::Value::Table(table)), source))
    }
}

/// Parses JSON documents.
#[derive(Debug, Clone)]
pub struct JsonConfigLoader {
    lexer: Arc<PathLexer>,
}

impl JsonConfigLoader {
    pub fn new(lexer: Arc<PathLexer>) -> Self {
        Self { lexer }
    }

    /// Convert a JSON value into a node; `null` becomes a leaf without a value.
    fn to_node(&self, value: serde_json::Value) -> ConfigNode {
        use serde_json::Value;
        match value {
            Value::Null => ConfigNode::empty_leaf(),
            Value::Bool(b) => ConfigNode::leaf(b.to_string()),
            Value::Number(n) => ConfigNode::leaf(n.to_string()),
            Value::String(s) => ConfigNode::leaf(s),
            Value::Array(items) => ConfigNode::array(items.into_iter().map(|v| self.to_node(v))),
            Value::Object(map) => ConfigNode::Map(
                map.into_iter()
                    .map(|(k, v)| (self.lexer.normalize_sentence(&k), self.to_node(v)))
                    .collect(),
            ),
        }
    }
}

impl ConfigLoader for JsonConfigLoader {
    fn name(&self) -> &str {
        "json"
    }

    fn accepts(&self, format: &str) -> bool {
        format == "json"
    }

    fn load_source(
        &self,
        source: &dyn ConfigSource,
    ) -> Result<GResult<Vec<ConfigNodeContainer>>, CfgweaveError> {
        let text = stream_text(source)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        Ok(single(self.to_node(value), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StringConfigSource;

    fn lexer() -> Arc<PathLexer> {
        Arc::new(PathLexer::default())
    }

    #[test]
    fn test_toml_document() {
        let source = StringConfigSource::new(
            r#"
            name = "app"
            [DB]
            Port = 5432
            ratio = 0.5
            enabled = true
            hosts = ["a", "b"]
            "#,
            "toml",
        );
        let containers = TomlConfigLoader::new(lexer())
            .load_source(&source)
            .unwrap()
            .into_value()
            .unwrap();
        let root = &containers[0].node;
        let db = root.get_key("db").unwrap();
        assert_eq!(db.get_key("port").unwrap().value(), Some("5432"));
        assert_eq!(db.get_key("ratio").unwrap().value(), Some("0.5"));
        assert_eq!(db.get_key("enabled").unwrap().value(), Some("true"));
        assert_eq!(db.get_key("hosts").unwrap().get_index(1).unwrap().value(), Some("b"));
        assert_eq!(root.get_key("name").unwrap().value(), Some("app"));
    }

    #[test]
    fn test_toml_parse_error() {
        let source = StringConfigSource::new("name = ", "toml");
        let err = TomlConfigLoader::new(lexer()).load_source(&source).unwrap_err();
        assert!(matches!(err, CfgweaveError::Toml(_)));
    }

    #[test]
    fn test_json_document() {
        let source = StringConfigSource::new(
            r#"{"db": {"hosts": [{"password": "1234"}, {"password": "5678"}], "user": null}}"#,
            "json",
        );
        let containers = JsonConfigLoader::new(lexer())
            .load_source(&source)
            .unwrap()
            .into_value()
            .unwrap();
        let db = containers[0].node.get_key("db").unwrap();
        let second = db.get_key("hosts").unwrap().get_index(1).unwrap();
        assert_eq!(second.get_key("password").unwrap().value(), Some("5678"));
        assert_eq!(db.get_key("user").unwrap().value(), None);
    }

    #[test]
    fn test_json_parse_error() {
        let source = StringConfigSource::new("{", "json");
        let err = JsonConfigLoader::new(lexer()).load_source(&source).unwrap_err();
        assert!(matches!(err, CfgweaveError::Json(_)));
    }
}
