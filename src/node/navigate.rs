//! Walking token sequences through a node tree.

use crate::mapper::PathMapper;
use cfgweave_lexer::PathLexer;
use cfgweave_model::{ConfigNode, GResult, Token, ValidationError};
use std::cmp::Reverse;
use std::sync::Arc;

/// Resolves tokens against a tree, trying field names through path mappers.
#[derive(Clone)]
pub struct Navigator {
    lexer: Arc<PathLexer>,
    mappers: Vec<Arc<dyn PathMapper>>,
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mappers: Vec<&str> = self.mappers.iter().map(|m| m.name()).collect();
        f.debug_struct("Navigator")
            .field("lexer", &self.lexer)
            .field("mappers", &mappers)
            .finish()
    }
}

impl Navigator {
    /// Mappers are tried highest priority first.
    pub fn new(lexer: Arc<PathLexer>, mut mappers: Vec<Arc<dyn PathMapper>>) -> Self {
        mappers.sort_by_key(|m| Reverse(m.priority()));
        Self { lexer, mappers }
    }

    pub fn lexer(&self) -> &PathLexer {
        &self.lexer
    }

    /// Follow `tokens` from `root`.
    ///
    /// Misses report `NoResultsFoundForNode`; the caller decides whether the
    /// miss is fatal.
    pub fn navigate<'a>(
        &self,
        path: &str,
        tokens: &[Token],
        root: &'a ConfigNode,
    ) -> GResult<&'a ConfigNode> {
        let mut current = root;
        for token in tokens {
            match self.next_node(path, token, current).into_value() {
                Some(next) => current = next,
                None => return GResult::fail_one(miss(path, &token.to_string())),
            }
        }
        GResult::ok(current)
    }

    /// Follow a single token.
    pub fn next_node<'a>(
        &self,
        path: &str,
        token: &Token,
        node: &'a ConfigNode,
    ) -> GResult<&'a ConfigNode> {
        match token {
            Token::Field(name) => self.next_field(path, name, node),
            Token::Index(index) => match node.get_index(*index) {
                Some(child) => GResult::ok(child),
                None => GResult::fail_one(miss(path, &token.to_string())),
            },
        }
    }

    /// Look up a field name in `node`, trying each path mapper in turn.
    ///
    /// A mapper may expand the name into several tokens, e.g. a name
    /// containing the delimiter.
    pub fn next_field<'a>(
        &self,
        path: &str,
        name: &str,
        node: &'a ConfigNode,
    ) -> GResult<&'a ConfigNode> {
        if let Some(child) = node.get_key(name) {
            return GResult::ok(child);
        }

        for mapper in &self.mappers {
            let Some(tokens) = mapper.map(path, name, &self.lexer).into_value() else {
                continue;
            };
            if let Some(found) = walk(&tokens, node) {
                return GResult::ok(found);
            }
        }

        GResult::fail_one(miss(path, name))
    }
}

/// Plain token walk, no mapping.
fn walk<'a>(tokens: &[Token], node: &'a ConfigNode) -> Option<&'a ConfigNode> {
    tokens.iter().try_fold(node, |current, token| current.get(token))
}

fn miss(path: &str, token: &str) -> ValidationError {
    ValidationError::NoResultsFoundForNode {
        path: path.to_string(),
        token: token.to_string(),
        stage: "navigating to node".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{KebabCasePathMapper, SnakeCasePathMapper, StandardPathMapper};

    fn navigator() -> Navigator {
        Navigator::new(
            Arc::new(PathLexer::default()),
            vec![
                Arc::new(KebabCasePathMapper),
                Arc::new(StandardPathMapper),
                Arc::new(SnakeCasePathMapper),
            ],
        )
    }

    fn tree() -> ConfigNode {
        ConfigNode::map([(
            "db",
            ConfigNode::map([
                (
                    "hosts",
                    ConfigNode::array([
                        ConfigNode::map([("password", ConfigNode::leaf("1234"))]),
                        ConfigNode::map([("password", ConfigNode::leaf("5678"))]),
                    ]),
                ),
                ("max_connections", ConfigNode::leaf("10")),
                ("idle-timeout", ConfigNode::leaf("30")),
                ("sparse", ConfigNode::Array(vec![None, Some(ConfigNode::leaf("x"))])),
            ]),
        )])
    }

    #[test]
    fn test_navigate_indexed_path() {
        let nav = navigator();
        let root = tree();
        let path = "db.hosts[1].password";
        let tokens = nav.lexer().scan(path).into_value().unwrap();
        let node = nav.navigate(path, &tokens, &root).into_value().unwrap();
        assert_eq!(node.value(), Some("5678"));
    }

    #[test]
    fn test_mappers_in_priority_order() {
        let nav = navigator();
        let names: Vec<&str> = nav.mappers.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["standard", "snakeCase", "kebabCase"]);
    }

    #[test]
    fn test_field_through_mappers() {
        let nav = navigator();
        let root = tree();
        let db = root.get_key("db").unwrap();
        assert_eq!(
            nav.next_field("db", "maxConnections", db).into_value().unwrap().value(),
            Some("10")
        );
        assert_eq!(
            nav.next_field("db", "idle_timeout", db).into_value().unwrap().value(),
            Some("30")
        );
    }

    #[test]
    fn test_missing_field() {
        let nav = navigator();
        let root = tree();
        let tokens = vec![Token::field("db"), Token::field("user")];
        let result = nav.navigate("db.user", &tokens, &root);
        assert!(!result.has_results());
        assert!(matches!(
            &result.errors()[0],
            ValidationError::NoResultsFoundForNode { token, .. } if token == "user"
        ));
    }

    #[test]
    fn test_index_out_of_range_and_gap() {
        let nav = navigator();
        let root = tree();
        for path in ["db.hosts[5]", "db.sparse[0]"] {
            let tokens = nav.lexer().scan(path).into_value().unwrap();
            let result = nav.navigate(path, &tokens, &root);
            assert!(!result.has_results(), "{} should miss", path);
        }
    }

    #[test]
    fn test_token_on_leaf_misses() {
        let nav = navigator();
        let root = tree();
        let tokens = vec![Token::field("db"), Token::field("max_connections"), Token::field("x")];
        assert!(!nav.navigate("p", &tokens, &root).has_results());
    }
}
