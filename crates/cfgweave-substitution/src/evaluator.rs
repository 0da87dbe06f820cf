//! Evaluation of substitution trees against named transformers.

use crate::builder::SubstitutionTreeBuilder;
use crate::node::SubstitutionNode;
use cfgweave_model::{GResult, ValidationError};
use regex_lite::Regex;
use std::cmp::Reverse;
use std::sync::Arc;

/// Default expression pattern: `[transform:]key[:default]`.
///
/// The transform name is a run of word characters; the key runs up to the
/// next `:`; everything after that is the default and may contain `:`.
/// When the first part of a two-part expression is not a registered
/// transform, the expression is read as `key:default` instead.
pub const DEFAULT_SUBSTITUTION_REGEX: &str =
    r"^(?:(?P<transform>\w+):)?(?P<key>[^:]+)(?::(?P<default>.*))?$";

/// A named lookup used inside `${...}` expressions.
pub trait Transformer: Send + Sync {
    /// Name used to select this transformer, e.g. `env`.
    fn name(&self) -> &str;

    /// Order in which transformers are tried when an expression names none,
    /// highest first. Transformers at 0 or below are only reachable by name.
    fn priority(&self) -> i32 {
        0
    }

    /// Look up `key`.
    ///
    /// `raw_value` is the whole expression between the tokens, after inner
    /// substitutions were resolved.
    fn process(&self, path: &str, key: &str, raw_value: &str) -> GResult<String>;
}

/// Resolves `${...}` expressions in leaf values.
pub struct SubstitutionEvaluator {
    builder: SubstitutionTreeBuilder,
    pattern: Regex,
    transformers: Vec<Arc<dyn Transformer>>,
}

impl std::fmt::Debug for SubstitutionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubstitutionEvaluator")
            .field("builder", &self.builder)
            .field("pattern", &self.pattern.as_str())
            .field("transformers", &self.transformer_names())
            .finish()
    }
}

impl SubstitutionEvaluator {
    /// Build an evaluator.
    ///
    /// `pattern` must define a `key` group and may define `transform` and
    /// `default` groups.
    pub fn new(
        builder: SubstitutionTreeBuilder,
        pattern: &str,
        mut transformers: Vec<Arc<dyn Transformer>>,
    ) -> Result<Self, regex_lite::Error> {
        let pattern = Regex::new(pattern)?;
        transformers.sort_by_key(|t| Reverse(t.priority()));
        Ok(Self {
            builder,
            pattern,
            transformers,
        })
    }

    pub fn builder(&self) -> &SubstitutionTreeBuilder {
        &self.builder
    }

    /// Transformer names, highest priority first.
    pub fn transformer_names(&self) -> Vec<&str> {
        self.transformers.iter().map(|t| t.name()).collect()
    }

    /// Resolve every substitution in `value`.
    ///
    /// Values without the opening token are returned unchanged.
    pub fn resolve(&self, path: &str, value: &str) -> GResult<String> {
        self.resolve_at_depth(path, value, 0)
    }

    /// Evaluate a tree produced by [`SubstitutionTreeBuilder::build`].
    pub fn evaluate(&self, path: &str, nodes: &[SubstitutionNode]) -> GResult<String> {
        self.evaluate_at_depth(path, nodes, 0)
    }

    fn resolve_at_depth(&self, path: &str, value: &str, depth: usize) -> GResult<String> {
        if !self.builder.may_contain_substitution(value) {
            return GResult::ok(value.to_string());
        }
        self.builder
            .build_at_depth(path, value, depth)
            .and_then(|nodes| self.evaluate_at_depth(path, &nodes, depth))
    }

    fn evaluate_at_depth(
        &self,
        path: &str,
        nodes: &[SubstitutionNode],
        depth: usize,
    ) -> GResult<String> {
        let mut out = String::new();
        let mut errors = Vec::new();
        let mut failed = false;

        for node in nodes {
            match node {
                SubstitutionNode::Text(text) => out.push_str(text),
                SubstitutionNode::Transform(children) => {
                    // Inner regions are resolved first; their output forms this expression.
                    let expression = self
                        .evaluate_at_depth(path, children, depth)
                        .drain_into(&mut errors);
                    let resolved = expression
                        .and_then(|expr| self.apply(path, &expr, depth).drain_into(&mut errors));
                    match resolved {
                        Some(value) => out.push_str(&value),
                        None => failed = true,
                    }
                }
            }
        }

        if failed {
            GResult::fail(errors)
        } else {
            GResult::with_errors(out, errors)
        }
    }

    fn apply(&self, path: &str, expression: &str, depth: usize) -> GResult<String> {
        let invalid = || {
            GResult::fail_one(ValidationError::InvalidStringSubstitution {
                path: path.to_string(),
                value: expression.to_string(),
            })
        };

        let Some(captures) = self.pattern.captures(expression) else {
            return invalid();
        };
        let mut key = match captures.name("key") {
            Some(m) if !m.as_str().is_empty() => m.as_str(),
            _ => return invalid(),
        };
        let mut default = captures.name("default").map(|m| m.as_str());

        let looked_up = match captures.name("transform") {
            Some(name) => match self.transformers.iter().find(|t| t.name() == name.as_str()) {
                Some(transformer) => transformer.process(path, key, expression),
                // `${HOST:localhost}`: an unregistered name with no third part
                // is an unnamed key with a default
                None if default.is_none() => {
                    tracing::trace!(path, name = name.as_str(), "not a transform, using as key");
                    default = Some(key);
                    key = name.as_str();
                    self.first_match(path, key, expression)
                }
                None => {
                    return GResult::fail_one(ValidationError::UnknownTransform {
                        path: path.to_string(),
                        transform: name.as_str().to_string(),
                    })
                }
            },
            None => self.first_match(path, key, expression),
        };

        let value = match (looked_up.has_results(), default) {
            (true, _) | (false, None) => looked_up,
            (false, Some(default)) => {
                tracing::debug!(path, key, "substitution missed, using default");
                GResult::ok(default.to_string())
            }
        };

        value.and_then(|value| {
            if self.builder.may_contain_substitution(&value) {
                self.resolve_at_depth(path, &value, depth + 1)
            } else {
                GResult::ok(value)
            }
        })
    }

    fn first_match(&self, path: &str, key: &str, expression: &str) -> GResult<String> {
        for transformer in self.transformers.iter().filter(|t| t.priority() > 0) {
            let result = transformer.process(path, key, expression);
            if result.has_results() {
                return result;
            }
        }
        GResult::fail_one(ValidationError::NoMatchingTransformFound {
            path: path.to_string(),
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DEFAULT_CLOSING_TOKEN;
    use crate::builder::DEFAULT_OPENING_TOKEN;
    use std::collections::HashMap;

    struct MapTransformer {
        name: &'static str,
        priority: i32,
        values: HashMap<&'static str, &'static str>,
    }

    impl Transformer for MapTransformer {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn process(&self, path: &str, key: &str, _raw_value: &str) -> GResult<String> {
            match self.values.get(key) {
                Some(v) => GResult::ok(v.to_string()),
                None => GResult::fail_one(ValidationError::NoCustomMapValueFound {
                    path: path.to_string(),
                    key: key.to_string(),
                }),
            }
        }
    }

    fn transformer(
        name: &'static str,
        priority: i32,
        values: &[(&'static str, &'static str)],
    ) -> Arc<dyn Transformer> {
        Arc::new(MapTransformer {
            name,
            priority,
            values: values.iter().copied().collect(),
        })
    }

    fn evaluator(transformers: Vec<Arc<dyn Transformer>>) -> SubstitutionEvaluator {
        SubstitutionEvaluator::new(
            SubstitutionTreeBuilder::new(DEFAULT_OPENING_TOKEN, DEFAULT_CLOSING_TOKEN, 5),
            DEFAULT_SUBSTITUTION_REGEX,
            transformers,
        )
        .unwrap()
    }

    #[test]
    fn test_plain_value_untouched() {
        let eval = evaluator(vec![]);
        assert_eq!(eval.resolve("p", "a{2}").into_value().unwrap(), "a{2}");
    }

    #[test]
    fn test_named_transform() {
        let eval = evaluator(vec![transformer("env", 100, &[("HOST", "test")])]);
        let result = eval.resolve("db.uri", "https://dev.${env:HOST}");
        assert_eq!(result.into_value().unwrap(), "https://dev.test");
    }

    #[test]
    fn test_default_used_on_miss() {
        let eval = evaluator(vec![transformer("env", 100, &[])]);
        let result = eval.resolve("db.uri", "https://dev.${env:HOST:localhost}");
        assert!(!result.has_errors());
        assert_eq!(result.into_value().unwrap(), "https://dev.localhost");
    }

    #[test]
    fn test_default_may_contain_colons() {
        let eval = evaluator(vec![transformer("env", 100, &[])]);
        let result = eval.resolve("p", "${env:URL:http://localhost:80}");
        assert_eq!(result.into_value().unwrap(), "http://localhost:80");
    }

    #[test]
    fn test_miss_without_default_fails() {
        let eval = evaluator(vec![transformer("env", 100, &[])]);
        let result = eval.resolve("db.uri", "https://dev.${env:HOST}");
        assert!(!result.has_results());
        assert!(matches!(
            result.errors()[0],
            ValidationError::NoCustomMapValueFound { .. }
        ));
    }

    #[test]
    fn test_unknown_transform() {
        let eval = evaluator(vec![transformer("env", 100, &[])]);
        let result = eval.resolve("p", "${vault:secret:fallback}");
        assert!(!result.has_results());
        assert!(matches!(
            &result.errors()[0],
            ValidationError::UnknownTransform { transform, .. } if transform == "vault"
        ));
    }

    #[test]
    fn test_unregistered_name_is_key_with_default() {
        let eval = evaluator(vec![transformer("env", 100, &[("PORT", "5432")])]);

        let result = eval.resolve("db.host", "${HOST:localhost}");
        assert!(!result.has_errors());
        assert_eq!(result.into_value().unwrap(), "localhost");

        let result = eval.resolve("db.port", "${PORT:3306}");
        assert_eq!(result.into_value().unwrap(), "5432");
    }

    #[test]
    fn test_unnamed_tries_by_priority() {
        let eval = evaluator(vec![
            transformer("low", 10, &[("name", "low"), ("only_low", "x")]),
            transformer("high", 50, &[("name", "high")]),
        ]);
        assert_eq!(eval.transformer_names(), vec!["high", "low"]);
        assert_eq!(eval.resolve("p", "${name}").into_value().unwrap(), "high");
        assert_eq!(eval.resolve("p", "${only_low}").into_value().unwrap(), "x");

        let miss = eval.resolve("p", "${nothing}");
        assert!(matches!(
            miss.errors()[0],
            ValidationError::NoMatchingTransformFound { .. }
        ));
    }

    #[test]
    fn test_nested_resolves_inner_first() {
        let eval = evaluator(vec![
            transformer("map", 0, &[("which", "HOST")]),
            transformer("env", 100, &[("HOST", "db.internal")]),
        ]);
        let result = eval.resolve("p", "jdbc://${env:${map:which}}/app");
        assert_eq!(result.into_value().unwrap(), "jdbc://db.internal/app");
    }

    #[test]
    fn test_result_is_expanded_again() {
        let eval = evaluator(vec![transformer(
            "map",
            0,
            &[("outer", "${map:inner}!"), ("inner", "value")],
        )]);
        assert_eq!(eval.resolve("p", "${map:outer}").into_value().unwrap(), "value!");
    }

    #[test]
    fn test_self_reference_stops_at_depth() {
        let eval = evaluator(vec![transformer("map", 0, &[("loop", "${map:loop}")])]);
        let result = eval.resolve("p", "${map:loop}");
        assert!(!result.has_results());
        assert!(result
            .errors()
            .iter()
            .any(|e| matches!(e, ValidationError::SubstitutionDepthExceeded { .. })));
    }

    #[test]
    fn test_escaped_is_literal() {
        let eval = evaluator(vec![]);
        let result = eval.resolve("p", r"price: \${amount}");
        assert_eq!(result.into_value().unwrap(), "price: ${amount}");
    }

    #[test]
    fn test_build_error_surfaces() {
        let eval = evaluator(vec![]);
        let result = eval.resolve("p", "${env:HOST");
        assert!(matches!(
            result.errors()[0],
            ValidationError::UnclosedSubstitutionTransform { .. }
        ));
    }

    #[test]
    fn test_empty_expression_is_invalid() {
        let eval = evaluator(vec![transformer("env", 100, &[])]);
        let result = eval.resolve("p", "${}");
        assert!(matches!(
            result.errors()[0],
            ValidationError::InvalidStringSubstitution { .. }
        ));
    }
}
