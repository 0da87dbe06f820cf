//! The configuration engine.
//!
//! [`Cfgweave`] owns the loaded snapshot and answers typed lookups. A lookup
//! runs in stages, each adding to one list of validation errors:
//!
//! 1. resolve the tag-set (request tags merged with the default tags)
//! 2. tokenize the path and walk it from the tag-set's root
//! 3. resolve `${...}` substitutions in every leaf of the found subtree
//! 4. decode the subtree into the requested type
//!
//! Results are cached per path, type and tag-set until the next reload.
//! Whether the collected errors fail the lookup is decided once, at the
//! public boundary, by the [`ErrorPolicy`].

mod builder;

pub use builder::CfgweaveBuilder;

use crate::cache::{CacheKey, Computed, ConfigCache};
use crate::config::{log_at, CoreConfig, ErrorPolicy};
use crate::decoder::{ConfigType, DecoderContext, DecoderRegistry, DecoderSettings, TypeDescriptor, Value};
use crate::error::CfgweaveError;
use crate::loader::LoaderRegistry;
use crate::node::{debug_print, ConfigNodeManager, Navigator, NodeSnapshot};
use crate::processor::{apply_processors, ConfigNodeProcessor};
use crate::reload::{CoreReloadListener, ListenerId, ReloadListenersContainer};
use crate::source::ConfigSource;
use crate::tags::TagMergingStrategy;
use cfgweave_lexer::PathLexer;
use cfgweave_model::{
    ConfigNode, ConfigNodeContainer, GResult, Level, Tags, Token, ValidationError,
};
use cfgweave_substitution::SubstitutionEvaluator;
use std::sync::Arc;

/// Typed configuration lookups over merged sources.
pub struct Cfgweave {
    config: CoreConfig,
    policy: ErrorPolicy,
    lexer: Arc<PathLexer>,
    sources: Vec<Arc<dyn ConfigSource>>,
    loaders: LoaderRegistry,
    processors: Vec<Arc<dyn ConfigNodeProcessor>>,
    navigator: Navigator,
    decoders: DecoderRegistry,
    decoder_settings: DecoderSettings,
    evaluator: SubstitutionEvaluator,
    tag_strategy: Arc<dyn TagMergingStrategy>,
    default_tags: Tags,
    manager: ConfigNodeManager,
    cache: Option<Arc<ConfigCache>>,
    listeners: ReloadListenersContainer,
}

impl std::fmt::Debug for Cfgweave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Vec<String> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("Cfgweave")
            .field("sources", &sources)
            .field("loaders", &self.loaders)
            .field("decoders", &self.decoders)
            .field("evaluator", &self.evaluator)
            .field("tag_strategy", &self.tag_strategy)
            .field("default_tags", &self.default_tags)
            .field("cache_enabled", &self.cache.is_some())
            .finish()
    }
}

impl Cfgweave {
    pub fn builder() -> CfgweaveBuilder {
        CfgweaveBuilder::new()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn default_tags(&self) -> &Tags {
        &self.default_tags
    }

    pub fn is_loaded(&self) -> bool {
        self.manager.is_loaded()
    }

    /// Load every source and install the merged trees.
    ///
    /// Fails when loading produced an error the policy treats as fatal;
    /// other errors are logged.
    pub fn load_configs(&self) -> Result<(), CfgweaveError> {
        let snapshot = self.load_snapshot()?;
        self.manager.install(snapshot);
        tracing::info!(sources = self.sources.len(), "configuration loaded");
        Ok(())
    }

    /// Reload every source, then notify reload listeners.
    ///
    /// The cache is a listener, so lookups after this see the new values.
    /// On failure the previous configuration stays active.
    pub fn reload(&self) -> Result<(), CfgweaveError> {
        let snapshot = self.load_snapshot()?;
        self.manager.install(snapshot);
        tracing::info!(sources = self.sources.len(), "configuration reloaded");
        self.listeners.notify();
        Ok(())
    }

    pub fn register_reload_listener(&self, listener: Arc<dyn CoreReloadListener>) -> ListenerId {
        self.listeners.register(listener)
    }

    pub fn remove_reload_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Value at `path` under the default tags.
    pub fn get_config<T: ConfigType>(&self, path: &str) -> Result<T, CfgweaveError> {
        self.get_config_with_tags(path, &Tags::new())
    }

    /// Value at `path` under `tags`.
    ///
    /// Fails with [`CfgweaveError::Validation`] listing every collected
    /// error when any is fatal under the policy.
    pub fn get_config_with_tags<T: ConfigType>(
        &self,
        path: &str,
        tags: &Tags,
    ) -> Result<T, CfgweaveError> {
        let (value, mut errors) = self.lookup(path, &T::type_descriptor(), tags)?.into_parts();
        let fatal = self.policy.has_fatal(&errors);
        match value {
            Some(value) if !fatal => match T::from_value(value) {
                Some(converted) => {
                    log_non_fatal(path, &errors);
                    Ok(converted)
                }
                None => {
                    errors.push(conversion_failed::<T>(path));
                    Err(CfgweaveError::Validation {
                        path: path.to_string(),
                        errors,
                    })
                }
            },
            _ => Err(CfgweaveError::Validation {
                path: path.to_string(),
                errors,
            }),
        }
    }

    /// Value at `path`, or `default` when the lookup fails.
    pub fn get_config_or<T: ConfigType>(&self, path: &str, default: T) -> T {
        self.get_config_or_with_tags(path, default, &Tags::new())
    }

    pub fn get_config_or_with_tags<T: ConfigType>(&self, path: &str, default: T, tags: &Tags) -> T {
        match self.get_config_with_tags(path, tags) {
            Ok(value) => value,
            Err(err) => {
                log_at(
                    self.config.missing_value_log_level,
                    path,
                    &format!("using default value: {}", err),
                );
                default
            }
        }
    }

    /// Value at `path`, or `None` when the lookup fails.
    pub fn get_config_optional<T: ConfigType>(&self, path: &str) -> Option<T> {
        self.get_config_optional_with_tags(path, &Tags::new())
    }

    pub fn get_config_optional_with_tags<T: ConfigType>(&self, path: &str, tags: &Tags) -> Option<T> {
        match self.get_config_with_tags(path, tags) {
            Ok(value) => Some(value),
            Err(err) => {
                log_at(
                    self.config.missing_value_log_level,
                    path,
                    &format!("no value: {}", err),
                );
                None
            }
        }
    }

    /// The raw result: whatever value could be decoded plus every error,
    /// without applying the error policy.
    pub fn get_config_result<T: ConfigType>(
        &self,
        path: &str,
        tags: &Tags,
    ) -> Result<GResult<T>, CfgweaveError> {
        let (value, mut errors) = self.lookup(path, &T::type_descriptor(), tags)?.into_parts();
        let converted = match value {
            Some(value) => {
                let converted = T::from_value(value);
                if converted.is_none() {
                    errors.push(conversion_failed::<T>(path));
                }
                converted
            }
            None => None,
        };
        Ok(GResult::from_parts(converted, errors))
    }

    /// One `path = value` line per leaf of the tree for `tags`, secrets masked.
    pub fn debug_print(&self, tags: &Tags) -> Result<String, CfgweaveError> {
        let snapshot = self.loaded_snapshot()?;
        let tags = self.tag_strategy.merge_tags(tags, &self.default_tags);
        let root = snapshot.root(&tags).ok_or(CfgweaveError::NotLoaded)?;
        Ok(debug_print(&self.lexer, &root))
    }

    fn loaded_snapshot(&self) -> Result<Arc<NodeSnapshot>, CfgweaveError> {
        let snapshot = self.manager.snapshot();
        if snapshot.is_empty() {
            return Err(CfgweaveError::NotLoaded);
        }
        Ok(snapshot)
    }

    fn load_snapshot(&self) -> Result<NodeSnapshot, CfgweaveError> {
        let mut errors = Vec::new();
        let mut containers = Vec::new();

        for source in &self.sources {
            let Some(loaded) = self.loaders.load(source.as_ref())?.drain_into(&mut errors) else {
                continue;
            };
            for ConfigNodeContainer { node, source_id, tags } in loaded {
                if let Some(node) =
                    apply_processors(&self.processors, "", node).drain_into(&mut errors)
                {
                    containers.push(ConfigNodeContainer::new(node, source_id, tags));
                }
            }
        }

        let snapshot = NodeSnapshot::build(&containers).drain_into(&mut errors);
        if self.policy.has_fatal(&errors) {
            return Err(CfgweaveError::Load { errors });
        }
        log_non_fatal("", &errors);
        snapshot.ok_or(CfgweaveError::Load { errors })
    }

    fn lookup(
        &self,
        path: &str,
        ty: &TypeDescriptor,
        tags: &Tags,
    ) -> Result<GResult<Value>, CfgweaveError> {
        self.loaded_snapshot()?;
        let tags = self.tag_strategy.merge_tags(tags, &self.default_tags);
        // snapshot read after the cache generation is captured
        let compute = || self.compute(&self.manager.snapshot(), path, ty, &tags);
        let result = match &self.cache {
            Some(cache) => {
                cache.get_or_compute(CacheKey::new(path, ty.clone(), tags.clone()), compute)
            }
            None => compute().result,
        };
        Ok(result)
    }

    fn compute(
        &self,
        snapshot: &NodeSnapshot,
        path: &str,
        ty: &TypeDescriptor,
        tags: &Tags,
    ) -> Computed {
        let mut errors = Vec::new();
        let Some(tokens) = self.lexer.scan(path).drain_into(&mut errors) else {
            return Computed {
                result: GResult::fail(errors),
                cacheable: true,
            };
        };
        let Some(root) = snapshot.root(tags) else {
            return Computed {
                result: GResult::fail_one(ValidationError::NoResultsFoundForNode {
                    path: path.to_string(),
                    token: tags.to_string(),
                    stage: "resolving tags".to_string(),
                }),
                cacheable: true,
            };
        };

        let navigated = self.navigator.navigate(path, &tokens, &root);
        let Some(node) = navigated.value().copied() else {
            let result = if ty.is_optional() {
                GResult::with_errors(
                    Value::Null,
                    vec![ValidationError::OptionalMissingValueDecoding {
                        path: path.to_string(),
                        field: last_field(&tokens),
                        type_name: ty.to_string(),
                    }],
                )
            } else {
                navigated.map(|_| Value::Null)
            };
            return Computed {
                result,
                cacheable: true,
            };
        };

        let cacheable = node.is_cacheable();
        let substituted = substitute(&self.evaluator, &self.lexer, path, node)
            .drain_into(&mut errors)
            .unwrap_or_else(|| node.clone());

        let ctx = DecoderContext::new(&self.decoders, &self.navigator, &self.decoder_settings);
        let (value, decode_errors) = self
            .decoders
            .decode_node(path, tags, Some(&substituted), ty, &ctx)
            .into_parts();
        errors.extend(decode_errors);

        Computed {
            result: GResult::from_parts(value, errors),
            cacheable,
        }
    }
}

/// Resolve substitutions in every leaf under `node`.
///
/// A leaf whose substitution fails keeps its raw text; the errors travel
/// with the result.
fn substitute(
    evaluator: &SubstitutionEvaluator,
    lexer: &PathLexer,
    path: &str,
    node: &ConfigNode,
) -> GResult<ConfigNode> {
    let mut errors = Vec::new();
    let substituted = match node {
        ConfigNode::Leaf(leaf) => {
            let mut leaf = leaf.clone();
            if let Some(raw) = &leaf.value {
                if let Some(resolved) = evaluator.resolve(path, raw).drain_into(&mut errors) {
                    leaf.value = Some(resolved);
                }
            }
            ConfigNode::Leaf(leaf)
        }
        ConfigNode::Array(items) => ConfigNode::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_ref().map(|child| {
                        let child_path = format!("{}[{}]", path, i);
                        substitute(evaluator, lexer, &child_path, child)
                            .drain_into(&mut errors)
                            .unwrap_or_else(|| child.clone())
                    })
                })
                .collect(),
        ),
        ConfigNode::Map(entries) => ConfigNode::Map(
            entries
                .iter()
                .map(|(key, child)| {
                    let child_path = lexer.join(path, key);
                    let child = substitute(evaluator, lexer, &child_path, child)
                        .drain_into(&mut errors)
                        .unwrap_or_else(|| child.clone());
                    (key.clone(), child)
                })
                .collect(),
        ),
    };
    GResult::with_errors(substituted, errors)
}

fn last_field(tokens: &[Token]) -> String {
    tokens.last().map(Token::to_string).unwrap_or_default()
}

fn conversion_failed<T: ConfigType>(path: &str) -> ValidationError {
    ValidationError::FailedToConvertValue {
        path: path.to_string(),
        type_name: T::type_descriptor().to_string(),
    }
}

fn log_non_fatal(path: &str, errors: &[ValidationError]) {
    for error in errors {
        match error.level() {
            Level::Warning | Level::Error => tracing::warn!(path, "{}", error),
            _ => tracing::debug!(path, "{}", error),
        }
    }
}
