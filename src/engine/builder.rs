use super::Cfgweave;
use crate::cache::ConfigCache;
use crate::config::CoreConfig;
use crate::decoder::{default_decoders, Decoder, DecoderRegistry, DecoderSettings};
use crate::error::CfgweaveError;
use crate::loader::{default_loaders, ConfigLoader, LoaderRegistry};
use crate::mapper::{KebabCasePathMapper, PathMapper, SnakeCasePathMapper, StandardPathMapper};
use crate::node::{ConfigNodeManager, Navigator};
use crate::processor::{
    ConfigNodeProcessor, IncludeProcessor, SecretMarkingProcessor, SourceFactory,
    SourceFactoryRegistry,
};
use crate::reload::{CoreReloadListener, ReloadListenersContainer};
use crate::source::ConfigSource;
use crate::tags::{FallbackToDefault, TagMergingStrategy};
use crate::transform::{default_transformers, Transformer};
use cfgweave_lexer::PathLexer;
use cfgweave_model::{Tag, Tags};
use cfgweave_substitution::SubstitutionEvaluator;
use std::collections::HashMap;
use std::sync::Arc;

/// Assembles a [`Cfgweave`].
///
/// Built-in loaders, decoders, transformers, path mappers and processors
/// are always registered. Anything added here is registered ahead of them,
/// so it wins ties.
#[derive(Default)]
pub struct CfgweaveBuilder {
    config: CoreConfig,
    sources: Vec<Arc<dyn ConfigSource>>,
    loaders: Vec<Arc<dyn ConfigLoader>>,
    decoders: Vec<Arc<dyn Decoder>>,
    transformers: Vec<Arc<dyn Transformer>>,
    mappers: Vec<Arc<dyn PathMapper>>,
    processors: Vec<Arc<dyn ConfigNodeProcessor>>,
    source_factories: Vec<Arc<dyn SourceFactory>>,
    custom_values: HashMap<String, String>,
    tag_strategy: Option<Arc<dyn TagMergingStrategy>>,
    default_tags: Tags,
    listeners: Vec<Arc<dyn CoreReloadListener>>,
}

impl CfgweaveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Sources merge in the order they are added; later sources win.
    pub fn add_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn add_shared_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn add_loader(mut self, loader: impl ConfigLoader + 'static) -> Self {
        self.loaders.push(Arc::new(loader));
        self
    }

    pub fn add_decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoders.push(Arc::new(decoder));
        self
    }

    pub fn add_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformers.push(Arc::new(transformer));
        self
    }

    pub fn add_path_mapper(mut self, mapper: impl PathMapper + 'static) -> Self {
        self.mappers.push(Arc::new(mapper));
        self
    }

    pub fn add_processor(mut self, processor: impl ConfigNodeProcessor + 'static) -> Self {
        self.processors.push(Arc::new(processor));
        self
    }

    pub fn add_source_factory(mut self, factory: impl SourceFactory + 'static) -> Self {
        self.source_factories.push(Arc::new(factory));
        self
    }

    /// A value for `${map:key}`.
    pub fn add_custom_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_values.insert(key.into(), value.into());
        self
    }

    pub fn add_custom_values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.custom_values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn add_default_tag(mut self, tag: Tag) -> Self {
        self.default_tags = self.default_tags.with(tag);
        self
    }

    pub fn with_default_tags(mut self, tags: Tags) -> Self {
        self.default_tags = tags;
        self
    }

    pub fn with_tag_strategy(mut self, strategy: impl TagMergingStrategy + 'static) -> Self {
        self.tag_strategy = Some(Arc::new(strategy));
        self
    }

    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.config.cache_enabled = enabled;
        self
    }

    pub fn add_reload_listener(mut self, listener: Arc<dyn CoreReloadListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn build(self) -> Result<Cfgweave, CfgweaveError> {
        self.config.validate()?;
        if self.sources.is_empty() {
            return Err(CfgweaveError::NoSources);
        }

        let lexer = Arc::new(PathLexer::new(&self.config.lexer_config())?);

        let mut loaders = self.loaders;
        loaders.extend(default_loaders(Arc::clone(&lexer)));
        let loaders = LoaderRegistry::new(loaders);

        let mut factories = SourceFactoryRegistry::new(self.source_factories);
        factories.push(Arc::new(crate::processor::FileSourceFactory));

        let secrets = SecretMarkingProcessor::new(&self.config.secret_pattern)?;
        let mut processors: Vec<Arc<dyn ConfigNodeProcessor>> = vec![
            Arc::new(IncludeProcessor::new(
                self.config.include_keyword.clone(),
                factories,
                loaders.clone(),
            )),
            Arc::new(secrets),
        ];
        processors.extend(self.processors);

        let mut mappers = self.mappers;
        mappers.extend([
            Arc::new(StandardPathMapper) as Arc<dyn PathMapper>,
            Arc::new(SnakeCasePathMapper),
            Arc::new(KebabCasePathMapper),
        ]);
        let navigator = Navigator::new(Arc::clone(&lexer), mappers);

        let mut decoders = self.decoders;
        decoders.extend(default_decoders());

        let mut transformers = self.transformers;
        transformers.extend(default_transformers(self.custom_values));
        let evaluator = SubstitutionEvaluator::new(
            self.config.substitution_builder(),
            &self.config.substitution_regex,
            transformers,
        )
        .map_err(|e| CfgweaveError::pattern(&self.config.substitution_regex, e))?;

        let listeners = ReloadListenersContainer::new();
        let cache = self.config.cache_enabled.then(|| {
            let cache = Arc::new(ConfigCache::new());
            listeners.register(cache.clone());
            cache
        });
        for listener in self.listeners {
            listeners.register(listener);
        }

        tracing::debug!(
            sources = self.sources.len(),
            transformers = ?evaluator.transformer_names(),
            "built configuration engine"
        );

        Ok(Cfgweave {
            policy: self.config.error_policy(),
            decoder_settings: DecoderSettings::from(&self.config),
            config: self.config,
            lexer,
            sources: self.sources,
            loaders,
            processors,
            navigator,
            decoders: DecoderRegistry::new(decoders),
            evaluator,
            tag_strategy: self
                .tag_strategy
                .unwrap_or_else(|| Arc::new(FallbackToDefault)),
            default_tags: self.default_tags,
            manager: ConfigNodeManager::new(),
            cache,
            listeners,
        })
    }
}
