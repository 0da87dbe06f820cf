//! Turning nodes into typed values.
//!
//! A [`DecoderRegistry`] holds every registered [`Decoder`]. For each
//! request it keeps the decoders whose [`Decoder::matches`] accepts the
//! target [`TypeDescriptor`], orders them by [`Priority`] (stable, so
//! registration order breaks ties) and runs the first. Composite decoders
//! recurse through [`DecoderContext`], which carries the registry and
//! bounds the nesting depth.

mod collection;
mod descriptor;
mod object;
mod primitive;
mod time;
mod value;

pub use collection::{ListDecoder, MapDecoder, NodeDecoder, OptionalDecoder};
pub use descriptor::{FieldDescriptor, FloatKind, IntKind, ObjectDescriptor, TypeDescriptor};
pub use object::ObjectDecoder;
pub use primitive::{
    BoolDecoder, CharDecoder, EnumDecoder, FloatDecoder, IntegerDecoder, StringDecoder,
    UuidDecoder,
};
pub use time::{DateDecoder, DateTimeDecoder, DurationDecoder, LocalDateTimeDecoder};
pub use value::{take_field, ConfigType, Value};

use crate::config::{CoreConfig, RFC3339};
use crate::node::Navigator;
use cfgweave_model::{ConfigNode, GResult, Tags, ValidationError};
use std::sync::Arc;

/// Decoder ordering; higher runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Decodes one family of types.
pub trait Decoder: Send + Sync {
    fn name(&self) -> &str;

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool;

    fn decode(
        &self,
        path: &str,
        tags: &Tags,
        node: &ConfigNode,
        ty: &TypeDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value>;
}

/// Decoder settings taken from [`CoreConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderSettings {
    pub date_time_format: String,
    pub date_format: String,
    pub local_date_time_format: String,
    pub treat_missing_array_index_as_error: bool,
    pub max_decode_depth: usize,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self::from(&CoreConfig::default())
    }
}

impl From<&CoreConfig> for DecoderSettings {
    fn from(config: &CoreConfig) -> Self {
        Self {
            date_time_format: config.date_time_format.clone(),
            date_format: config.date_format.clone(),
            local_date_time_format: config.local_date_time_format.clone(),
            treat_missing_array_index_as_error: config.treat_missing_array_index_as_error,
            max_decode_depth: config.max_decode_depth,
        }
    }
}

impl DecoderSettings {
    pub fn uses_rfc3339(&self) -> bool {
        self.date_time_format.eq_ignore_ascii_case(RFC3339)
    }
}

/// State shared by one decode request.
#[derive(Debug, Clone, Copy)]
pub struct DecoderContext<'a> {
    pub registry: &'a DecoderRegistry,
    pub navigator: &'a Navigator,
    pub settings: &'a DecoderSettings,
    pub depth: usize,
}

impl<'a> DecoderContext<'a> {
    pub fn new(
        registry: &'a DecoderRegistry,
        navigator: &'a Navigator,
        settings: &'a DecoderSettings,
    ) -> Self {
        Self {
            registry,
            navigator,
            settings,
            depth: 0,
        }
    }

    /// Context for a nested decode.
    pub fn child(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    /// Decode a child node one level deeper.
    pub fn decode_child(
        &self,
        path: &str,
        tags: &Tags,
        node: Option<&ConfigNode>,
        ty: &TypeDescriptor,
    ) -> GResult<Value> {
        self.registry.decode_node(path, tags, node, ty, &self.child())
    }
}

/// The built-in decoders.
pub fn default_decoders() -> Vec<Arc<dyn Decoder>> {
    vec![
        Arc::new(BoolDecoder),
        Arc::new(IntegerDecoder),
        Arc::new(FloatDecoder),
        Arc::new(CharDecoder),
        Arc::new(StringDecoder),
        Arc::new(UuidDecoder),
        Arc::new(EnumDecoder),
        Arc::new(DurationDecoder),
        Arc::new(DateTimeDecoder),
        Arc::new(DateDecoder),
        Arc::new(LocalDateTimeDecoder),
        Arc::new(ListDecoder),
        Arc::new(MapDecoder),
        Arc::new(OptionalDecoder),
        Arc::new(ObjectDecoder),
        Arc::new(NodeDecoder),
    ]
}

/// Registered decoders.
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: Vec<Arc<dyn Decoder>>,
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("decoders", &self.names())
            .finish()
    }
}

impl DecoderRegistry {
    pub fn new(decoders: Vec<Arc<dyn Decoder>>) -> Self {
        Self { decoders }
    }

    /// Every built-in decoder.
    pub fn with_defaults() -> Self {
        Self::new(default_decoders())
    }

    pub fn push(&mut self, decoder: Arc<dyn Decoder>) {
        self.decoders.push(decoder);
    }

    pub fn names(&self) -> Vec<&str> {
        self.decoders.iter().map(|d| d.name()).collect()
    }

    /// Decode `node` as `ty` with the highest priority matching decoder.
    ///
    /// A `None` node reports `NullNodeForPath`.
    pub fn decode_node(
        &self,
        path: &str,
        tags: &Tags,
        node: Option<&ConfigNode>,
        ty: &TypeDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let Some(node) = node else {
            return GResult::fail_one(ValidationError::NullNodeForPath {
                path: path.to_string(),
            });
        };
        if ctx.depth > ctx.settings.max_decode_depth {
            return GResult::fail_one(ValidationError::DecoderDepthExceeded {
                path: path.to_string(),
                max_depth: ctx.settings.max_decode_depth,
            });
        }

        let mut candidates: Vec<&Arc<dyn Decoder>> =
            self.decoders.iter().filter(|d| d.matches(ty)).collect();
        // stable: ties keep registration order
        candidates.sort_by(|a, b| b.priority().cmp(&a.priority()));

        let Some(decoder) = candidates.first() else {
            return GResult::fail_one(ValidationError::NoDecodersFound {
                type_name: ty.to_string(),
                path: path.to_string(),
            });
        };
        if candidates.len() > 1 {
            let names: Vec<&str> = candidates.iter().map(|d| d.name()).collect();
            tracing::info!(
                path,
                decoders = ?names,
                "multiple decoders match {}, using {}",
                ty,
                decoder.name()
            );
        }

        decoder.decode(path, tags, node, ty, ctx)
    }
}

/// Text of a leaf, or the error a leaf-only decoder reports.
pub(crate) fn leaf_value<'n>(
    path: &str,
    node: &'n ConfigNode,
    decoder: &str,
) -> Result<&'n str, ValidationError> {
    match node {
        ConfigNode::Leaf(leaf) => {
            leaf.value
                .as_deref()
                .ok_or_else(|| ValidationError::DecodingLeafMissingValue {
                    path: path.to_string(),
                    decoder: decoder.to_string(),
                })
        }
        other => Err(ValidationError::DecodingExpectedLeafNodeType {
            path: path.to_string(),
            found: other.kind_name().to_string(),
            decoder: decoder.to_string(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::mapper::StandardPathMapper;
    use cfgweave_lexer::PathLexer;

    /// Registry, navigator and settings for decoder unit tests.
    pub struct Fixture {
        pub registry: DecoderRegistry,
        pub navigator: Navigator,
        pub settings: DecoderSettings,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::with_settings(DecoderSettings::default())
        }

        pub fn with_settings(settings: DecoderSettings) -> Self {
            Self {
                registry: DecoderRegistry::with_defaults(),
                navigator: Navigator::new(
                    Arc::new(PathLexer::default()),
                    vec![Arc::new(StandardPathMapper)],
                ),
                settings,
            }
        }

        pub fn decode(&self, node: &ConfigNode, ty: &TypeDescriptor) -> GResult<Value> {
            let ctx = DecoderContext::new(&self.registry, &self.navigator, &self.settings);
            self.registry
                .decode_node("test", &Tags::new(), Some(node), ty, &ctx)
        }
    }
}
