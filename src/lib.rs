//! cfgweave - typed configuration resolution
//!
//! Configuration fragments from files, environment variables and in-memory
//! maps are loaded into trees, merged in registration order and queried by
//! path. Lookups resolve `${transform:key:default}` substitutions and
//! decode into Rust types through a priority-ordered decoder chain.
//!
//! ```no_run
//! use cfgweave::{Cfgweave, EnvironmentConfigSource, FileConfigSource};
//!
//! let engine = Cfgweave::builder()
//!     .add_source(FileConfigSource::new("app.toml"))
//!     .add_source(EnvironmentConfigSource::with_prefix("APP_", true))
//!     .build()?;
//! engine.load_configs()?;
//!
//! let port: u16 = engine.get_config("db.port")?;
//! let hosts: Vec<String> = engine.get_config_or("db.hosts", vec![]);
//! # Ok::<(), cfgweave::CfgweaveError>(())
//! ```

pub mod cache;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod loader;
pub mod mapper;
pub mod node;
pub mod processor;
pub mod reload;
pub mod source;
pub mod tags;
pub mod transform;

pub use config::{CoreConfig, ErrorPolicy, LogLevel};
pub use decoder::{
    take_field, ConfigType, Decoder, DecoderContext, ObjectDescriptor, Priority, TypeDescriptor,
    Value,
};
pub use engine::{Cfgweave, CfgweaveBuilder};
pub use error::CfgweaveError;
pub use reload::{CoreReloadListener, ListenerId};
pub use source::{
    ConfigSource, EnvironmentConfigSource, FileConfigSource, MapConfigSource, StringConfigSource,
};
pub use tags::{FallbackToDefault, TagMergingStrategy, UnionWithDefault};
pub use transform::Transformer;

pub use cfgweave_lexer::PathLexer;
pub use cfgweave_model::{ConfigNode, GResult, Level, Tag, Tags, Token, ValidationError};
