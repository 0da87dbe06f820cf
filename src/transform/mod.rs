//! Substitution transformers
//!
//! Each transformer resolves the key of a `${name:key}` expression. `env`
//! and `map` also answer expressions that name no transformer; the others
//! are only reachable by name.

mod encoding;
mod env;
mod file;
mod map;
mod random;

pub use cfgweave_substitution::Transformer;
pub use encoding::{Base64DecodeTransformer, Base64EncodeTransformer};
pub use env::EnvironmentVariablesTransformer;
pub use file::FileTransformer;
pub use map::CustomMapTransformer;
pub use random::RandomTransformer;

use std::collections::HashMap;
use std::sync::Arc;

/// The built-in transformers, with `custom` backing the `map` transformer.
pub fn default_transformers(custom: HashMap<String, String>) -> Vec<Arc<dyn Transformer>> {
    vec![
        Arc::new(EnvironmentVariablesTransformer),
        Arc::new(CustomMapTransformer::new(custom)),
        Arc::new(FileTransformer),
        Arc::new(RandomTransformer),
        Arc::new(Base64EncodeTransformer),
        Arc::new(Base64DecodeTransformer),
    ]
}
