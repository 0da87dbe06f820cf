//! Nested substitution for cfgweave leaf values.
//!
//! A leaf such as `https://${env:HOST:localhost}:${map:port}` is parsed by
//! [`SubstitutionTreeBuilder`] into a tree of literal text and transform
//! regions, then evaluated by [`SubstitutionEvaluator`] which resolves each
//! region through a named [`Transformer`].
//!
//! Substitutions may nest: `${env:${map:var_name}}` first resolves the inner
//! region and uses its result as the outer key.

mod builder;
mod evaluator;
mod node;

pub use builder::{SubstitutionTreeBuilder, DEFAULT_CLOSING_TOKEN, DEFAULT_OPENING_TOKEN};
pub use evaluator::{SubstitutionEvaluator, Transformer, DEFAULT_SUBSTITUTION_REGEX};
pub use node::SubstitutionNode;
