//! Core data model for cfgweave.
//!
//! This crate holds the types every stage of the resolution pipeline shares:
//! the [`ConfigNode`] tree, path [`Token`]s, [`Tags`], the closed set of
//! [`ValidationError`]s and the [`GResult`] carrier that pairs an optional
//! value with the errors collected while producing it.

mod container;
mod error;
mod node;
mod result;
mod tags;
mod token;

pub use container::{ConfigNodeContainer, SourceId};
pub use error::{Level, ValidationError};
pub use node::{ConfigNode, LeafNode, Metadata, MetadataKey};
pub use result::GResult;
pub use tags::{Tag, Tags};
pub use token::Token;
