//! Path lexer for cfgweave.
//!
//! Splits a config path such as `db.hosts[1].password` into structural
//! [`Token`]s. Both the word delimiter and the per-word pattern are
//! configurable so alternate naming conventions can reuse the same lexer.

mod config;
mod lexer;

pub use cfgweave_model::Token;
pub use config::{LexerConfig, DEFAULT_DELIMITER, DEFAULT_MAX_ARRAY_INDEX, DEFAULT_PATH_PATTERN};
pub use lexer::{LexerError, PathLexer};
