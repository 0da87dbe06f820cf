//! Node tree operations
//!
//! Merging trees, compiling flat pairs into a tree, navigating token paths,
//! and holding the merged snapshot the engine reads from.

mod compile;
mod merge;
mod navigate;
mod print;
mod snapshot;

pub use compile::{build_branch, compile};
pub use merge::{merge, merge_layers};
pub use navigate::Navigator;
pub use print::{debug_print, SECRET_MASK};
pub use snapshot::{ConfigNodeManager, NodeSnapshot};
