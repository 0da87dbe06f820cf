//! Combining request tags with the engine's default tags.

use cfgweave_model::Tags;
use std::fmt;

/// Decides the tag-set a lookup resolves against.
pub trait TagMergingStrategy: Send + Sync + fmt::Debug {
    fn merge_tags(&self, request: &Tags, defaults: &Tags) -> Tags;
}

/// Request tags when any are given, otherwise the defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackToDefault;

impl TagMergingStrategy for FallbackToDefault {
    fn merge_tags(&self, request: &Tags, defaults: &Tags) -> Tags {
        if request.is_empty() {
            defaults.clone()
        } else {
            request.clone()
        }
    }
}

/// Defaults plus request tags; a request tag replaces a default with the same key.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionWithDefault;

impl TagMergingStrategy for UnionWithDefault {
    fn merge_tags(&self, request: &Tags, defaults: &Tags) -> Tags {
        defaults.union_overriding(request)
    }
}
