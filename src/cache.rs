//! Lookup result cache.
//!
//! Results are keyed by path, target type and tags, and live until the next
//! reload. Results computed from a subtree containing a no-cache leaf are
//! never stored, nor are results whose computation overlapped a clear.

use crate::decoder::{TypeDescriptor, Value};
use crate::reload::CoreReloadListener;
use cfgweave_model::{GResult, Tags};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: String,
    pub ty: TypeDescriptor,
    pub tags: Tags,
}

impl CacheKey {
    pub fn new(path: impl Into<String>, ty: TypeDescriptor, tags: Tags) -> Self {
        Self {
            path: path.into(),
            ty,
            tags,
        }
    }
}

/// A computed lookup and whether it may be stored.
#[derive(Debug, Clone)]
pub struct Computed {
    pub result: GResult<Value>,
    pub cacheable: bool,
}

#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: RwLock<HashMap<CacheKey, GResult<Value>>>,
    generation: AtomicU64,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<GResult<Value>> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// The cached result for `key`, or the result of `compute`.
    ///
    /// Two threads missing on the same key may both compute; the later
    /// insert wins and both results are equivalent. A result is dropped
    /// instead of stored when [`clear`](Self::clear) ran while it was being
    /// computed, since it may come from the replaced configuration.
    pub fn get_or_compute(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> Computed,
    ) -> GResult<Value> {
        if let Some(hit) = self.get(&key) {
            tracing::trace!(path = %key.path, "cache hit");
            return hit;
        }

        let generation = self.generation.load(Ordering::Acquire);
        let Computed { result, cacheable } = compute();
        if !cacheable {
            tracing::trace!(path = %key.path, "result not cacheable");
            return result;
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::Acquire) == generation {
            entries.insert(key, result.clone());
        } else {
            tracing::trace!(path = %key.path, "cache cleared during lookup, not storing");
        }
        result
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CoreReloadListener for ConfigCache {
    fn reload(&self) {
        tracing::debug!(entries = self.len(), "clearing cache after reload");
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn key(path: &str) -> CacheKey {
        CacheKey::new(path, TypeDescriptor::String, Tags::new())
    }

    fn computed(value: &str, cacheable: bool) -> Computed {
        Computed {
            result: GResult::ok(Value::String(value.to_string())),
            cacheable,
        }
    }

    #[test]
    fn test_second_lookup_is_served_from_cache() {
        let cache = ConfigCache::new();
        let calls = Cell::new(0);
        for _ in 0..2 {
            let result = cache.get_or_compute(key("a"), || {
                calls.set(calls.get() + 1);
                computed("x", true)
            });
            assert_eq!(result.into_value(), Some(Value::String("x".into())));
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_uncacheable_not_stored() {
        let cache = ConfigCache::new();
        cache.get_or_compute(key("secret"), || computed("x", false));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_includes_type_and_tags() {
        let cache = ConfigCache::new();
        cache.get_or_compute(key("a"), || computed("x", true));
        let other_type = CacheKey::new("a", TypeDescriptor::Bool, Tags::new());
        let other_tags = CacheKey::new("a", TypeDescriptor::String, Tags::of([("env", "dev")]));
        assert!(cache.get(&other_type).is_none());
        assert!(cache.get(&other_tags).is_none());
    }

    #[test]
    fn test_clear_during_compute_not_stored() {
        let cache = ConfigCache::new();
        let result = cache.get_or_compute(key("a"), || {
            cache.clear();
            computed("old", true)
        });
        assert_eq!(result.into_value(), Some(Value::String("old".into())));
        assert!(cache.get(&key("a")).is_none());

        cache.get_or_compute(key("a"), || computed("new", true));
        assert_eq!(
            cache.get(&key("a")).and_then(GResult::into_value),
            Some(Value::String("new".into()))
        );
    }

    #[test]
    fn test_reload_clears() {
        let cache = ConfigCache::new();
        cache.get_or_compute(key("a"), || computed("x", true));
        CoreReloadListener::reload(&cache);
        assert!(cache.is_empty());
    }
}
