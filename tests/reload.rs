//! Reloading sources and the lookup cache.

use cfgweave::{
    Cfgweave, CfgweaveBuilder, ConfigNode, CoreReloadListener, Decoder, DecoderContext,
    FileConfigSource, GResult, MapConfigSource, Priority, Tags, TypeDescriptor, ValidationError,
    Value,
};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// String decoder that counts how often it runs.
struct CountingDecoder(Arc<AtomicUsize>);

impl Decoder for CountingDecoder {
    fn name(&self) -> &str {
        "counting"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        *ty == TypeDescriptor::String
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        _ty: &TypeDescriptor,
        _ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        self.0.fetch_add(1, Ordering::SeqCst);
        match node.value() {
            Some(text) => GResult::ok(Value::String(text.to_string())),
            None => GResult::fail_one(ValidationError::NullNodeForPath {
                path: path.to_string(),
            }),
        }
    }
}

struct CountingListener(AtomicUsize);

impl CoreReloadListener for CountingListener {
    fn reload(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn counted(builder: CfgweaveBuilder) -> (Cfgweave, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let engine = builder
        .add_decoder(CountingDecoder(Arc::clone(&count)))
        .build()
        .unwrap();
    engine.load_configs().unwrap();
    (engine, count)
}

fn values() -> MapConfigSource {
    MapConfigSource::new([("db.host", "localhost"), ("db.password", "hunter2")])
}

// =============================================================================
// Cache
// =============================================================================

/// Test: repeated lookups decode once
#[test]
fn test_lookups_cached() {
    let (engine, count) = counted(Cfgweave::builder().add_source(values()));

    assert_eq!(engine.get_config::<String>("db.host").unwrap(), "localhost");
    assert_eq!(engine.get_config::<String>("db.host").unwrap(), "localhost");
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

/// Test: reload clears the cache
#[test]
fn test_reload_clears_cache() {
    let (engine, count) = counted(Cfgweave::builder().add_source(values()));

    engine.get_config::<String>("db.host").unwrap();
    engine.reload().unwrap();
    engine.get_config::<String>("db.host").unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

/// Test: secret values are never cached
#[test]
fn test_secret_not_cached() {
    let (engine, count) = counted(Cfgweave::builder().add_source(values()));

    assert_eq!(engine.get_config::<String>("db.password").unwrap(), "hunter2");
    assert_eq!(engine.get_config::<String>("db.password").unwrap(), "hunter2");
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

/// Test: without the cache every lookup decodes
#[test]
fn test_cache_disabled() {
    let (engine, count) = counted(Cfgweave::builder().add_source(values()).use_cache(false));

    engine.get_config::<String>("db.host").unwrap();
    engine.get_config::<String>("db.host").unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

/// Test: different tags are cached separately
#[test]
fn test_cache_keyed_by_tags() {
    let (engine, count) = counted(
        Cfgweave::builder()
            .add_source(values())
            .add_source(
                MapConfigSource::new([("db.host", "dev-host")])
                    .with_tags(Tags::of([("environment", "dev")])),
            ),
    );

    let dev = Tags::of([("environment", "dev")]);
    assert_eq!(engine.get_config::<String>("db.host").unwrap(), "localhost");
    assert_eq!(
        engine.get_config_with_tags::<String>("db.host", &dev).unwrap(),
        "dev-host"
    );
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Reload
// =============================================================================

/// Test: reload picks up a rewritten file
#[test]
fn test_reload_sees_new_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.toml");
    fs::write(&path, "[db]\nport = 100\n").unwrap();

    let engine = Cfgweave::builder()
        .add_source(FileConfigSource::new(&path))
        .build()
        .unwrap();
    engine.load_configs().unwrap();
    assert_eq!(engine.get_config::<u16>("db.port").unwrap(), 100);

    fs::write(&path, "[db]\nport = 200\n").unwrap();
    assert_eq!(engine.get_config::<u16>("db.port").unwrap(), 100);
    engine.reload().unwrap();
    assert_eq!(engine.get_config::<u16>("db.port").unwrap(), 200);
}

/// Test: a failed reload keeps the previous configuration
#[test]
fn test_failed_reload_keeps_old() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.toml");
    fs::write(&path, "[db]\nport = 100\n").unwrap();

    let listener = Arc::new(CountingListener(AtomicUsize::new(0)));
    let engine = Cfgweave::builder()
        .add_source(FileConfigSource::new(&path))
        .add_reload_listener(listener.clone())
        .build()
        .unwrap();
    engine.load_configs().unwrap();

    fs::write(&path, "[db\nport = ").unwrap();
    assert!(engine.reload().is_err());
    assert_eq!(engine.get_config::<u16>("db.port").unwrap(), 100);
    assert_eq!(listener.0.load(Ordering::SeqCst), 0);
}

/// Test: listeners hear about reloads until removed
#[test]
fn test_listeners() {
    let engine = Cfgweave::builder().add_source(values()).build().unwrap();
    engine.load_configs().unwrap();

    let listener = Arc::new(CountingListener(AtomicUsize::new(0)));
    let id = engine.register_reload_listener(listener.clone());
    engine.reload().unwrap();
    assert_eq!(listener.0.load(Ordering::SeqCst), 1);

    assert!(engine.remove_reload_listener(id));
    assert!(!engine.remove_reload_listener(id));
    engine.reload().unwrap();
    assert_eq!(listener.0.load(Ordering::SeqCst), 1);
}
