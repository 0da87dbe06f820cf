//! In-memory `(path, value)` source.

use super::{new_source_id, ConfigSource, MAP_FORMAT};
use crate::error::CfgweaveError;
use cfgweave_model::{SourceId, Tags};

/// Pairs supplied by the application, e.g. built-in defaults.
#[derive(Debug, Clone)]
pub struct MapConfigSource {
    id: SourceId,
    pairs: Vec<(String, String)>,
    tags: Tags,
}

impl MapConfigSource {
    pub fn new<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            id: new_source_id(),
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            tags: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}

impl ConfigSource for MapConfigSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn name(&self) -> String {
        "mapConfig".to_string()
    }

    fn format(&self) -> &str {
        MAP_FORMAT
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn has_list(&self) -> bool {
        true
    }

    fn load_list(&self) -> Result<Vec<(String, String)>, CfgweaveError> {
        Ok(self.pairs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_source() {
        let source = MapConfigSource::new([("db.port", "5432")]).with_tags(Tags::of([("env", "dev")]));
        assert!(source.has_list());
        assert!(!source.has_stream());
        assert!(source.load_stream().is_err());
        assert_eq!(source.load_list().unwrap(), vec![("db.port".to_string(), "5432".to_string())]);
        assert_eq!(source.format(), "mapConfig");
        assert_eq!(source.tags().len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = MapConfigSource::new(Vec::<(String, String)>::new());
        let b = MapConfigSource::new(Vec::<(String, String)>::new());
        assert_ne!(a.id(), b.id());
    }
}
