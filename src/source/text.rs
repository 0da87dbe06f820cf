//! Stream sources: literal text and files.

use super::{new_source_id, ConfigSource};
use crate::error::CfgweaveError;
use cfgweave_model::{SourceId, Tags};
use std::fs;
use std::path::{Path, PathBuf};

/// A document held in memory.
#[derive(Debug, Clone)]
pub struct StringConfigSource {
    id: SourceId,
    text: String,
    format: String,
    tags: Tags,
}

impl StringConfigSource {
    pub fn new(text: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            id: new_source_id(),
            text: text.into(),
            format: format.into(),
            tags: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}

impl ConfigSource for StringConfigSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn name(&self) -> String {
        format!("string({})", self.format)
    }

    fn format(&self) -> &str {
        &self.format
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn has_stream(&self) -> bool {
        true
    }

    fn load_stream(&self) -> Result<String, CfgweaveError> {
        Ok(self.text.clone())
    }
}

/// A document read from disk on every load.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    id: SourceId,
    path: PathBuf,
    format: String,
    tags: Tags,
}

impl FileConfigSource {
    /// The format is taken from the file extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self {
            id: new_source_id(),
            path,
            format,
            tags: Tags::new(),
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn name(&self) -> String {
        format!("file({})", self.path.display())
    }

    fn format(&self) -> &str {
        &self.format
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn has_stream(&self) -> bool {
        true
    }

    fn load_stream(&self) -> Result<String, CfgweaveError> {
        fs::read_to_string(&self.path).map_err(|e| CfgweaveError::io(self.path.display().to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_string_source() {
        let source = StringConfigSource::new("a = 1", "toml");
        assert!(source.has_stream());
        assert!(!source.has_list());
        assert_eq!(source.load_stream().unwrap(), "a = 1");
        assert_eq!(source.name(), "string(toml)");
    }

    #[test]
    fn test_file_source_format_from_extension() {
        let mut file = Builder::new().suffix(".TOML").tempfile().unwrap();
        writeln!(file, "a = 1").unwrap();
        let source = FileConfigSource::new(file.path());
        assert_eq!(source.format(), "toml");
        assert_eq!(source.load_stream().unwrap().trim(), "a = 1");

        let json = FileConfigSource::new(file.path()).with_format("json");
        assert_eq!(json.format(), "json");
    }

    #[test]
    fn test_missing_file() {
        let source = FileConfigSource::new("/nonexistent/app.toml");
        assert!(matches!(source.load_stream(), Err(CfgweaveError::Io { .. })));
    }
}
