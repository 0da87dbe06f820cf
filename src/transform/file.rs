use cfgweave_model::{GResult, ValidationError};
use cfgweave_substitution::Transformer;
use std::fs;

/// `${file:/run/secrets/db_password}`: file contents, trailing newlines removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransformer;

impl Transformer for FileTransformer {
    fn name(&self) -> &str {
        "file"
    }

    fn process(&self, path: &str, key: &str, _raw_value: &str) -> GResult<String> {
        match fs::read_to_string(key) {
            Ok(contents) => GResult::ok(contents.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => GResult::fail_one(ValidationError::FileTransformFailed {
                path: path.to_string(),
                file: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
