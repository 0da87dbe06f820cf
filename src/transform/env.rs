use cfgweave_model::{GResult, ValidationError};
use cfgweave_substitution::Transformer;
use std::env;

/// `${env:NAME}`: a process environment variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentVariablesTransformer;

impl Transformer for EnvironmentVariablesTransformer {
    fn name(&self) -> &str {
        "env"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn process(&self, path: &str, key: &str, _raw_value: &str) -> GResult<String> {
        match env::var(key) {
            Ok(value) => GResult::ok(value),
            Err(_) => GResult::fail_one(ValidationError::NoEnvironmentVariableFound {
                path: path.to_string(),
                key: key.to_string(),
            }),
        }
    }
}
