use cfgweave_model::{GResult, ValidationError};
use cfgweave_substitution::Transformer;
use std::collections::HashMap;

/// `${map:key}`: values supplied by the application.
#[derive(Debug, Clone, Default)]
pub struct CustomMapTransformer {
    values: HashMap<String, String>,
}

impl CustomMapTransformer {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl Transformer for CustomMapTransformer {
    fn name(&self) -> &str {
        "map"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn process(&self, path: &str, key: &str, _raw_value: &str) -> GResult<String> {
        match self.values.get(key) {
            Some(value) => GResult::ok(value.clone()),
            None => GResult::fail_one(ValidationError::NoCustomMapValueFound {
                path: path.to_string(),
                key: key.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let transformer =
            CustomMapTransformer::new(HashMap::from([("region".to_string(), "eu".to_string())]));
        assert_eq!(transformer.process("p", "region", "map:region").into_value().unwrap(), "eu");
        assert!(matches!(
            transformer.process("p", "zone", "map:zone").errors()[0],
            ValidationError::NoCustomMapValueFound { .. }
        ));
    }
}
