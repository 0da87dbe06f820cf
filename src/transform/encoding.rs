use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cfgweave_model::{GResult, ValidationError};
use cfgweave_substitution::Transformer;

/// `${base64Encode:text}`
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64EncodeTransformer;

impl Transformer for Base64EncodeTransformer {
    fn name(&self) -> &str {
        "base64Encode"
    }

    fn process(&self, _path: &str, key: &str, _raw_value: &str) -> GResult<String> {
        GResult::ok(STANDARD.encode(key))
    }
}

/// `${base64Decode:dGV4dA==}`; the decoded bytes must be UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64DecodeTransformer;

impl Transformer for Base64DecodeTransformer {
    fn name(&self) -> &str {
        "base64Decode"
    }

    fn process(&self, path: &str, key: &str, _raw_value: &str) -> GResult<String> {
        let decoded = STANDARD
            .decode(key.trim())
            .map_err(|e| e.to_string())
            .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string()));
        match decoded {
            Ok(text) => GResult::ok(text),
            Err(reason) => GResult::fail_one(ValidationError::Base64DecodeFailed {
                path: path.to_string(),
                reason,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let encoded = Base64EncodeTransformer.process("p", "hello", "").into_value().unwrap();
        assert_eq!(encoded, "aGVsbG8=");
        let decoded = Base64DecodeTransformer.process("p", &encoded, "").into_value().unwrap();
        assert_eq!(decoded, "hello");
    }

    #[test]
    fn test_decode_invalid() {
        let result = Base64DecodeTransformer.process("p", "not base64!", "");
        assert!(matches!(
            result.errors()[0],
            ValidationError::Base64DecodeFailed { .. }
        ));
    }
}
