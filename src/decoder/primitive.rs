//! Leaf decoders for scalar types.

use super::descriptor::{FloatKind, IntKind, TypeDescriptor};
use super::{leaf_value, Decoder, DecoderContext, Value};
use cfgweave_model::{ConfigNode, GResult, Tags, ValidationError};
use uuid::Uuid;

/// Run `parse` over the leaf text.
fn decode_leaf(
    path: &str,
    node: &ConfigNode,
    decoder: &str,
    parse: impl FnOnce(&str) -> Result<Value, ValidationError>,
) -> GResult<Value> {
    match leaf_value(path, node, decoder).and_then(parse) {
        Ok(value) => GResult::ok(value),
        Err(err) => GResult::fail_one(err),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolDecoder;

impl Decoder for BoolDecoder {
    fn name(&self) -> &str {
        "Boolean"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        *ty == TypeDescriptor::Bool
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        _ty: &TypeDescriptor,
        _ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        decode_leaf(path, node, self.name(), |text| {
            match text.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(ValidationError::DecodingBoolean {
                    path: path.to_string(),
                    value: text.to_string(),
                }),
            }
        })
    }
}

/// All integer widths, range-checked against the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerDecoder;

impl IntegerDecoder {
    fn parse(&self, path: &str, text: &str, kind: IntKind) -> Result<Value, ValidationError> {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix(&['+', '-'][..]).unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::DecodingNumberFormat {
                path: path.to_string(),
                value: text.to_string(),
                decoder: self.name().to_string(),
            });
        }

        let out_of_range = |reason: String| ValidationError::DecodingNumberParsing {
            path: path.to_string(),
            value: text.to_string(),
            decoder: self.name().to_string(),
            reason,
        };
        let parsed: i128 = trimmed.parse().map_err(|e| out_of_range(format!("{}", e)))?;
        let (min, max) = kind.bounds();
        if parsed < min || parsed > max {
            return Err(out_of_range(format!(
                "out of range for {} ({}..={})",
                kind.name(),
                min,
                max
            )));
        }

        if kind.is_signed() {
            i64::try_from(parsed)
                .map(Value::Int)
                .map_err(|e| out_of_range(e.to_string()))
        } else {
            u64::try_from(parsed)
                .map(Value::UInt)
                .map_err(|e| out_of_range(e.to_string()))
        }
    }
}

impl Decoder for IntegerDecoder {
    fn name(&self) -> &str {
        "Integer"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        matches!(ty, TypeDescriptor::Integer(_))
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        ty: &TypeDescriptor,
        _ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let TypeDescriptor::Integer(kind) = ty else {
            return GResult::fail_one(ValidationError::NoDecodersFound {
                type_name: ty.to_string(),
                path: path.to_string(),
            });
        };
        decode_leaf(path, node, self.name(), |text| self.parse(path, text, *kind))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatDecoder;

impl Decoder for FloatDecoder {
    fn name(&self) -> &str {
        "Float"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        matches!(ty, TypeDescriptor::Float(_))
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        ty: &TypeDescriptor,
        _ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        decode_leaf(path, node, self.name(), |text| {
            let parsed: f64 =
                text.trim()
                    .parse()
                    .map_err(|_| ValidationError::DecodingNumberFormat {
                        path: path.to_string(),
                        value: text.to_string(),
                        decoder: self.name().to_string(),
                    })?;
            if *ty == TypeDescriptor::Float(FloatKind::F32)
                && parsed.is_finite()
                && parsed.abs() > f32::MAX as f64
            {
                return Err(ValidationError::DecodingNumberParsing {
                    path: path.to_string(),
                    value: text.to_string(),
                    decoder: self.name().to_string(),
                    reason: "out of range for f32".to_string(),
                });
            }
            Ok(Value::Float(parsed))
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CharDecoder;

impl Decoder for CharDecoder {
    fn name(&self) -> &str {
        "Character"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        *ty == TypeDescriptor::Char
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        _ty: &TypeDescriptor,
        _ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        decode_leaf(path, node, self.name(), |text| {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(ValidationError::DecodingChar {
                    path: path.to_string(),
                    value: text.to_string(),
                }),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringDecoder;

impl Decoder for StringDecoder {
    fn name(&self) -> &str {
        "String"
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
        decode_leaf(path, node, self.name(), |text| Ok(Value::String(text.to_string())))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidDecoder;

impl Decoder for UuidDecoder {
    fn name(&self) -> &str {
        "UUID"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        *ty == TypeDescriptor::Uuid
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        _ty: &TypeDescriptor,
        _ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        decode_leaf(path, node, self.name(), |text| {
            Uuid::parse_str(text.trim())
                .map(Value::Uuid)
                .map_err(|e| ValidationError::DecodingUuid {
                    path: path.to_string(),
                    value: text.to_string(),
                    reason: e.to_string(),
                })
        })
    }
}

/// Matches variant names case-insensitively; yields the declared spelling.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumDecoder;

impl Decoder for EnumDecoder {
    fn name(&self) -> &str {
        "Enum"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        matches!(ty, TypeDescriptor::Enum { .. })
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        ty: &TypeDescriptor,
        _ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let TypeDescriptor::Enum { name, variants } = ty else {
            return GResult::fail_one(ValidationError::NoDecodersFound {
                type_name: ty.to_string(),
                path: path.to_string(),
            });
        };
        decode_leaf(path, node, self.name(), |text| {
            let wanted = text.trim();
            variants
                .iter()
                .find(|v| v.eq_ignore_ascii_case(wanted))
                .map(|v| Value::Enum(v.clone()))
                .ok_or_else(|| ValidationError::DecodingEnum {
                    path: path.to_string(),
                    value: text.to_string(),
                    enum_name: name.clone(),
                    variants: variants.join(", "),
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;

    fn decode(text: &str, ty: TypeDescriptor) -> GResult<Value> {
        Fixture::new().decode(&ConfigNode::leaf(text), &ty)
    }

    #[test]
    fn test_integer() {
        let ty = TypeDescriptor::Integer(IntKind::I32);
        assert_eq!(decode(" 100 ", ty.clone()).into_value(), Some(Value::Int(100)));
        assert_eq!(decode("-7", ty.clone()).into_value(), Some(Value::Int(-7)));
        assert_eq!(
            decode("42", TypeDescriptor::Integer(IntKind::U8)).into_value(),
            Some(Value::UInt(42))
        );
    }

    #[test]
    fn test_integer_format_error() {
        let result = decode("aaaa", TypeDescriptor::Integer(IntKind::I32));
        assert!(!result.has_results());
        assert!(matches!(
            &result.errors()[0],
            ValidationError::DecodingNumberFormat { value, .. } if value == "aaaa"
        ));
        for text in ["", "-", "1.5", "1e3"] {
            assert!(!decode(text, TypeDescriptor::Integer(IntKind::I64)).has_results());
        }
    }

    #[test]
    fn test_integer_range_error() {
        let result = decode("300", TypeDescriptor::Integer(IntKind::U8));
        assert!(matches!(
            result.errors()[0],
            ValidationError::DecodingNumberParsing { .. }
        ));
        let result = decode("-1", TypeDescriptor::Integer(IntKind::U32));
        assert!(!result.has_results());
        let result = decode(
            "99999999999999999999999999999999999999999",
            TypeDescriptor::Integer(IntKind::I64),
        );
        assert!(matches!(
            result.errors()[0],
            ValidationError::DecodingNumberParsing { .. }
        ));
    }

    #[test]
    fn test_float() {
        assert_eq!(
            decode("1.5", TypeDescriptor::Float(FloatKind::F64)).into_value(),
            Some(Value::Float(1.5))
        );
        assert!(!decode("1e300", TypeDescriptor::Float(FloatKind::F32)).has_results());
        assert!(!decode("x", TypeDescriptor::Float(FloatKind::F64)).has_results());
    }

    #[test]
    fn test_bool() {
        assert_eq!(decode("TRUE", TypeDescriptor::Bool).into_value(), Some(Value::Bool(true)));
        assert_eq!(decode("false", TypeDescriptor::Bool).into_value(), Some(Value::Bool(false)));
        assert!(matches!(
            decode("yes please", TypeDescriptor::Bool).errors()[0],
            ValidationError::DecodingBoolean { .. }
        ));
    }

    #[test]
    fn test_char() {
        assert_eq!(decode("é", TypeDescriptor::Char).into_value(), Some(Value::Char('é')));
        assert!(matches!(
            decode("ab", TypeDescriptor::Char).errors()[0],
            ValidationError::DecodingChar { .. }
        ));
        assert!(!decode("", TypeDescriptor::Char).has_results());
    }

    #[test]
    fn test_string_keeps_whitespace() {
        assert_eq!(
            decode(" a b ", TypeDescriptor::String).into_value(),
            Some(Value::String(" a b ".into()))
        );
    }

    #[test]
    fn test_string_wrong_node() {
        let result = Fixture::new().decode(&ConfigNode::empty_map(), &TypeDescriptor::String);
        assert!(matches!(
            &result.errors()[0],
            ValidationError::DecodingExpectedLeafNodeType { found, .. } if found == "map"
        ));
    }

    #[test]
    fn test_uuid() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        assert_eq!(
            decode(id, TypeDescriptor::Uuid).into_value(),
            Some(Value::Uuid(Uuid::parse_str(id).unwrap()))
        );
        assert!(matches!(
            decode("nope", TypeDescriptor::Uuid).errors()[0],
            ValidationError::DecodingUuid { .. }
        ));
    }

    #[test]
    fn test_enum() {
        let ty = TypeDescriptor::enumeration("Mode", &["Fast", "Safe"]);
        assert_eq!(decode("safe", ty.clone()).into_value(), Some(Value::Enum("Safe".into())));
        let result = decode("slow", ty);
        assert!(matches!(
            &result.errors()[0],
            ValidationError::DecodingEnum { variants, .. } if variants == "Fast, Safe"
        ));
    }
}
