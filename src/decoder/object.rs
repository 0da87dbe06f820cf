//! Objects decoded field by field.

use super::descriptor::{FieldDescriptor, TypeDescriptor};
use super::{Decoder, DecoderContext, Priority, Value};
use cfgweave_model::{ConfigNode, GResult, Tags, ValidationError};
use std::collections::BTreeMap;

/// Decodes a map node into an object using its field table.
///
/// Each field is looked up through the navigator, so path mappers apply to
/// field names (`maxConnections` finds `max_connections`). A missing field
/// decodes its default when it has one, is `Null` when optional, and is
/// otherwise reported as `MissingValueForNodePath`. A field that fails to
/// decode falls back to its default, or `Null` without one. The object is
/// always produced; every field error travels with it and the error policy
/// decides whether the lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectDecoder;

impl ObjectDecoder {
    fn decode_field(
        &self,
        path: &str,
        tags: &Tags,
        node: &ConfigNode,
        field: &FieldDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let field_path = ctx.navigator.lexer().join(path, &field.name);
        let mut errors = Vec::new();
        let lookup = ctx.navigator.next_field(path, &field.name, node);
        if let Some(child) = lookup.value() {
            let decoded = ctx
                .decode_child(&field_path, tags, Some(*child), &field.ty)
                .drain_into(&mut errors);
            if let Some(value) = decoded {
                return GResult::with_errors(value, errors);
            }
        } else if field.default.is_some() || field.ty.is_optional() {
            errors.push(self.missing_optional(path, field));
        } else {
            errors.push(ValidationError::MissingValueForNodePath {
                path: path.to_string(),
                field: field.name.clone(),
                type_name: field.ty.to_string(),
            });
        }

        if let Some(default) = &field.default {
            tracing::debug!(path = %field_path, "using default for field");
            let decoded = ctx
                .decode_child(&field_path, tags, Some(&ConfigNode::leaf(default)), &field.ty)
                .drain_into(&mut errors);
            if let Some(value) = decoded {
                return GResult::with_errors(value, errors);
            }
        }
        GResult::with_errors(Value::Null, errors)
    }

    fn missing_optional(&self, path: &str, field: &FieldDescriptor) -> ValidationError {
        ValidationError::OptionalMissingValueDecoding {
            path: path.to_string(),
            field: field.name.clone(),
            type_name: field.ty.to_string(),
        }
    }
}

impl Decoder for ObjectDecoder {
    fn name(&self) -> &str {
        "Object"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        matches!(ty, TypeDescriptor::Object(_))
    }

    fn decode(
        &self,
        path: &str,
        tags: &Tags,
        node: &ConfigNode,
        ty: &TypeDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let TypeDescriptor::Object(object) = ty else {
            return GResult::fail_one(ValidationError::NoDecodersFound {
                type_name: ty.to_string(),
                path: path.to_string(),
            });
        };
        if !matches!(node, ConfigNode::Map(_)) {
            return GResult::fail_one(ValidationError::DecodingExpectedMapNodeType {
                path: path.to_string(),
                found: node.kind_name().to_string(),
                decoder: self.name().to_string(),
            });
        }

        let mut errors = Vec::new();
        let mut fields = BTreeMap::new();
        for field in &object.fields {
            let value = self
                .decode_field(path, tags, node, field, ctx)
                .drain_into(&mut errors)
                .unwrap_or(Value::Null);
            fields.insert(field.name.clone(), value);
        }
        GResult::with_errors(Value::Object(fields), errors)
    }
}

#[cfg(test)]
mod tests {
    use super::super::descriptor::{IntKind, ObjectDescriptor};
    use super::super::testing::Fixture;
    use super::*;
    use cfgweave_model::Level;

    fn db() -> TypeDescriptor {
        ObjectDescriptor::new("Db")
            .field("port", TypeDescriptor::Integer(IntKind::I32))
            .field("uri", TypeDescriptor::String)
            .field("password", TypeDescriptor::String)
            .build()
    }

    #[test]
    fn test_decode_object() {
        let node = ConfigNode::map([
            ("port", ConfigNode::leaf("100")),
            ("uri", ConfigNode::leaf("mysql:db.example.com")),
            ("password", ConfigNode::leaf("pass")),
        ]);
        let value = Fixture::new().decode(&node, &db()).into_value().unwrap();
        let fields = value.into_fields().unwrap();
        assert_eq!(fields["port"], Value::Int(100));
        assert_eq!(fields["uri"], Value::String("mysql:db.example.com".into()));
    }

    #[test]
    fn test_errors_are_aggregated() {
        let node = ConfigNode::map([
            ("port", ConfigNode::leaf("aaaa")),
            ("uri", ConfigNode::leaf("mysql:db.example.com")),
        ]);
        let result = Fixture::new().decode(&node, &db());
        assert_eq!(result.errors().len(), 2);
        assert!(matches!(
            &result.errors()[0],
            ValidationError::DecodingNumberFormat { path, value, .. }
                if path == "test.port" && value == "aaaa"
        ));
        assert!(matches!(
            &result.errors()[1],
            ValidationError::MissingValueForNodePath { field, .. } if field == "password"
        ));
        let fields = result.into_value().unwrap().into_fields().unwrap();
        assert_eq!(fields["port"], Value::Null);
        assert_eq!(fields["uri"], Value::String("mysql:db.example.com".into()));
        assert_eq!(fields["password"], Value::Null);
    }

    #[test]
    fn test_bad_value_falls_back_to_default() {
        let ty = ObjectDescriptor::new("Db")
            .field("host", TypeDescriptor::String)
            .field_with_default("port", TypeDescriptor::Integer(IntKind::I32), "100")
            .build();
        let node = ConfigNode::map([
            ("host", ConfigNode::leaf("h")),
            ("port", ConfigNode::leaf("aaaa")),
        ]);
        let result = Fixture::new().decode(&node, &ty);

        assert!(result.has_results());
        assert_eq!(result.errors().len(), 1);
        assert!(matches!(
            &result.errors()[0],
            ValidationError::DecodingNumberFormat { value, .. } if value == "aaaa"
        ));
        let fields = result.into_value().unwrap().into_fields().unwrap();
        assert_eq!(fields["port"], Value::Int(100));
        assert_eq!(fields["host"], Value::String("h".into()));
    }

    #[test]
    fn test_defaults_and_optionals() {
        let ty = ObjectDescriptor::new("Server")
            .field_with_default("host", TypeDescriptor::String, "localhost")
            .field("name", TypeDescriptor::optional(TypeDescriptor::String))
            .field("port", TypeDescriptor::Integer(IntKind::U16))
            .build();
        let node = ConfigNode::map([("port", ConfigNode::leaf("80"))]);
        let result = Fixture::new().decode(&node, &ty);

        assert!(result
            .errors()
            .iter()
            .all(|e| e.level() == Level::MissingOptionalValue));
        let fields = result.into_value().unwrap().into_fields().unwrap();
        assert_eq!(fields["host"], Value::String("localhost".into()));
        assert_eq!(fields["name"], Value::Null);
        assert_eq!(fields["port"], Value::UInt(80));
    }

    #[test]
    fn test_field_name_mapping() {
        let ty = ObjectDescriptor::new("Pool")
            .field("maxConnections", TypeDescriptor::Integer(IntKind::U32))
            .build();
        let node = ConfigNode::map([("maxconnections", ConfigNode::leaf("10"))]);
        // the standard mapper lowercases the field name
        let fields = Fixture::new()
            .decode(&node, &ty)
            .into_value()
            .unwrap()
            .into_fields()
            .unwrap();
        assert_eq!(fields["maxConnections"], Value::UInt(10));
    }

    #[test]
    fn test_leaf_is_not_an_object() {
        let result = Fixture::new().decode(&ConfigNode::leaf("x"), &db());
        assert!(matches!(
            result.errors()[0],
            ValidationError::DecodingExpectedMapNodeType { .. }
        ));
    }
}
