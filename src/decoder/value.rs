//! Decoded values and the bridge from them to Rust types.

use super::descriptor::{FloatKind, IntKind, TypeDescriptor};
use cfgweave_model::ConfigNode;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::time::Duration;
use uuid::Uuid;

/// Output of a decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent optional, or a missing sparse array slot.
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    String(String),
    Uuid(Uuid),
    Duration(Duration),
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
    LocalDateTime(NaiveDateTime),
    /// Canonical variant name.
    Enum(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Field name to value.
    Object(BTreeMap<String, Value>),
    Node(ConfigNode),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Fields of an object, for [`ConfigType::from_value`] implementations.
    pub fn into_fields(self) -> Option<BTreeMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }
}

/// A Rust type the engine can decode into.
///
/// Implemented for primitives, strings, collections, `Option`, durations,
/// chrono dates, [`Uuid`] and [`ConfigNode`]. User structs implement it by
/// describing their fields and rebuilding themselves from the decoded
/// object:
///
/// ```
/// use cfgweave::{ConfigType, ObjectDescriptor, TypeDescriptor, Value, take_field};
///
/// struct Db {
///     port: u16,
///     uri: String,
/// }
///
/// impl ConfigType for Db {
///     fn type_descriptor() -> TypeDescriptor {
///         ObjectDescriptor::new("Db")
///             .field("port", u16::type_descriptor())
///             .field("uri", String::type_descriptor())
///             .build()
///     }
///
///     fn from_value(value: Value) -> Option<Self> {
///         let mut fields = value.into_fields()?;
///         Some(Db {
///             port: take_field(&mut fields, "port")?,
///             uri: take_field(&mut fields, "uri")?,
///         })
///     }
/// }
/// ```
pub trait ConfigType: Sized {
    fn type_descriptor() -> TypeDescriptor;

    fn from_value(value: Value) -> Option<Self>;
}

/// Remove and convert one field of a decoded object.
///
/// A field that was never decoded converts from [`Value::Null`], so
/// `Option` fields become `None`.
pub fn take_field<T: ConfigType>(fields: &mut BTreeMap<String, Value>, name: &str) -> Option<T> {
    T::from_value(fields.remove(name).unwrap_or(Value::Null))
}

macro_rules! integer_config_type {
    ($($ty:ty => $kind:ident),*) => {$(
        impl ConfigType for $ty {
            fn type_descriptor() -> TypeDescriptor {
                TypeDescriptor::Integer(IntKind::$kind)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Int(v) => <$ty>::try_from(v).ok(),
                    Value::UInt(v) => <$ty>::try_from(v).ok(),
                    _ => None,
                }
            }
        }
    )*};
}

integer_config_type!(i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
integer_config_type!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);

impl ConfigType for f64 {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Float(FloatKind::F64)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl ConfigType for f32 {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Float(FloatKind::F32)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v as f32),
            _ => None,
        }
    }
}

impl ConfigType for bool {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Bool
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl ConfigType for char {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Char
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Char(v) => Some(v),
            _ => None,
        }
    }
}

impl ConfigType for String {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::String
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(v) | Value::Enum(v) => Some(v),
            _ => None,
        }
    }
}

impl ConfigType for Uuid {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Uuid
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Uuid(v) => Some(v),
            _ => None,
        }
    }
}

impl ConfigType for Duration {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Duration
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Duration(v) => Some(v),
            _ => None,
        }
    }
}

impl ConfigType for DateTime<FixedOffset> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::DateTime
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::DateTime(v) => Some(v),
            _ => None,
        }
    }
}

impl ConfigType for DateTime<Utc> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::DateTime
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::DateTime(v) => Some(v.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl ConfigType for NaiveDate {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Date
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Date(v) => Some(v),
            _ => None,
        }
    }
}

impl ConfigType for NaiveDateTime {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::LocalDateTime
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::LocalDateTime(v) => Some(v),
            _ => None,
        }
    }
}

impl ConfigType for ConfigNode {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Node
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl<T: ConfigType> ConfigType for Option<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::optional(T::type_descriptor())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Elements of a decoded list. Null slots from sparse arrays are skipped
/// unless the element type accepts them.
fn list_items<T: ConfigType>(value: Value) -> Option<Vec<T>> {
    let Value::List(items) = value else {
        return None;
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let was_null = item.is_null();
        match T::from_value(item) {
            Some(v) => out.push(v),
            None if was_null => {}
            None => return None,
        }
    }
    Some(out)
}

fn map_entries<T: ConfigType>(value: Value) -> Option<Vec<(String, T)>> {
    let Value::Map(entries) = value else {
        return None;
    };
    entries
        .into_iter()
        .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
        .collect()
}

impl<T: ConfigType> ConfigType for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::list(T::type_descriptor())
    }

    fn from_value(value: Value) -> Option<Self> {
        list_items(value)
    }
}

impl<T: ConfigType + Eq + Hash> ConfigType for HashSet<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::set(T::type_descriptor())
    }

    fn from_value(value: Value) -> Option<Self> {
        list_items(value).map(|items| items.into_iter().collect())
    }
}

impl<T: ConfigType + Ord> ConfigType for BTreeSet<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::set(T::type_descriptor())
    }

    fn from_value(value: Value) -> Option<Self> {
        list_items(value).map(|items| items.into_iter().collect())
    }
}

impl<T: ConfigType> ConfigType for HashMap<String, T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::map(T::type_descriptor())
    }

    fn from_value(value: Value) -> Option<Self> {
        map_entries(value).map(|entries| entries.into_iter().collect())
    }
}

impl<T: ConfigType> ConfigType for BTreeMap<String, T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::map(T::type_descriptor())
    }

    fn from_value(value: Value) -> Option<Self> {
        map_entries(value).map(|entries| entries.into_iter().collect())
    }
}
