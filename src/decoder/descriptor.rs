//! Type descriptors: what a lookup should decode into.
//!
//! Each target type describes itself with a [`TypeDescriptor`]; decoders are
//! selected by matching on it. Objects carry a field table so the object
//! decoder can resolve and decode each field without reflection.

use std::fmt;

/// Integer widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl IntKind {
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntKind::I8 | IntKind::I16 | IntKind::I32 | IntKind::I64 | IntKind::Isize
        )
    }

    /// Inclusive range of the type.
    pub fn bounds(self) -> (i128, i128) {
        match self {
            IntKind::I8 => (i8::MIN as i128, i8::MAX as i128),
            IntKind::I16 => (i16::MIN as i128, i16::MAX as i128),
            IntKind::I32 => (i32::MIN as i128, i32::MAX as i128),
            IntKind::I64 => (i64::MIN as i128, i64::MAX as i128),
            IntKind::Isize => (isize::MIN as i128, isize::MAX as i128),
            IntKind::U8 => (0, u8::MAX as i128),
            IntKind::U16 => (0, u16::MAX as i128),
            IntKind::U32 => (0, u32::MAX as i128),
            IntKind::U64 => (0, u64::MAX as i128),
            IntKind::Usize => (0, usize::MAX as i128),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "i8",
            IntKind::I16 => "i16",
            IntKind::I32 => "i32",
            IntKind::I64 => "i64",
            IntKind::Isize => "isize",
            IntKind::U8 => "u8",
            IntKind::U16 => "u16",
            IntKind::U32 => "u32",
            IntKind::U64 => "u64",
            IntKind::Usize => "usize",
        }
    }
}

/// Floating point widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32,
    F64,
}

/// Shape of a decode target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Bool,
    Integer(IntKind),
    Float(FloatKind),
    Char,
    String,
    Uuid,
    Duration,
    /// Date-time with offset.
    DateTime,
    Date,
    /// Date-time without offset.
    LocalDateTime,
    Enum { name: String, variants: Vec<String> },
    List(Box<TypeDescriptor>),
    Set(Box<TypeDescriptor>),
    /// String-keyed map.
    Map(Box<TypeDescriptor>),
    Optional(Box<TypeDescriptor>),
    Object(ObjectDescriptor),
    /// The raw node, undecoded.
    Node,
}

impl TypeDescriptor {
    pub fn list(inner: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(inner))
    }

    pub fn set(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Set(Box::new(inner))
    }

    pub fn map(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(inner))
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(inner))
    }

    pub fn enumeration(name: impl Into<String>, variants: &[&str]) -> Self {
        TypeDescriptor::Enum {
            name: name.into(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeDescriptor::Optional(_))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Bool => write!(f, "bool"),
            TypeDescriptor::Integer(kind) => write!(f, "{}", kind.name()),
            TypeDescriptor::Float(FloatKind::F32) => write!(f, "f32"),
            TypeDescriptor::Float(FloatKind::F64) => write!(f, "f64"),
            TypeDescriptor::Char => write!(f, "char"),
            TypeDescriptor::String => write!(f, "String"),
            TypeDescriptor::Uuid => write!(f, "Uuid"),
            TypeDescriptor::Duration => write!(f, "Duration"),
            TypeDescriptor::DateTime => write!(f, "DateTime"),
            TypeDescriptor::Date => write!(f, "NaiveDate"),
            TypeDescriptor::LocalDateTime => write!(f, "NaiveDateTime"),
            TypeDescriptor::Enum { name, .. } => write!(f, "{}", name),
            TypeDescriptor::List(inner) => write!(f, "Vec<{}>", inner),
            TypeDescriptor::Set(inner) => write!(f, "Set<{}>", inner),
            TypeDescriptor::Map(inner) => write!(f, "Map<String, {}>", inner),
            TypeDescriptor::Optional(inner) => write!(f, "Option<{}>", inner),
            TypeDescriptor::Object(object) => write!(f, "{}", object.name),
            TypeDescriptor::Node => write!(f, "ConfigNode"),
        }
    }
}

/// Field table of an object type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl ObjectDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            ty,
            default: None,
        });
        self
    }

    /// A field decoded from `default` when the tree has no value for it.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        default: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            ty,
            default: Some(default.into()),
        });
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::Object(self)
    }
}

/// One field of an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Raw text decoded when the field is missing.
    pub default: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ty = TypeDescriptor::map(TypeDescriptor::list(TypeDescriptor::optional(
            TypeDescriptor::Integer(IntKind::U16),
        )));
        assert_eq!(ty.to_string(), "Map<String, Vec<Option<u16>>>");
    }

    #[test]
    fn test_bounds() {
        assert_eq!(IntKind::U8.bounds(), (0, 255));
        assert_eq!(IntKind::I16.bounds(), (-32768, 32767));
        assert!(IntKind::Isize.is_signed());
        assert!(!IntKind::Usize.is_signed());
    }

    #[test]
    fn test_object_builder() {
        let ty = ObjectDescriptor::new("Db")
            .field("port", TypeDescriptor::Integer(IntKind::U16))
            .field_with_default("host", TypeDescriptor::String, "localhost")
            .build();
        let TypeDescriptor::Object(object) = ty else {
            panic!("expected object");
        };
        assert_eq!(object.fields.len(), 2);
        assert_eq!(object.fields[1].default.as_deref(), Some("localhost"));
    }
}
