//! Type vocabulary shared by parameters, definitions and the type catalog
//!
//! - [`PrimitiveKind`]: the fixed set of kinds that can be built from a literal
//! - [`TypeRef`]: a normalized type identifier
//! - [`Value`]: a resolved parameter, either a coerced literal or a component instance
//! - [`FromValue`]: conversion from a [`Value`] into a concrete Rust type

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::container::catalog::Component;

/// A built component, shared between the store and every component that references it
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Fixed calendar format for date literals
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Kinds that may be constructed directly from a textual literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Text,
    Integer,
    Long,
    Double,
    Date,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 5] = [
        Self::Text,
        Self::Integer,
        Self::Long,
        Self::Double,
        Self::Date,
    ];

    /// Map a type name (canonical or alias) to a primitive kind
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "String" | "string" | "text" | "str" => Some(Self::Text),
            "i32" | "int" | "integer" => Some(Self::Integer),
            "i64" | "long" => Some(Self::Long),
            "f64" | "double" | "float" => Some(Self::Double),
            "NaiveDate" | "date" => Some(Self::Date),
            _ => None,
        }
    }

    /// Canonical type name of this kind
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "String",
            Self::Integer => "i32",
            Self::Long => "i64",
            Self::Double => "f64",
            Self::Date => "NaiveDate",
        }
    }

    /// Coerce a literal into a value of this kind
    ///
    /// Returns the parser's message on failure; the caller wraps it with the
    /// parameter context.
    pub fn parse(&self, literal: &str) -> Result<Value, String> {
        match self {
            Self::Text => Ok(Value::Text(literal.to_string())),
            Self::Integer => literal
                .trim()
                .parse()
                .map(Value::Integer)
                .map_err(|e| e.to_string()),
            Self::Long => literal
                .trim()
                .parse()
                .map(Value::Long)
                .map_err(|e| e.to_string()),
            Self::Double => literal
                .trim()
                .parse()
                .map(Value::Double)
                .map_err(|e| e.to_string()),
            Self::Date => NaiveDate::parse_from_str(literal.trim(), DATE_FORMAT)
                .map(Value::Date)
                .map_err(|e| format!("{} (expected {})", e, DATE_FORMAT)),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A type identifier
///
/// Primitive aliases are normalized to their canonical name, so `"double"` and
/// `"f64"` compare equal. Component types are identified by the name they were
/// registered under in the type catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        match PrimitiveKind::from_type_name(name.trim()) {
            Some(kind) => Self(kind.type_name().to_string()),
            None => Self(name.trim().to_string()),
        }
    }

    /// The type reference a Rust type converts from
    pub fn of<T: FromValue>() -> Self {
        T::type_ref()
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn primitive(&self) -> Option<PrimitiveKind> {
        PrimitiveKind::from_type_name(&self.0)
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive().is_some()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        Self(kind.type_name().to_string())
    }
}

/// A resolved parameter value
#[derive(Clone)]
pub enum Value {
    Text(String),
    Integer(i32),
    Long(i64),
    Double(f64),
    Date(NaiveDate),
    Component(Instance),
}

impl Value {
    /// Short description of the variant, used in conversion errors
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Long(_) => "long integer",
            Self::Double(_) => "floating-point",
            Self::Date(_) => "date",
            Self::Component(_) => "component instance",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Self::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            Self::Long(v) => f.debug_tuple("Long").field(v).finish(),
            Self::Double(v) => f.debug_tuple("Double").field(v).finish(),
            Self::Date(v) => f.debug_tuple("Date").field(v).finish(),
            Self::Component(_) => f.write_str("Component(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Component(a), Self::Component(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Conversion from a resolved [`Value`] into a constructor argument or field value
///
/// Implemented for the primitive kinds, for `Arc<T>` of any registered
/// [`Component`], and for `Option<T>` of any of those. On mismatch the value is
/// handed back so the caller can report what it received.
pub trait FromValue: Sized {
    /// The declared type a parameter must carry to feed this type
    fn type_ref() -> TypeRef;

    fn from_value(value: Value) -> Result<Self, Value>;
}

/// Primitive values may also arrive as stored instances (a reference to a
/// component that is itself a bare primitive).
fn downcast_primitive<T: Any + Clone>(value: Value) -> Result<T, Value> {
    match value {
        Value::Component(instance) => match instance.downcast_ref::<T>() {
            Some(v) => Ok(v.clone()),
            None => Err(Value::Component(instance)),
        },
        other => Err(other),
    }
}

macro_rules! primitive_from_value {
    ($ty:ty, $kind:expr, $variant:ident) => {
        impl FromValue for $ty {
            fn type_ref() -> TypeRef {
                TypeRef::from($kind)
            }

            fn from_value(value: Value) -> Result<Self, Value> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => downcast_primitive::<$ty>(other),
                }
            }
        }
    };
}

primitive_from_value!(String, PrimitiveKind::Text, Text);
primitive_from_value!(i32, PrimitiveKind::Integer, Integer);
primitive_from_value!(i64, PrimitiveKind::Long, Long);
primitive_from_value!(f64, PrimitiveKind::Double, Double);
primitive_from_value!(NaiveDate, PrimitiveKind::Date, Date);

impl<T: Component> FromValue for Arc<T> {
    fn type_ref() -> TypeRef {
        TypeRef::new(T::TYPE_NAME)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Component(instance) => instance.downcast::<T>().map_err(Value::Component),
            other => Err(other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        T::from_value(value).map(Some)
    }
}
