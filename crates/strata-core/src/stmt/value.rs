use super::ValueType;
use crate::{Error, Result};

use std::fmt;
use uuid::Uuid;

/// A scalar (or array of scalars) bound to, or read from, a single column.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// 64-bit floating point
    F64(f64),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// Homogeneous list, bound as an array column or expanded into one bind
    /// marker per element
    List(Vec<Value>),

    /// Null value
    #[default]
    Null,

    /// String value
    String(String),

    /// UUID value
    Uuid(Uuid),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Bytes(_) => "Bytes",
            Self::F64(_) => "F64",
            Self::I32(_) => "I32",
            Self::I64(_) => "I64",
            Self::List(_) => "List",
            Self::Null => "Null",
            Self::String(_) => "String",
            Self::Uuid(_) => "Uuid",
        }
    }

    /// The type of the value. `Null` and empty lists carry no type.
    pub fn ty(&self) -> Option<ValueType> {
        Some(match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Bytes(_) => ValueType::Bytes,
            Self::F64(_) => ValueType::F64,
            Self::I32(_) => ValueType::I32,
            Self::I64(_) => ValueType::I64,
            Self::List(items) => ValueType::Array(Box::new(items.first()?.ty()?)),
            Self::Null => return None,
            Self::String(_) => ValueType::String,
            Self::Uuid(_) => ValueType::Uuid,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(v) => Ok(*v),
            _ => Err(Error::type_conversion(self.clone(), "bool")),
        }
    }

    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Self::I32(v) => Ok(i64::from(*v)),
            Self::I64(v) => Ok(*v),
            _ => Err(Error::type_conversion(self.clone(), "i64")),
        }
    }

    pub fn to_i32(&self) -> Result<i32> {
        match self {
            Self::I32(v) => Ok(*v),
            Self::I64(v) => i32::try_from(*v).map_err(|_| Error::type_conversion(self.clone(), "i32")),
            _ => Err(Error::type_conversion(self.clone(), "i32")),
        }
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Self::F64(v) => Ok(*v),
            _ => Err(Error::type_conversion(self.clone(), "f64")),
        }
    }

    pub fn to_uuid(&self) -> Result<Uuid> {
        match self {
            Self::Uuid(v) => Ok(*v),
            Self::String(v) => Ok(Uuid::parse_str(v)?),
            _ => Err(Error::type_conversion(self.clone(), "Uuid")),
        }
    }

    pub fn into_string(self) -> Result<String> {
        match self {
            Self::String(v) => Ok(v),
            other => Err(Error::type_conversion(other, "String")),
        }
    }

    pub fn into_option_string(self) -> Result<Option<String>> {
        match self {
            Self::Null => Ok(None),
            other => other.into_string().map(Some),
        }
    }

    /// Converts the value to the column type `ty`, widening or narrowing
    /// integers as needed. Drivers frequently report integer columns with a
    /// wider type than the mapped property.
    pub fn cast(self, ty: &ValueType) -> Result<Value> {
        Ok(match (self, ty) {
            (Self::Null, _) => Self::Null,
            (value @ Self::I32(_), ValueType::I64) => Self::I64(value.to_i64()?),
            (value @ Self::I64(_), ValueType::I32) => Self::I32(value.to_i32()?),
            (Self::I32(v), ValueType::F64) => Self::F64(f64::from(v)),
            (Self::String(v), ValueType::Uuid) => Self::Uuid(Uuid::parse_str(&v)?),
            (Self::List(items), ValueType::Array(item_ty)) => Self::List(
                items
                    .into_iter()
                    .map(|item| item.cast(item_ty))
                    .collect::<Result<_>>()?,
            ),
            (value, ty) if value.ty().as_ref() == Some(ty) => value,
            (value, _) => return Err(Error::type_conversion(value, ty.name())),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => v.fmt(f),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Self::F64(v) => v.fmt(f),
            Self::I32(v) => v.fmt(f),
            Self::I64(v) => v.fmt(f),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str("]")
            }
            Self::Null => f.write_str("NULL"),
            Self::String(v) => v.fmt(f),
            Self::Uuid(v) => v.fmt(f),
        }
    }
}

macro_rules! impl_from {
    ( $( $t:ty => $variant:ident ),+ $(,)? ) => {
        $(
            impl From<$t> for Value {
                fn from(src: $t) -> Self {
                    Self::$variant(src)
                }
            }
        )+
    };
}

impl_from! {
    bool => Bool,
    Vec<u8> => Bytes,
    f64 => F64,
    i32 => I32,
    i64 => I64,
    String => String,
    Uuid => Uuid,
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Self {
        Self::String(src.clone())
    }
}

impl From<Vec<Value>> for Value {
    fn from(src: Vec<Value>) -> Self {
        Self::List(src)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Self {
        src.map(Into::into).unwrap_or(Self::Null)
    }
}
