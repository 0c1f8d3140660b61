use std::fmt;

/// The type of a column value, as seen by the mapping layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Bytes,
    F64,
    I32,
    I64,
    String,
    Uuid,

    /// Array of scalars stored in a single column
    Array(Box<ValueType>),
}

impl ValueType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::I32 | Self::I64 | Self::F64)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::I32 | Self::I64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::F64 => "f64",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::String => "String",
            Self::Uuid => "Uuid",
            Self::Array(_) => "array",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(item) => write!(f, "[{item}]"),
            ty => f.write_str(ty.name()),
        }
    }
}
