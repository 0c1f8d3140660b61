use crate::stmt::ValueType;

/// Maps property types to SQL column types for schema generation.
pub trait SqlTypeMapping {
    fn column_type(&self, ty: &ValueType) -> String;
}

/// A conservative mapping most databases accept.
///
/// ```text
/// Bool    →  BOOLEAN
/// Bytes   →  VARBINARY
/// F64     →  FLOAT
/// I32     →  INT
/// I64     →  BIGINT
/// String  →  VARCHAR(255)
/// Uuid    →  UUID
/// [T]     →  T ARRAY
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSqlTypeMapping;

impl SqlTypeMapping for DefaultSqlTypeMapping {
    fn column_type(&self, ty: &ValueType) -> String {
        match ty {
            ValueType::Bool => "BOOLEAN".to_string(),
            ValueType::Bytes => "VARBINARY".to_string(),
            ValueType::F64 => "FLOAT".to_string(),
            ValueType::I32 => "INT".to_string(),
            ValueType::I64 => "BIGINT".to_string(),
            ValueType::String => "VARCHAR(255)".to_string(),
            ValueType::Uuid => "UUID".to_string(),
            ValueType::Array(item) => format!("{} ARRAY", self.column_type(item)),
        }
    }
}
