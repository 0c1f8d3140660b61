use super::{Comma, Formatter, ToSql};

use std::fmt::Write;
use strata_core::stmt::Value;

/// Values rendered inline as SQL literals.
impl ToSql for &Value {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            Value::Bool(true) => fmt!(f, "TRUE"),
            Value::Bool(false) => fmt!(f, "FALSE"),
            Value::Bytes(bytes) => {
                let mut hex = String::with_capacity(bytes.len() * 2 + 3);
                hex.push_str("X'");
                for byte in bytes {
                    let _ = write!(hex, "{byte:02X}");
                }
                hex.push('\'');
                fmt!(f, hex.as_str());
            }
            Value::F64(v) => fmt!(f, v.to_string().as_str()),
            Value::I32(v) => fmt!(f, v.to_string().as_str()),
            Value::I64(v) => fmt!(f, v.to_string().as_str()),
            Value::List(items) => fmt!(f, "(" Comma(items) ")"),
            Value::Null => fmt!(f, "NULL"),
            Value::String(v) => {
                let escaped = v.replace('\'', "''");
                fmt!(f, "'" escaped.as_str() "'");
            }
            Value::Uuid(v) => {
                let rendered = v.to_string();
                fmt!(f, "'" rendered.as_str() "'");
            }
        }
    }
}
