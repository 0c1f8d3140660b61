//! Database-level schema derived from the mapping.

mod table;
pub use table::{Column, ForeignKey, Table};

mod tables;
pub use tables::Tables;

mod ty;
pub use ty::{DefaultSqlTypeMapping, SqlTypeMapping};
