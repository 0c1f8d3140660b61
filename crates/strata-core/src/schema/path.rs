//! Addressing properties of an aggregate from its root.
//!
//! An [`AggregatePath`] names a property reachable from an aggregate root and
//! answers every structural question the statement generator and the row
//! reader ask about it: which table it lives in, what its columns and aliases
//! are, how a child table refers back to its parent.

mod aggregate_path;
pub use aggregate_path::AggregatePath;
pub(crate) use aggregate_path::PathKey;

mod find;

mod table_info;
pub use table_info::{BackReference, BackReferenceSource, ColumnInfo, TableInfo};
