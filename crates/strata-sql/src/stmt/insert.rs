use super::{Expr, Statement};

use strata_core::schema::SqlIdentifier;

/// A single-row insert. No columns renders the dialect's empty insert.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: SqlIdentifier,
    pub columns: Vec<SqlIdentifier>,
    pub values: Vec<Expr>,
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}
