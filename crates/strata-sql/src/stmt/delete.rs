use super::{Expr, Statement};

use strata_core::schema::SqlIdentifier;

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: SqlIdentifier,
    pub filter: Option<Expr>,
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Self::Delete(value)
    }
}
