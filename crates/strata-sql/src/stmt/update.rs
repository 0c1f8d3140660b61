use super::{Expr, Statement};

use strata_core::schema::SqlIdentifier;

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: SqlIdentifier,
    pub assignments: Vec<Assignment>,
    pub filter: Option<Expr>,
}

/// `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: SqlIdentifier,
    pub value: Expr,
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Self::Update(value)
    }
}
