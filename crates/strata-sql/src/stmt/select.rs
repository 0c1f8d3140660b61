use super::{Expr, Statement};
use crate::LockMode;

use strata_core::schema::SqlIdentifier;

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub columns: Vec<Expr>,

    pub from: TableRef,

    /// Rendered as `LEFT OUTER JOIN`
    pub joins: Vec<Join>,

    pub filter: Option<Expr>,

    pub order_by: Vec<OrderBy>,

    pub limit: Option<u64>,

    pub offset: Option<u64>,

    pub lock: Option<LockMode>,
}

/// A table in a FROM or JOIN clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: SqlIdentifier,
    pub alias: Option<SqlIdentifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: TableRef,
    pub on: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Expr,
    pub direction: Direction,
    pub nulls: NullOrdering,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NullOrdering {
    /// Whatever the database does
    #[default]
    Native,
    First,
    Last,
}

impl Select {
    pub fn new(columns: Vec<Expr>, from: TableRef) -> Select {
        Select {
            columns,
            from,
            joins: vec![],
            filter: None,
            order_by: vec![],
            limit: None,
            offset: None,
            lock: None,
        }
    }

    /// ANDs `condition` onto the WHERE clause.
    pub fn and_where(&mut self, condition: Expr) {
        self.filter = Some(match self.filter.take() {
            Some(existing) => Expr::and([existing, condition]),
            None => condition,
        });
    }
}

impl TableRef {
    pub fn new(name: &SqlIdentifier) -> TableRef {
        TableRef {
            name: name.clone(),
            alias: None,
        }
    }

    pub fn aliased(name: &SqlIdentifier, alias: Option<&SqlIdentifier>) -> TableRef {
        TableRef {
            name: name.clone(),
            alias: alias.cloned(),
        }
    }

    /// The name columns of this table are qualified with.
    pub fn reference(&self) -> &SqlIdentifier {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

impl OrderBy {
    pub fn asc(expr: Expr) -> OrderBy {
        OrderBy {
            expr,
            direction: Direction::Asc,
            nulls: NullOrdering::Native,
        }
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Self::Select(value)
    }
}
