use super::Select;

use strata_core::schema::SqlIdentifier;
use strata_core::stmt::Value;

/// A column, optionally qualified by a table name or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<SqlIdentifier>,
    pub name: SqlIdentifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `table.column`
    Column(ColumnRef),

    /// `expr AS alias`, only meaningful in a select list
    Aliased(Box<Expr>, SqlIdentifier),

    /// A named parameter
    BindMarker(String),

    /// A value rendered inline
    Literal(Value),

    Binary(Box<Expr>, BinaryOp, Box<Expr>),

    And(Vec<Expr>),

    Or(Vec<Expr>),

    Not(Box<Expr>),

    /// Parenthesized expression
    Nested(Box<Expr>),

    /// Row value `(a, b)`
    Tuple(Vec<Expr>),

    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negate: bool,
    },

    InSubquery {
        expr: Box<Expr>,
        query: Box<Select>,
        negate: bool,
    },

    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negate: bool,
    },

    IsNull {
        expr: Box<Expr>,
        negate: bool,
    },

    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negate: bool,
        escape: Option<char>,
    },

    Upper(Box<Expr>),

    /// `COUNT(expr)`; `COUNT(*)` when given [`Expr::Asterisk`]
    Count(Box<Expr>),

    Asterisk,

    IsTrue(Box<Expr>),

    IsFalse(Box<Expr>),
}

impl ColumnRef {
    pub fn new(table: Option<SqlIdentifier>, name: SqlIdentifier) -> ColumnRef {
        ColumnRef { table, name }
    }
}

impl Expr {
    pub fn column(table: &SqlIdentifier, name: &SqlIdentifier) -> Expr {
        Expr::Column(ColumnRef::new(Some(table.clone()), name.clone()))
    }

    pub fn unqualified(name: &SqlIdentifier) -> Expr {
        Expr::Column(ColumnRef::new(None, name.clone()))
    }

    pub fn bind(name: impl Into<String>) -> Expr {
        Expr::BindMarker(name.into())
    }

    pub fn literal(value: impl Into<Value>) -> Expr {
        Expr::Literal(value.into())
    }

    pub fn count_all() -> Expr {
        Expr::Count(Box::new(Expr::Asterisk))
    }

    pub fn aliased(self, alias: &SqlIdentifier) -> Expr {
        Expr::Aliased(Box::new(self), alias.clone())
    }

    pub fn binary(self, op: BinaryOp, rhs: Expr) -> Expr {
        Expr::Binary(Box::new(self), op, Box::new(rhs))
    }

    pub fn equals(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn in_list(self, list: Vec<Expr>) -> Expr {
        Expr::InList {
            expr: Box::new(self),
            list,
            negate: false,
        }
    }

    pub fn in_subquery(self, query: Select) -> Expr {
        Expr::InSubquery {
            expr: Box::new(self),
            query: Box::new(query),
            negate: false,
        }
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negate: false,
        }
    }

    pub fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negate: true,
        }
    }

    pub fn upper(self) -> Expr {
        Expr::Upper(Box::new(self))
    }

    pub fn nested(self) -> Expr {
        Expr::Nested(Box::new(self))
    }

    /// A row value of `items`; a single item is returned as is.
    pub fn tuple(mut items: Vec<Expr>) -> Expr {
        match items.len() {
            1 => items.remove(0),
            _ => Expr::Tuple(items),
        }
    }

    /// ANDs `operands`, flattening nested ANDs. A single operand is returned
    /// as is.
    pub fn and(operands: impl IntoIterator<Item = Expr>) -> Expr {
        let mut flat = vec![];
        for operand in operands {
            match operand {
                Expr::And(inner) => flat.extend(inner),
                operand => flat.push(operand),
            }
        }
        match flat.len() {
            1 => flat.remove(0),
            _ => Expr::And(flat),
        }
    }

    /// ORs `operands`, flattening nested ORs.
    pub fn or(operands: impl IntoIterator<Item = Expr>) -> Expr {
        let mut flat = vec![];
        for operand in operands {
            match operand {
                Expr::Or(inner) => flat.extend(inner),
                operand => flat.push(operand),
            }
        }
        match flat.len() {
            1 => flat.remove(0),
            _ => Expr::Or(flat),
        }
    }
}
