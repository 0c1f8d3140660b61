#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited};

mod ident;
use ident::Ident;

// Fragment serializers
mod expr;
mod statement;
mod value;

use crate::{Dialect, Sql, Statement};

/// Serialize a statement to an [`Sql`] template.
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    /// The dialect handles quoting, paging and locking differences between
    /// databases. Bind markers are left named until the template is bound.
    dialect: Dialect,
}

struct Formatter<'a> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut Sql,
}

impl Serializer {
    pub fn new(dialect: Dialect) -> Serializer {
        Serializer { dialect }
    }

    pub fn postgresql() -> Serializer {
        Serializer::new(Dialect::postgres())
    }

    pub fn mysql() -> Serializer {
        Serializer::new(Dialect::mysql())
    }

    pub fn sqlite() -> Serializer {
        Serializer::new(Dialect::sqlite())
    }

    pub fn h2() -> Serializer {
        Serializer::new(Dialect::h2())
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn serialize(&self, stmt: &Statement) -> Sql {
        let mut ret = Sql::default();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
        };

        stmt.to_sql(&mut fmt);
        ret
    }

    /// Serializes a bare expression, e.g. to inspect a mapped condition.
    pub fn serialize_expr(&self, expr: &crate::stmt::Expr) -> Sql {
        let mut ret = Sql::default();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
        };

        expr.to_sql(&mut fmt);
        ret
    }
}
