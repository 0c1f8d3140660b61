use super::{Comma, Delimited, Formatter, Ident, ToSql};

use crate::stmt::{self, BinaryOp};

impl ToSql for &stmt::Expr {
    fn to_sql(self, f: &mut Formatter<'_>) {
        use stmt::Expr::*;

        match self {
            Column(column) => fmt!(f, column),
            Aliased(expr, alias) => fmt!(f, expr " AS " Ident(alias)),
            BindMarker(name) => f.dst.push_param(name),
            Literal(value) => fmt!(f, value),
            Binary(lhs, op, rhs) => fmt!(f, lhs " " op " " rhs),
            And(operands) => fmt!(f, Delimited(operands.iter().map(AndOperand), " AND ")),
            Or(operands) => fmt!(f, Delimited(operands, " OR ")),
            Not(expr) => fmt!(f, "NOT " expr),
            Nested(expr) => fmt!(f, "(" expr ")"),
            Tuple(items) => fmt!(f, "(" Comma(items) ")"),
            InList { expr, list, negate } => {
                let not = if *negate { " NOT" } else { "" };
                fmt!(f, expr not " IN (" Comma(list) ")");
            }
            InSubquery {
                expr,
                query,
                negate,
            } => {
                let not = if *negate { " NOT" } else { "" };
                fmt!(f, expr not " IN (" query ")");
            }
            Between {
                expr,
                low,
                high,
                negate,
            } => {
                let not = if *negate { " NOT" } else { "" };
                fmt!(f, expr not " BETWEEN " low " AND " high);
            }
            IsNull { expr, negate } => {
                let check = if *negate { " IS NOT NULL" } else { " IS NULL" };
                fmt!(f, expr check);
            }
            Like {
                expr,
                pattern,
                negate,
                escape,
            } => {
                let not = if *negate { " NOT" } else { "" };
                fmt!(f, expr not " LIKE " pattern);
                if let Some(escape) = escape {
                    let escape = escape.to_string().replace('\'', "''");
                    fmt!(f, " ESCAPE '" escape.as_str() "'");
                }
            }
            Upper(expr) => fmt!(f, "UPPER(" expr ")"),
            Count(expr) => fmt!(f, "COUNT(" expr ")"),
            Asterisk => fmt!(f, "*"),
            IsTrue(expr) => fmt!(f, expr " = TRUE"),
            IsFalse(expr) => fmt!(f, expr " = FALSE"),
        }
    }
}

impl ToSql for &Box<stmt::Expr> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, self.as_ref());
    }
}

/// An AND operand; ORs are parenthesized to keep their grouping.
struct AndOperand<'a>(&'a stmt::Expr);

impl ToSql for AndOperand<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self.0 {
            stmt::Expr::Or(_) => fmt!(f, "(" self.0 ")"),
            expr => fmt!(f, expr),
        }
    }
}

impl ToSql for &stmt::ColumnRef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if let Some(table) = &self.table {
            fmt!(f, Ident(table) ".");
        }
        fmt!(f, Ident(&self.name));
    }
}

impl ToSql for &BinaryOp {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let op = match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        };
        fmt!(f, op);
    }
}
