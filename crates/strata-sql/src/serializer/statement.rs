use super::{Comma, Formatter, Ident, ToSql};

use crate::stmt::{self, Direction, NullOrdering};
use crate::Statement;

impl ToSql for &Statement {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            Statement::CreateTable(stmt) => stmt.to_sql(f),
            Statement::Delete(stmt) => stmt.to_sql(f),
            Statement::DropTable(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Select(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let columns = Comma(&self.columns);
        let from = &self.from;
        fmt!(f, "SELECT " columns " FROM " from);

        for stmt::Join { table, on } in &self.joins {
            fmt!(f, " LEFT OUTER JOIN " table " ON " on);
        }

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&self.order_by));
        }

        let dialect = f.serializer.dialect;

        if let Some(limit) = dialect.limit_clause(self.limit, self.offset) {
            fmt!(f, " " limit.as_str());
        }

        if let Some(lock) = self.lock.and_then(|mode| dialect.lock_clause(mode)) {
            fmt!(f, " " lock);
        }
    }
}

impl ToSql for &Box<stmt::Select> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, self.as_ref());
    }
}

impl ToSql for &stmt::TableRef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Ident(&self.name));
        if let Some(alias) = &self.alias {
            fmt!(f, " " Ident(alias));
        }
    }
}

impl ToSql for &stmt::OrderBy {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let direction = match self.direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        };
        fmt!(f, &self.expr direction);

        if f.serializer.dialect.supports_null_ordering() {
            match self.nulls {
                NullOrdering::Native => {}
                NullOrdering::First => fmt!(f, " NULLS FIRST"),
                NullOrdering::Last => fmt!(f, " NULLS LAST"),
            }
        }
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, "INSERT INTO " Ident(&self.table));

        if self.columns.is_empty() {
            let empty = f.serializer.dialect.empty_insert();
            fmt!(f, " " empty);
            return;
        }

        let columns = Comma(self.columns.iter().map(Ident));
        let values = Comma(&self.values);
        fmt!(f, " (" columns ") VALUES (" values ")");
    }
}

impl ToSql for &stmt::Update {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let assignments = Comma(&self.assignments);
        fmt!(f, "UPDATE " Ident(&self.table) " SET " assignments);

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}

impl ToSql for &stmt::Assignment {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let value = &self.value;
        fmt!(f, Ident(&self.column) " = " value);
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, "DELETE FROM " Ident(&self.table));

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}

impl ToSql for &stmt::CreateTable {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, "CREATE TABLE " Ident(&self.name) " (");

        let mut s = "\n    ";
        for column in &self.columns {
            fmt!(f, s column);
            s = ",\n    ";
        }

        if !self.primary_key.is_empty() {
            let pk = Comma(self.primary_key.iter().map(Ident));
            fmt!(f, s "PRIMARY KEY (" pk ")");
        }

        for foreign_key in &self.foreign_keys {
            fmt!(f, s foreign_key);
        }

        fmt!(f, "\n)");
    }
}

impl ToSql for &stmt::ColumnDef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let not_null = if self.nullable { "" } else { " NOT NULL" };
        let ty = &self.ty;
        fmt!(f, Ident(&self.name) " " ty not_null);
    }
}

impl ToSql for &stmt::ForeignKeyDef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let columns = Comma(self.columns.iter().map(Ident));
        let referenced = Comma(self.referenced_columns.iter().map(Ident));
        let name = &self.name;
        fmt!(
            f, "CONSTRAINT " name " FOREIGN KEY (" columns ") REFERENCES "
            Ident(&self.referenced_table) " (" referenced ")"
        );
    }
}

impl ToSql for &stmt::DropTable {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let if_exists = if self.if_exists { "IF EXISTS " } else { "" };
        fmt!(f, "DROP TABLE " if_exists Ident(&self.name));
    }
}
