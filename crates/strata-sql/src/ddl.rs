//! Schema statements for the tables derived from a mapping.

use crate::{Serializer, Sql, Statement};

use strata_core::schema::db::Tables;

/// `CREATE TABLE` statements, referenced tables first.
pub fn create_tables(tables: &Tables) -> Vec<Statement> {
    tables.iter().map(Statement::create_table).collect()
}

/// `DROP TABLE` statements in reverse creation order.
pub fn drop_tables(tables: &Tables, if_exists: bool) -> Vec<Statement> {
    tables
        .iter()
        .rev()
        .map(|table| {
            if if_exists {
                Statement::drop_table_if_exists(table)
            } else {
                Statement::drop_table(table)
            }
        })
        .collect()
}

/// Renders `statements` with `serializer`.
pub fn render(serializer: &Serializer, statements: &[Statement]) -> Vec<Sql> {
    statements
        .iter()
        .map(|stmt| serializer.serialize(stmt))
        .collect()
}
