use super::Statement;

use strata_core::schema::db::{Column, ForeignKey, Table};
use strata_core::schema::SqlIdentifier;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    /// Name of the table
    pub name: SqlIdentifier,

    /// Column definitions
    pub columns: Vec<ColumnDef>,

    /// Primary key clause; omitted when empty
    pub primary_key: Vec<SqlIdentifier>,

    pub foreign_keys: Vec<ForeignKeyDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: SqlIdentifier,
    pub ty: String,
    pub nullable: bool,
}

/// `CONSTRAINT name FOREIGN KEY (columns) REFERENCES table (columns)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub name: String,
    pub columns: Vec<SqlIdentifier>,
    pub referenced_table: SqlIdentifier,
    pub referenced_columns: Vec<SqlIdentifier>,
}

impl Statement {
    pub fn create_table(table: &Table) -> Self {
        CreateTable {
            name: table.name.clone(),
            columns: table.columns.iter().map(ColumnDef::from_schema).collect(),
            primary_key: table.primary_key.clone(),
            foreign_keys: table
                .foreign_keys
                .iter()
                .map(ForeignKeyDef::from_schema)
                .collect(),
        }
        .into()
    }
}

impl ColumnDef {
    pub(crate) fn from_schema(column: &Column) -> ColumnDef {
        ColumnDef {
            name: column.name.clone(),
            ty: column.ty.clone(),
            nullable: column.nullable,
        }
    }
}

impl ForeignKeyDef {
    pub(crate) fn from_schema(foreign_key: &ForeignKey) -> ForeignKeyDef {
        ForeignKeyDef {
            name: foreign_key.name.clone(),
            columns: foreign_key.columns.clone(),
            referenced_table: foreign_key.referenced_table.clone(),
            referenced_columns: foreign_key.referenced_columns.clone(),
        }
    }
}

impl From<CreateTable> for Statement {
    fn from(value: CreateTable) -> Self {
        Self::CreateTable(value)
    }
}
