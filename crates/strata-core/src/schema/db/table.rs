use crate::schema::SqlIdentifier;

/// A database table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Name of the table, including the schema when one applies
    pub name: SqlIdentifier,

    /// The table's columns
    pub columns: Vec<Column>,

    /// Primary key columns; empty when the table has no key
    pub primary_key: Vec<SqlIdentifier>,

    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// The name of the column in the database.
    pub name: SqlIdentifier,

    /// The SQL column type
    pub ty: String,

    /// Whether or not the column is nullable
    pub nullable: bool,

    /// True if the column holds the entity's id
    pub identity: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,

    /// Referencing table
    pub table: SqlIdentifier,

    pub columns: Vec<SqlIdentifier>,

    pub referenced_table: SqlIdentifier,

    pub referenced_columns: Vec<SqlIdentifier>,
}

impl Table {
    pub(super) fn new(name: SqlIdentifier) -> Self {
        Self {
            name,
            columns: vec![],
            primary_key: vec![],
            foreign_keys: vec![],
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.reference() == name)
    }

    /// Adds `column` unless a column with that name already exists.
    pub(super) fn add_column(&mut self, column: Column) {
        if !self.columns.iter().any(|c| c.name == column.name) {
            self.columns.push(column);
        }
    }

    pub(super) fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        if !self.foreign_keys.contains(&foreign_key) {
            self.foreign_keys.push(foreign_key);
        }
    }
}
