//! The SQL statement tree rendered by the [`Serializer`](crate::Serializer).

mod create_table;
pub use create_table::{ColumnDef, CreateTable, ForeignKeyDef};

mod delete;
pub use delete::Delete;

mod drop_table;
pub use drop_table::DropTable;

mod expr;
pub use expr::{BinaryOp, ColumnRef, Expr};

mod insert;
pub use insert::Insert;

mod select;
pub use select::{Direction, Join, NullOrdering, OrderBy, Select, TableRef};

mod update;
pub use update::{Assignment, Update};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    Delete(Delete),
    DropTable(DropTable),
    Insert(Insert),
    Select(Select),
    Update(Update),
}

impl Statement {
    pub fn is_select(&self) -> bool {
        matches!(self, Statement::Select(_))
    }
}
