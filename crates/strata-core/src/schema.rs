pub mod app;

pub mod db;

mod ident;
pub use ident::{IdentifierProcessing, LetterCasing, Quoting, SqlIdentifier};

pub mod mapping;
pub use mapping::{MappingContext, PersistentEntity, PersistentProperty};

mod naming;
pub use naming::{DefaultNamingStrategy, ForeignKeyNaming, NamingStrategy};

pub mod path;
pub use path::{AggregatePath, ColumnInfo, TableInfo};
