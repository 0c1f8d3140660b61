pub mod dialect;
pub use dialect::{BindMarkers, Dialect, Escaper, LockMode};

pub mod ddl;

pub mod generator;
pub use generator::{SqlGenerator, SqlGeneratorSource};

pub mod query;
pub use query::{Criteria, ParametrizedQuery, Query, QueryMapper, Sort};

pub mod serializer;
pub use serializer::Serializer;

mod sql;
pub use sql::{BoundSql, ParameterSource, Sql};

pub mod stmt;
pub use stmt::Statement;
