pub mod driver;
pub use driver::{Driver, ExecKind, Response};

mod entity;
pub use entity::Entity;

pub mod read;
pub use read::{AsyncRelationResolver, EntityReader, ReadScope, RelationResolver};

pub mod template;
pub use template::AggregateTemplate;

pub use strata_core::{
    schema::{AggregatePath, MappingContext},
    stmt::{Identifier, Object, Record, RowDocument, Value},
    Error, Result,
};
pub use strata_sql::{BoundSql, Criteria, Dialect, Query, Sort};

