mod response;
pub use response::Response;

use strata_core::schema::SqlIdentifier;
use strata_sql::BoundSql;

use async_trait::async_trait;
use std::fmt::Debug;

/// Executes bound statements against a database.
///
/// Implementations own the connection handling and wire protocol. The
/// template only hands over rendered SQL with positional values.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Execute a statement and return the result
    async fn exec(&self, sql: BoundSql, kind: ExecKind) -> crate::Result<Response>;
}

/// What the template expects back from a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecKind {
    /// Rows are read from the response
    Query,

    /// Only the number of affected rows is read
    Update,

    /// An insert. When `generated_key` is set the driver reports the value
    /// the database generated for that column.
    Insert { generated_key: Option<SqlIdentifier> },
}

impl ExecKind {
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query)
    }
}

#[async_trait]
impl<D: Driver> Driver for std::sync::Arc<D> {
    async fn exec(&self, sql: BoundSql, kind: ExecKind) -> crate::Result<Response> {
        (**self).exec(sql, kind).await
    }
}
