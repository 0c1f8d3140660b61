use super::Error;
use crate::stmt::Value;

/// Error when a version-guarded UPDATE or DELETE affects no rows.
///
/// The statement generator never raises this; the caller inspects the
/// affected-row count and reports the failure.
#[derive(Debug)]
pub(super) struct OptimisticLockingFailure {
    table: Box<str>,
    version: Value,
}

impl std::error::Error for OptimisticLockingFailure {}

impl core::fmt::Display for OptimisticLockingFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "optimistic locking failure: no row of `{}` matched version {}",
            self.table, self.version
        )
    }
}

impl Error {
    /// Creates an optimistic locking failure for `table` at the expected
    /// `version`.
    pub fn optimistic_locking_failure(table: impl Into<String>, version: impl Into<Value>) -> Error {
        Error::from(super::ErrorKind::OptimisticLockingFailure(
            OptimisticLockingFailure {
                table: table.into().into(),
                version: version.into(),
            },
        ))
    }

    /// Returns `true` if this error is, or wraps, an optimistic locking failure.
    pub fn is_optimistic_locking_failure(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::OptimisticLockingFailure(_)))
    }
}
