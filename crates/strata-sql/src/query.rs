//! Criteria-based queries and their mapping onto SQL conditions.

mod criteria;
pub use criteria::{Combinator, Comparator, Criteria, CriteriaStep, CriteriaValue, PatternKind};

mod mapper;
pub use mapper::QueryMapper;

mod sort;
pub use sort::{Order, Pageable, Sort};

use crate::{BoundSql, Dialect, LockMode, ParameterSource, Sql};
use strata_core::Result;

/// Criteria plus ordering, paging and locking for a select.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub criteria: Criteria,
    pub sort: Sort,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub lock: Option<LockMode>,
}

/// A rendered statement with the parameter values it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametrizedQuery {
    pub sql: Sql,
    pub parameters: ParameterSource,
    pub criteria: Criteria,
}

impl Query {
    pub fn new(criteria: Criteria) -> Query {
        Query {
            criteria,
            ..Query::default()
        }
    }

    pub fn sort(mut self, sort: Sort) -> Query {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: u64) -> Query {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Query {
        self.offset = Some(offset);
        self
    }

    pub fn lock(mut self, mode: LockMode) -> Query {
        self.lock = Some(mode);
        self
    }

    /// Applies the paging of `page`, including its sort.
    pub fn with_page(self, page: &Pageable) -> Query {
        let query = self.sort(page.sort.clone()).limit(page.size);
        query.offset(page.offset())
    }
}

impl ParametrizedQuery {
    pub fn bind(&self, dialect: &Dialect) -> Result<BoundSql> {
        self.sql.bind(&self.parameters, dialect)
    }
}
