use strata_core::stmt::{RowDocument, Value};
use strata_core::{Error, Result};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Response {
    /// Number of rows impacted by the operation
    pub count: u64,

    /// Rows returned by a query
    pub rows: Vec<RowDocument>,

    /// Key generated by an insert
    pub generated_key: Option<Value>,
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    pub fn rows(rows: impl IntoIterator<Item = RowDocument>) -> Self {
        let rows: Vec<_> = rows.into_iter().collect();
        Self {
            count: rows.len() as u64,
            rows,
            generated_key: None,
        }
    }

    pub fn generated_key(key: impl Into<Value>) -> Self {
        Self {
            count: 1,
            rows: vec![],
            generated_key: Some(key.into()),
        }
    }

    pub fn into_rows(self) -> Vec<RowDocument> {
        self.rows
    }

    /// The first column of the first row, as returned by `COUNT` and
    /// sequence queries.
    pub fn into_scalar(self) -> Result<Value> {
        self.rows
            .into_iter()
            .next()
            .and_then(|row| row.iter().next().map(|(_, value)| value.clone()))
            .ok_or_else(|| Error::record_not_found("query returned no value"))
    }
}
