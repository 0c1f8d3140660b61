use crate::{BindMarkers, Dialect};

use indexmap::IndexMap;
use std::fmt::{self, Write};
use strata_core::stmt::Value;
use strata_core::{Error, Result};

/// A rendered statement with named parameters still unbound.
///
/// Templates are produced once per generator and then bound many times.
/// `Display` shows parameters as `:name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sql {
    fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
    Text(String),
    Param(String),
}

/// SQL text with positional values, ready for a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSql {
    pub sql: String,
    pub values: Vec<Value>,
}

/// Named parameter values, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSource {
    values: IndexMap<String, Value>,
}

impl Sql {
    pub(crate) fn push_str(&mut self, text: &str) {
        match self.fragments.last_mut() {
            Some(Fragment::Text(last)) => last.push_str(text),
            _ => self.fragments.push(Fragment::Text(text.to_string())),
        }
    }

    pub(crate) fn push_param(&mut self, name: &str) {
        self.fragments.push(Fragment::Param(name.to_string()));
    }

    /// Parameter names in order of appearance. A name used twice is listed
    /// twice.
    pub fn param_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fragments.iter().filter_map(|fragment| match fragment {
            Fragment::Param(name) => Some(name.as_str()),
            Fragment::Text(_) => None,
        })
    }

    /// Renders the template with `dialect`'s bind markers, collecting the
    /// values in marker order. `List` values expand into one marker per
    /// element; an empty list renders as `NULL`.
    pub fn bind(&self, params: &ParameterSource, dialect: &Dialect) -> Result<BoundSql> {
        let mut sql = String::new();
        let mut values = vec![];

        for fragment in &self.fragments {
            let name = match fragment {
                Fragment::Text(text) => {
                    sql.push_str(text);
                    continue;
                }
                Fragment::Param(name) => name,
            };

            let value = params.get(name).ok_or_else(|| {
                Error::from_args(format_args!("no value bound for parameter `{name}`"))
            })?;

            match value {
                Value::List(items) if items.is_empty() => sql.push_str("NULL"),
                Value::List(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            sql.push_str(", ");
                        }
                        values.push(item.clone());
                        push_marker(&mut sql, dialect.bind_markers(), name, Some(i), values.len());
                    }
                }
                value => {
                    values.push(value.clone());
                    push_marker(&mut sql, dialect.bind_markers(), name, None, values.len());
                }
            }
        }

        Ok(BoundSql { sql, values })
    }
}

fn push_marker(
    dst: &mut String,
    markers: BindMarkers,
    name: &str,
    element: Option<usize>,
    position: usize,
) {
    // Writing to a `String` never fails
    let _ = match (markers, element) {
        (BindMarkers::Named, None) => write!(dst, ":{name}"),
        (BindMarkers::Named, Some(i)) => write!(dst, ":{name}_{i}"),
        (BindMarkers::Dollar, _) => write!(dst, "${position}"),
        (BindMarkers::Anonymous, _) => write!(dst, "?"),
        (BindMarkers::Numbered, _) => write!(dst, "?{position}"),
    };
}

impl fmt::Display for Sql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) => f.write_str(text)?,
                Fragment::Param(name) => write!(f, ":{name}")?,
            }
        }
        Ok(())
    }
}

impl ParameterSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add(name, value);
        self
    }

    /// Sets `name`, replacing any previous value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Adds every value of `other`, replacing values of the same name.
    pub fn extend(&mut self, other: ParameterSource) {
        self.values.extend(other.values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Sql {
        let mut sql = Sql::default();
        sql.push_str("SELECT * FROM t WHERE a = ");
        sql.push_param("a");
        sql.push_str(" AND b IN (");
        sql.push_param("ids");
        sql.push_str(")");
        sql
    }

    #[test]
    fn display_uses_named_markers() {
        assert_eq!(
            template().to_string(),
            "SELECT * FROM t WHERE a = :a AND b IN (:ids)"
        );
    }

    #[test]
    fn binds_positionally_and_expands_lists() {
        let params = ParameterSource::new()
            .with("a", 1)
            .with("ids", vec![Value::from(2), Value::from(3)]);

        let bound = template().bind(&params, &Dialect::postgres()).unwrap();
        assert_eq!(bound.sql, "SELECT * FROM t WHERE a = $1 AND b IN ($2, $3)");
        assert_eq!(bound.values, vec![Value::I32(1), Value::I32(2), Value::I32(3)]);

        let bound = template().bind(&params, &Dialect::mysql()).unwrap();
        assert_eq!(bound.sql, "SELECT * FROM t WHERE a = ? AND b IN (?, ?)");

        let bound = template().bind(&params, &Dialect::sqlite()).unwrap();
        assert_eq!(bound.sql, "SELECT * FROM t WHERE a = ?1 AND b IN (?2, ?3)");

        let named = Dialect::postgres().with_bind_markers(BindMarkers::Named);
        let bound = template().bind(&params, &named).unwrap();
        assert_eq!(bound.sql, "SELECT * FROM t WHERE a = :a AND b IN (:ids_0, :ids_1)");
    }

    #[test]
    fn empty_list_binds_null() {
        let params = ParameterSource::new()
            .with("a", 1)
            .with("ids", Vec::<Value>::new());
        let bound = template().bind(&params, &Dialect::postgres()).unwrap();
        assert_eq!(bound.sql, "SELECT * FROM t WHERE a = $1 AND b IN (NULL)");
        assert_eq!(bound.values.len(), 1);
    }

    #[test]
    fn missing_parameter_fails() {
        let err = template()
            .bind(&ParameterSource::new(), &Dialect::postgres())
            .unwrap_err();
        assert_eq!(err.to_string(), "no value bound for parameter `a`");
    }
}
