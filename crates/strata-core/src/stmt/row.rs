use super::Value;

use indexmap::IndexMap;

/// One result row keyed by column alias, in select-list order.
///
/// Lookups are case-insensitive as a fallback since some databases fold
/// unquoted aliases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowDocument {
    columns: IndexMap<String, Value>,
}

impl RowDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, alias: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(alias, value);
        self
    }

    pub fn insert(&mut self, alias: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(alias.into(), value.into());
    }

    pub fn get(&self, alias: &str) -> Option<&Value> {
        self.columns.get(alias).or_else(|| {
            self.columns
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(alias))
                .map(|(_, value)| value)
        })
    }

    /// Returns `true` when `alias` is present and not `NULL`.
    pub fn has_value(&self, alias: &str) -> bool {
        self.get(alias).is_some_and(|value| !value.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RowDocument {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        let row = RowDocument::new().with("ENTITY_ID", 1).with("name", Value::Null);

        assert_eq!(row.get("entity_id"), Some(&Value::I32(1)));
        assert!(row.get("name").is_some());
        assert!(!row.has_value("name"));
        assert!(row.get("missing").is_none());
    }
}
