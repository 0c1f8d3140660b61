use super::{Value, ValueType};
use crate::schema::SqlIdentifier;

use indexmap::IndexMap;

/// The key of a parent row as seen from a child table.
///
/// Parts are ordered: the back-reference column first, followed by the
/// qualifier columns of any collections between the parent and the child. A
/// composite parent key contributes one part per key column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identifier {
    parts: Vec<IdentifierPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierPart {
    pub name: SqlIdentifier,
    pub value: Value,
    pub target_type: ValueType,
}

impl Identifier {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(name: SqlIdentifier, value: impl Into<Value>, target_type: ValueType) -> Self {
        Self::empty().with_part(name, value, target_type)
    }

    /// Returns a copy with `name` set to `value`. An existing part with the
    /// same name is replaced in place.
    pub fn with_part(
        mut self,
        name: SqlIdentifier,
        value: impl Into<Value>,
        target_type: ValueType,
    ) -> Self {
        let part = IdentifierPart {
            name,
            value: value.into(),
            target_type,
        };

        match self.parts.iter_mut().find(|p| p.name == part.name) {
            Some(existing) => *existing = part,
            None => self.parts.push(part),
        }

        self
    }

    pub fn parts(&self) -> &[IdentifierPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn get(&self, name: &SqlIdentifier) -> Option<&Value> {
        self.parts.iter().find(|p| &p.name == name).map(|p| &p.value)
    }

    pub fn to_map(&self) -> IndexMap<SqlIdentifier, Value> {
        self.parts
            .iter()
            .map(|part| (part.name.clone(), part.value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_part_replaces_by_name() {
        let id = Identifier::of(SqlIdentifier::unquoted("dummy_entity"), 1, ValueType::I64)
            .with_part(SqlIdentifier::unquoted("dummy_entity_key"), 0, ValueType::I32)
            .with_part(SqlIdentifier::unquoted("dummy_entity"), 2, ValueType::I64);

        assert_eq!(id.len(), 2);
        assert_eq!(
            id.get(&SqlIdentifier::unquoted("dummy_entity")),
            Some(&Value::I32(2))
        );
        assert_eq!(id.parts()[1].name.reference(), "dummy_entity_key");
    }
}
