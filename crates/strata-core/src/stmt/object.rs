use super::Value;

use indexmap::IndexMap;

/// A dynamically typed instance graph.
///
/// `Object` is the neutral form aggregates take on their way to and from rows.
/// Typed structs convert into and out of it, so the mapping layer never needs
/// reflection over user types.
#[derive(Debug, Clone)]
pub enum Object {
    /// A simple value, including `Null` for absent references
    Value(Value),

    /// An entity or embedded value
    Record(Record),

    /// Ordered collection; position is the list index
    List(Vec<Object>),

    /// Unordered collection
    Set(Vec<Object>),

    /// Keyed collection, in insertion order
    Map(Vec<(Value, Object)>),
}

/// An entity instance: ordered property values keyed by property name.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    entity: String,
    properties: IndexMap<String, Object>,
}

impl Object {
    pub const fn null() -> Self {
        Self::Value(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Iterates the elements of a collection object together with their
    /// qualifier: the list index for lists, the key for maps and `None` for
    /// sets. A non-collection object yields nothing.
    pub fn elements(&self) -> Vec<(Option<Value>, &Object)> {
        match self {
            Self::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (Some(Value::I32(i as i32)), item))
                .collect(),
            Self::Set(items) => items.iter().map(|item| (None, item)).collect(),
            Self::Map(entries) => entries
                .iter()
                .map(|(key, item)| (Some(key.clone()), item))
                .collect(),
            Self::Value(_) | Self::Record(_) => vec![],
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            // Sets have no order, compare as multisets
            (Self::Set(a), Self::Set(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                let mut unmatched: Vec<&Object> = b.iter().collect();
                a.iter().all(|item| {
                    match unmatched.iter().position(|candidate| *candidate == item) {
                        Some(pos) => {
                            unmatched.swap_remove(pos);
                            true
                        }
                        None => false,
                    }
                })
            }
            _ => false,
        }
    }
}

impl From<Value> for Object {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Record> for Object {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl<T: Into<Object>> From<Option<T>> for Object {
    fn from(src: Option<T>) -> Self {
        src.map(Into::into).unwrap_or(Self::null())
    }
}

impl Record {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            properties: IndexMap::new(),
        }
    }

    /// Builder-style setter.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<Object>) -> Self {
        self.set(property, value);
        self
    }

    /// Builder-style setter for simple values.
    pub fn with_value(self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(property, Object::Value(value.into()))
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn get(&self, property: &str) -> Option<&Object> {
        self.properties.get(property)
    }

    pub fn get_mut(&mut self, property: &str) -> Option<&mut Object> {
        self.properties.get_mut(property)
    }

    /// Returns the simple value of `property`; missing or non-simple
    /// properties read as `Null`.
    pub fn value(&self, property: &str) -> &Value {
        static NULL: Value = Value::Null;
        match self.properties.get(property) {
            Some(Object::Value(value)) => value,
            _ => &NULL,
        }
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<Object>) {
        self.properties.insert(property.into(), value.into());
    }

    pub fn take(&mut self, property: &str) -> Object {
        self.properties
            .shift_remove(property)
            .unwrap_or(Object::null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Object)> + '_ {
        self.properties.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
