use super::PropertyDef;

/// Describes a mapped type: an aggregate root, a nested entity or an
/// embeddable value.
#[derive(Debug, Clone)]
pub struct EntityDef {
    /// Name of the type, unique within a mapping context
    pub name: String,

    /// Explicit table name. May reference context variables as `${key}`.
    pub table: Option<String>,

    /// Explicit schema, overriding the context default
    pub schema: Option<String>,

    /// Properties in declaration order
    pub properties: Vec<PropertyDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            schema: None,
            properties: vec![],
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    pub fn id_property(&self) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.id)
    }
}
