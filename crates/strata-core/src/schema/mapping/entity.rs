use super::{PersistentProperty, Settings};
use crate::schema::{app::EntityDef, SqlIdentifier};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::sync::Arc;

/// A mapped type with its table name resolved.
#[derive(Debug)]
pub struct PersistentEntity {
    name: String,

    /// Unqualified table name
    table_name: SqlIdentifier,

    /// Table name including the schema, when one applies
    qualified_table_name: SqlIdentifier,

    /// Table name the naming strategy would derive, ignoring overrides
    default_table_name: String,

    properties: IndexMap<String, Arc<PersistentProperty>>,

    id: Option<Arc<PersistentProperty>>,
    version: Option<Arc<PersistentProperty>>,
}

impl PersistentEntity {
    pub(crate) fn new(def: &EntityDef, settings: &Settings) -> Result<Self> {
        let default_table_name = settings.naming.table_name(&def.name);

        let table_name = match &def.table {
            Some(table) => settings.explicit(&settings.resolve(table)?),
            None => settings.derived(default_table_name.clone()),
        };

        let schema = match &def.schema {
            Some(schema) => Some(settings.resolve(schema)?),
            None => settings
                .default_schema
                .clone()
                .or_else(|| settings.naming.schema()),
        };

        let qualified_table_name = match schema {
            Some(schema) if !schema.is_empty() => {
                SqlIdentifier::composite(settings.explicit(&schema), [table_name.clone()])
            }
            _ => table_name.clone(),
        };

        let mut properties = IndexMap::new();
        let mut id = None;
        let mut version = None;

        for property_def in &def.properties {
            let property = Arc::new(PersistentProperty::new(&def.name, property_def, settings));

            if property.is_id() {
                id = Some(property.clone());
            }

            if property.is_version() {
                version = Some(property.clone());
            }

            if properties
                .insert(property_def.name.clone(), property)
                .is_some()
            {
                return Err(Error::invalid_schema(format!(
                    "duplicate property `{}` on `{}`",
                    property_def.name, def.name
                )));
            }
        }

        Ok(Self {
            name: def.name.clone(),
            table_name,
            qualified_table_name,
            default_table_name,
            properties,
            id,
            version,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &SqlIdentifier {
        &self.table_name
    }

    pub fn qualified_table_name(&self) -> &SqlIdentifier {
        &self.qualified_table_name
    }

    /// The name this entity contributes to a default back-reference column.
    pub(crate) fn owner_name(&self, settings: &Settings) -> String {
        use crate::schema::ForeignKeyNaming::*;

        match settings.foreign_key_naming {
            ApplyRenaming => self.table_name.reference(),
            IgnoreRenaming => self.default_table_name.clone(),
        }
    }

    pub fn properties(&self) -> impl ExactSizeIterator<Item = &Arc<PersistentProperty>> + '_ {
        self.properties.values()
    }

    pub fn property(&self, name: &str) -> Option<&Arc<PersistentProperty>> {
        self.properties.get(name)
    }

    pub fn required_property(&self, name: &str) -> Result<&Arc<PersistentProperty>> {
        self.property(name).ok_or_else(|| {
            Error::invalid_path(format!("property `{name}` not found on `{}`", self.name))
        })
    }

    pub fn id_property(&self) -> Option<&Arc<PersistentProperty>> {
        self.id.as_ref()
    }

    pub fn required_id_property(&self) -> Result<&Arc<PersistentProperty>> {
        self.id
            .as_ref()
            .ok_or_else(|| Error::invalid_path(format!("`{}` has no id property", self.name)))
    }

    pub fn has_id_property(&self) -> bool {
        self.id.is_some()
    }

    pub fn version_property(&self) -> Option<&Arc<PersistentProperty>> {
        self.version.as_ref()
    }

    pub fn has_version_property(&self) -> bool {
        self.version.is_some()
    }

    /// Sequence generating values for the id column.
    pub fn id_sequence(&self) -> Option<&SqlIdentifier> {
        self.id.as_ref().and_then(|id| id.sequence())
    }
}
