use super::{PersistentEntity, Settings};
use crate::schema::app::{EntityDef, PropertyKind};
use crate::schema::{path::PathKey, AggregatePath, ForeignKeyNaming, NamingStrategy};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;

/// Owns entity metadata and the path cache for an application.
///
/// Created once at startup and shared; cloning is cheap. Entities and paths
/// are resolved on first use and cached, so repeated lookups return the
/// same instance.
#[derive(Clone)]
pub struct MappingContext {
    pub(crate) inner: Arc<ContextInner>,
}

pub(crate) struct ContextInner {
    pub(crate) settings: Arc<Settings>,

    defs: IndexMap<String, EntityDef>,

    entities: RwLock<HashMap<String, Arc<PersistentEntity>>>,

    pub(crate) paths: RwLock<HashMap<PathKey, AggregatePath>>,
}

#[derive(Debug, Default)]
pub struct Builder {
    settings: Settings,
    defs: Vec<EntityDef>,
}

impl MappingContext {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Names of all registered entities, in registration order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.defs.keys().map(String::as_str)
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.inner.defs.contains_key(name)
    }

    /// Returns the persistent entity for `name`, resolving it on first use.
    pub fn entity(&self, name: &str) -> Result<Arc<PersistentEntity>> {
        self.inner.entity(name)
    }
}

impl ContextInner {
    pub(crate) fn entity(&self, name: &str) -> Result<Arc<PersistentEntity>> {
        if let Some(entity) = self
            .entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(entity.clone());
        }

        let def = self
            .defs
            .get(name)
            .ok_or_else(|| Error::invalid_schema(format!("unknown entity `{name}`")))?;

        let entity = Arc::new(PersistentEntity::new(def, &self.settings)?);

        let mut entities = self.entities.write().unwrap_or_else(PoisonError::into_inner);
        let entity = entities.entry(name.to_string()).or_insert_with(|| {
            debug!(
                entity = name,
                table = %entity.qualified_table_name(),
                "resolved persistent entity"
            );
            entity
        });

        Ok(entity.clone())
    }
}

impl fmt::Debug for MappingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingContext")
            .field("entities", &self.inner.defs.keys().collect::<Vec<_>>())
            .field("settings", &self.inner.settings)
            .finish()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn naming_strategy(&mut self, naming: impl NamingStrategy) -> &mut Self {
        self.settings.naming = Arc::new(naming);
        self
    }

    /// Quote identifiers produced by the naming strategy. Defaults to `true`.
    pub fn force_quote(&mut self, force_quote: bool) -> &mut Self {
        self.settings.force_quote = force_quote;
        self
    }

    pub fn foreign_key_naming(&mut self, naming: ForeignKeyNaming) -> &mut Self {
        self.settings.foreign_key_naming = naming;
        self
    }

    pub fn default_schema(&mut self, schema: impl Into<String>) -> &mut Self {
        self.settings.default_schema = Some(schema.into());
        self
    }

    /// Sets a variable available to `${key}` placeholders in table names.
    pub fn expression(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.settings.expressions.insert(key.into(), value.into());
        self
    }

    pub fn register(&mut self, def: EntityDef) -> &mut Self {
        self.defs.push(def);
        self
    }

    pub fn build(&self) -> Result<MappingContext> {
        let mut defs = IndexMap::new();

        for def in &self.defs {
            if defs.insert(def.name.clone(), def.clone()).is_some() {
                return Err(Error::invalid_schema(format!(
                    "entity `{}` registered twice",
                    def.name
                )));
            }
        }

        for def in defs.values() {
            verify(def, &defs, &self.settings)
                .map_err(|err| err.context(format!("verifying `{}`", def.name)))?;
        }

        Ok(MappingContext {
            inner: Arc::new(ContextInner {
                settings: Arc::new(self.settings.clone()),
                defs,
                entities: RwLock::new(HashMap::new()),
                paths: RwLock::new(HashMap::new()),
            }),
        })
    }
}

fn verify(def: &EntityDef, defs: &IndexMap<String, EntityDef>, settings: &Settings) -> Result<()> {
    if let Some(table) = &def.table {
        settings.resolve(table)?;
    }

    let ids = def.properties.iter().filter(|p| p.id).count();
    if ids > 1 {
        return Err(Error::invalid_schema("more than one id property"));
    }

    let versions = def.properties.iter().filter(|p| p.version).count();
    if versions > 1 {
        return Err(Error::invalid_schema("more than one version property"));
    }

    for property in &def.properties {
        // `__` separates path segments in table and column aliases
        if property.name.contains("__") {
            return Err(Error::invalid_schema(format!(
                "property name `{}` contains `__`",
                property.name
            )));
        }

        if property.version {
            match &property.kind {
                PropertyKind::Simple(ty) if ty.is_numeric() => {}
                _ => {
                    return Err(Error::invalid_schema(format!(
                        "version property `{}` must be numeric",
                        property.name
                    )))
                }
            }
        }

        let Some(target) = property.target() else {
            continue;
        };

        let Some(target_def) = defs.get(target) else {
            return Err(Error::invalid_schema(format!(
                "property `{}` references unknown entity `{target}`",
                property.name
            )));
        };

        match &property.kind {
            PropertyKind::Embedded { .. } => {
                if target_def.id_property().is_some() {
                    return Err(Error::invalid_schema(format!(
                        "embedded property `{}` targets `{target}`, which declares an id",
                        property.name
                    )));
                }

                if property.id
                    && target_def
                        .properties
                        .iter()
                        .any(|p| !matches!(p.kind, PropertyKind::Simple(_)))
                {
                    return Err(Error::invalid_schema(format!(
                        "composite id `{}` may only contain simple properties",
                        property.name
                    )));
                }
            }
            _ if property.id => {
                return Err(Error::invalid_schema(format!(
                    "id property `{}` must be simple or embedded",
                    property.name
                )));
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::app::PropertyDef;
    use crate::stmt::ValueType;

    fn dummy() -> EntityDef {
        EntityDef::new("DummyEntity")
            .property(PropertyDef::id("entity_id", ValueType::I64))
            .property(PropertyDef::simple("name", ValueType::String))
    }

    #[test]
    fn entity_is_cached() {
        let ctx = MappingContext::builder().register(dummy()).build().unwrap();

        let a = ctx.entity("DummyEntity").unwrap();
        let b = ctx.entity("DummyEntity").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.table_name().reference(), "dummy_entity");
    }

    #[test]
    fn unknown_target_is_rejected() {
        let err = MappingContext::builder()
            .register(dummy().property(PropertyDef::entity("other", "Missing")))
            .build()
            .unwrap_err();

        assert!(err.is_invalid_schema());
        assert_eq!(
            err.to_string(),
            "verifying `DummyEntity`: invalid schema: property `other` references unknown entity `Missing`"
        );
    }

    #[test]
    fn double_version_is_rejected() {
        let err = MappingContext::builder()
            .register(
                dummy()
                    .property(PropertyDef::version("v1", ValueType::I64))
                    .property(PropertyDef::version("v2", ValueType::I64)),
            )
            .build()
            .unwrap_err();

        assert!(err.is_invalid_schema());
    }

    #[test]
    fn string_version_is_rejected() {
        let err = MappingContext::builder()
            .register(dummy().property(PropertyDef::version("v", ValueType::String)))
            .build()
            .unwrap_err();

        assert!(err.is_invalid_schema());
    }

    #[test]
    fn alias_separator_in_property_name_is_rejected() {
        let err = MappingContext::builder()
            .register(dummy().property(PropertyDef::simple("a__b", ValueType::String)))
            .build()
            .unwrap_err();

        assert!(err.is_invalid_schema());
        assert_eq!(
            err.to_string(),
            "verifying `DummyEntity`: invalid schema: property name `a__b` contains `__`"
        );
    }

    #[test]
    fn embedded_with_id_is_rejected() {
        let err = MappingContext::builder()
            .register(dummy().property(PropertyDef::embedded("emb", "Other", "")))
            .register(EntityDef::new("Other").property(PropertyDef::id("id", ValueType::I64)))
            .build()
            .unwrap_err();

        assert!(err.is_invalid_schema());
    }

    #[test]
    fn table_expression_is_resolved() {
        let ctx = MappingContext::builder()
            .expression("tenant", "acme")
            .default_schema("app")
            .register(dummy().table("${tenant}_dummy"))
            .build()
            .unwrap();

        let entity = ctx.entity("DummyEntity").unwrap();
        assert_eq!(entity.qualified_table_name().reference(), "app.acme_dummy");
    }
}
