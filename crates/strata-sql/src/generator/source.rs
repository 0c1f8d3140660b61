use super::SqlGenerator;
use crate::Dialect;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use strata_core::schema::MappingContext;
use strata_core::Result;
use tracing::debug;

/// Hands out one [`SqlGenerator`] per entity for a fixed dialect.
#[derive(Debug)]
pub struct SqlGeneratorSource {
    context: MappingContext,
    dialect: Dialect,
    generators: RwLock<HashMap<String, Arc<SqlGenerator>>>,
}

impl SqlGeneratorSource {
    pub fn new(context: MappingContext, dialect: Dialect) -> SqlGeneratorSource {
        SqlGeneratorSource {
            context,
            dialect,
            generators: RwLock::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &MappingContext {
        &self.context
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// The generator for `entity`, created on first request.
    pub fn generator(&self, entity: &str) -> Result<Arc<SqlGenerator>> {
        if let Some(generator) = self
            .generators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity)
        {
            return Ok(generator.clone());
        }

        let generator = Arc::new(SqlGenerator::new(&self.context, entity, self.dialect)?);

        let mut generators = self
            .generators
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(generators
            .entry(entity.to_string())
            .or_insert_with(|| {
                debug!(entity, "created SQL generator");
                generator
            })
            .clone())
    }
}
