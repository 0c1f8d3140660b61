//! CRUD for whole aggregates over a [`Driver`].

mod write;
use write::{child_tables, column_params, id_params, slot_at, ParentRow};

use crate::driver::{Driver, ExecKind, Response};
use crate::read::{AsyncRelationResolver, EntityReader, ReadScope};
use crate::Entity;

use strata_core::schema::{AggregatePath, MappingContext, PersistentProperty};
use strata_core::stmt::{Identifier, Object, Record, RowDocument, Value};
use strata_core::{Error, Result};
use strata_sql::generator::{
    param_name, DeleteStep, IDS_SQL_PARAMETER, ROOT_ID_PARAMETER, VERSION_SQL_PARAMETER,
};
use strata_sql::query::Pageable;
use strata_sql::{
    Dialect, LockMode, ParameterSource, ParametrizedQuery, Query, Sort, Sql, SqlGenerator,
    SqlGeneratorSource,
};

use async_recursion::async_recursion;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

/// Loads and stores aggregates as [`Record`]s.
///
/// Every operation works on the aggregate as a whole: inserting a root
/// inserts everything reachable from it, updating replaces the rows of its
/// collections, deleting removes every dependent row first.
#[derive(Debug)]
pub struct AggregateTemplate<D> {
    source: SqlGeneratorSource,
    driver: D,
}

impl<D: Driver> AggregateTemplate<D> {
    pub fn new(context: MappingContext, dialect: Dialect, driver: D) -> AggregateTemplate<D> {
        AggregateTemplate {
            source: SqlGeneratorSource::new(context, dialect),
            driver,
        }
    }

    pub fn context(&self) -> &MappingContext {
        self.source.context()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Inserts a new aggregate and returns it with generated ids and the
    /// initial version filled in.
    pub async fn insert(&self, record: Record) -> Result<Record> {
        let generator = self.source.generator(record.entity())?;
        let root = generator.root_path().clone();
        self.insert_row(&root, record, Identifier::empty()).await
    }

    /// Updates the root row and rewrites every dependent table.
    ///
    /// Versioned aggregates are only updated when the stored version equals
    /// the record's; the returned record carries the incremented version.
    pub async fn update(&self, mut record: Record) -> Result<Record> {
        let generator = self.source.generator(record.entity())?;
        let root = generator.root_path().clone();
        let entity = generator.entity().clone();

        // Prepared before the root row is touched so an aggregate that
        // cannot be rewritten is left as it was.
        let dependents = self.dependent_deletes(&generator, &id_of(&generator, &record)?)?;

        match entity.version_property() {
            Some(version) => {
                let expected = record.value(version.name()).clone();
                record.set(version.name(), next_version(version, &expected)?);

                let mut params = column_params(&root, &record)?;
                params.add(VERSION_SQL_PARAMETER, expected.clone());

                let response = self
                    .exec(generator.update_with_version()?, &params, ExecKind::Update)
                    .await?;
                if response.count == 0 {
                    return Err(Error::optimistic_locking_failure(
                        entity.table_name().reference(),
                        expected,
                    ));
                }
            }
            None => {
                let params = column_params(&root, &record)?;
                let response = self
                    .exec(generator.update()?, &params, ExecKind::Update)
                    .await?;
                if response.count == 0 {
                    return Err(Error::record_not_found(format!(
                        "no `{}` with id {}",
                        entity.name(),
                        describe(&id_of(&generator, &record)?)
                    )));
                }
            }
        }

        self.run_deletes(dependents).await?;
        self.insert_children(&root, record, &Identifier::empty())
            .await
    }

    /// Inserts new aggregates and updates existing ones.
    ///
    /// A versioned aggregate is new while its version is null, any other
    /// aggregate while its id is.
    pub async fn save(&self, record: Record) -> Result<Record> {
        let generator = self.source.generator(record.entity())?;
        let entity = generator.entity();

        let is_new = match (entity.version_property(), entity.id_property()) {
            (Some(version), _) => record.value(version.name()).is_null(),
            (None, Some(id)) => record.get(id.name()).map_or(true, Object::is_null),
            (None, None) => true,
        };

        if is_new {
            self.insert(record).await
        } else {
            self.update(record).await
        }
    }

    pub async fn find_by_id(&self, entity: &str, id: impl Into<Object>) -> Result<Option<Record>> {
        let generator = self.source.generator(entity)?;
        let params = id_params(generator.root_path(), &id.into())?;
        let rows = self.query(generator.find_one()?, &params).await?;
        Ok(self.read_all(&generator, rows).await?.into_iter().next())
    }

    /// Like [`find_by_id`](Self::find_by_id), failing when there is no such
    /// aggregate.
    pub async fn get_by_id(&self, entity: &str, id: impl Into<Object>) -> Result<Record> {
        let id = id.into();
        let described = describe(&id);
        self.find_by_id(entity, id).await?.ok_or_else(|| {
            Error::record_not_found(format!("no `{entity}` with id {described}"))
        })
    }

    pub async fn find_all(&self, entity: &str) -> Result<Vec<Record>> {
        let generator = self.source.generator(entity)?;
        let rows = self
            .query(generator.find_all()?, &ParameterSource::new())
            .await?;
        self.read_all(&generator, rows).await
    }

    pub async fn find_all_sorted(&self, entity: &str, sort: &Sort) -> Result<Vec<Record>> {
        let generator = self.source.generator(entity)?;
        let sql = generator.find_all_sorted(sort)?;
        let rows = self.query(&sql, &ParameterSource::new()).await?;
        self.read_all(&generator, rows).await
    }

    pub async fn find_all_paged(&self, entity: &str, page: &Pageable) -> Result<Vec<Record>> {
        let generator = self.source.generator(entity)?;
        let sql = generator.find_all_paged(page)?;
        let rows = self.query(&sql, &ParameterSource::new()).await?;
        self.read_all(&generator, rows).await
    }

    pub async fn find_all_by_ids(
        &self,
        entity: &str,
        ids: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<Vec<Record>> {
        let generator = self.source.generator(entity)?;
        let params = ParameterSource::new().with(IDS_SQL_PARAMETER, id_list(ids));
        let rows = self.query(generator.find_all_in_list()?, &params).await?;
        self.read_all(&generator, rows).await
    }

    pub async fn find_all_by_query(&self, entity: &str, query: &Query) -> Result<Vec<Record>> {
        let generator = self.source.generator(entity)?;
        let ParametrizedQuery {
            sql, parameters, ..
        } = generator.select_by_query(query)?;
        let rows = self.query(&sql, &parameters).await?;
        self.read_all(&generator, rows).await
    }

    /// Loads aggregates and locks their root rows.
    pub async fn find_all_locked(&self, entity: &str, mode: LockMode) -> Result<Vec<Record>> {
        let generator = self.source.generator(entity)?;
        let sql = generator.find_all_locked(mode)?;
        let rows = self.query(&sql, &ParameterSource::new()).await?;
        self.read_all(&generator, rows).await
    }

    pub async fn count(&self, entity: &str) -> Result<u64> {
        let generator = self.source.generator(entity)?;
        let response = self
            .exec(generator.count()?, &ParameterSource::new(), ExecKind::Query)
            .await?;
        scalar_count(response)
    }

    pub async fn count_by_query(&self, entity: &str, query: &Query) -> Result<u64> {
        let generator = self.source.generator(entity)?;
        let ParametrizedQuery {
            sql, parameters, ..
        } = generator.count_by_criteria(query)?;
        scalar_count(self.exec(&sql, &parameters, ExecKind::Query).await?)
    }

    pub async fn exists_by_id(&self, entity: &str, id: impl Into<Value>) -> Result<bool> {
        let generator = self.source.generator(entity)?;
        let ParametrizedQuery {
            sql, parameters, ..
        } = generator.exists_by_id(id)?;
        Ok(scalar_count(self.exec(&sql, &parameters, ExecKind::Query).await?)? > 0)
    }

    pub async fn exists_by_query(&self, entity: &str, query: &Query) -> Result<bool> {
        let generator = self.source.generator(entity)?;
        let ParametrizedQuery {
            sql, parameters, ..
        } = generator.exists_by_query(query)?;
        Ok(!self.query(&sql, &parameters).await?.is_empty())
    }

    /// Deletes an aggregate and all its dependent rows. Deleting an id that
    /// does not exist is not an error.
    pub async fn delete_by_id(&self, entity: &str, id: impl Into<Object>) -> Result<()> {
        let generator = self.source.generator(entity)?;
        let id = id.into();

        let dependents = self.dependent_deletes(&generator, &id)?;
        let params = id_params(generator.root_path(), &id)?;
        let root = generator.delete_by_id()?;

        self.run_deletes(dependents).await?;
        self.exec(root, &params, ExecKind::Update).await?;
        Ok(())
    }

    /// Deletes the aggregate `record` is the root of.
    ///
    /// For versioned aggregates the root row is locked first and only
    /// deleted when its version still equals the record's.
    pub async fn delete(&self, record: &Record) -> Result<()> {
        let generator = self.source.generator(record.entity())?;
        let id = id_of(&generator, record)?;

        let Some(version) = generator.entity().version_property() else {
            return self.delete_by_id(record.entity(), id).await;
        };
        let expected = record.value(version.name()).clone();

        let plan = generator.delete_plan()?;
        let mut params = dependent_params(&generator, &id)?;
        let lock = generator.acquire_lock_by_id(LockMode::Write)?;
        self.query(&lock, &params).await?;

        params.add(VERSION_SQL_PARAMETER, expected.clone());

        for DeleteStep { path, sql } in plan {
            let response = self.exec(&sql, &params, ExecKind::Update).await?;
            if path.is_none() && response.count == 0 {
                return Err(Error::optimistic_locking_failure(
                    generator.entity().table_name().reference(),
                    expected,
                ));
            }
        }

        Ok(())
    }

    pub async fn delete_all_by_ids(
        &self,
        entity: &str,
        ids: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<()> {
        let generator = self.source.generator(entity)?;
        let params = ParameterSource::new().with(IDS_SQL_PARAMETER, id_list(ids));

        let dependents = generator
            .dependent_table_paths()?
            .iter()
            .map(|path| generator.delete_in_by_path(path))
            .collect::<Result<Vec<_>>>()?;
        let root = generator.delete_by_list()?;

        self.run_deletes((dependents, params.clone())).await?;
        self.exec(root, &params, ExecKind::Update).await?;
        Ok(())
    }

    pub async fn delete_all(&self, entity: &str) -> Result<()> {
        let generator = self.source.generator(entity)?;
        let params = ParameterSource::new();

        for step in generator.delete_all_plan()? {
            self.exec(&step.sql, &params, ExecKind::Update).await?;
        }
        Ok(())
    }

    pub async fn save_entity<E: Entity>(&self, entity: &E) -> Result<E> {
        E::load(self.save(entity.store()).await?)
    }

    pub async fn find_entity<E: Entity>(&self, id: impl Into<Object>) -> Result<Option<E>> {
        self.find_by_id(E::NAME, id)
            .await?
            .map(E::load)
            .transpose()
    }

    pub async fn find_all_entities<E: Entity>(&self) -> Result<Vec<E>> {
        self.find_all(E::NAME)
            .await?
            .into_iter()
            .map(E::load)
            .collect()
    }

    pub async fn delete_entity<E: Entity>(&self, entity: &E) -> Result<()> {
        self.delete(&entity.store()).await
    }

    /// Writes the row of `record` stored at `path`, then everything below
    /// it.
    #[async_recursion]
    async fn insert_row(
        &self,
        path: &AggregatePath,
        mut record: Record,
        identifier: Identifier,
    ) -> Result<Record> {
        let entity = path.required_leaf_entity()?.clone();
        let generator = self.source.generator(entity.name())?;
        let root = generator.root_path();

        if let Some(version) = entity.version_property() {
            if record.value(version.name()).is_null() {
                record.set(version.name(), initial_version(version)?);
            }
        }

        let mut columns: Vec<_> = identifier.parts().iter().map(|p| p.name.clone()).collect();
        let mut generated_key = None;

        if let Some(id) = entity.id_property().filter(|p| !p.is_embedded()) {
            if record.value(id.name()).is_null() && entity.id_sequence().is_some() {
                let sql = generator.next_sequence_value()?;
                let response = self.exec(&sql, &ParameterSource::new(), ExecKind::Query).await?;
                record.set(id.name(), cast_to(id, response.into_scalar()?)?);
            }

            let column = root.append(id.name())?.column_name()?;
            if record.value(id.name()).is_null() {
                generated_key = Some(column);
            } else {
                columns.push(column);
            }
        }

        let mut params = column_params(root, &record)?;
        for part in identifier.parts() {
            params.add(param_name(&part.name), part.value.clone());
        }

        let sql = generator.insert(&columns)?;
        let response = self
            .exec(
                &sql,
                &params,
                ExecKind::Insert {
                    generated_key: generated_key.clone(),
                },
            )
            .await?;

        if let (Some(column), Some(id)) = (generated_key, entity.id_property()) {
            let key = response.generated_key.ok_or_else(|| {
                strata_core::err!(
                    "no key was generated for `{}` of `{}`",
                    column.reference(),
                    entity.name()
                )
            })?;
            record.set(id.name(), cast_to(id, key)?);
        }

        self.insert_children(path, record, &identifier).await
    }

    /// Inserts the rows of every table directly below the row at `path`,
    /// storing the written elements back into `record`.
    #[async_recursion]
    async fn insert_children(
        &self,
        path: &AggregatePath,
        mut record: Record,
        identifier: &Identifier,
    ) -> Result<Record> {
        for child in child_tables(path)? {
            let segments = &child.segments()[path.len()..];
            let Some(slot) = slot_at(&mut record, segments) else {
                continue;
            };
            let object = std::mem::replace(slot, Object::null());

            if child.is_recursive() && !is_empty(&object) {
                return Err(Error::unsupported_feature(format!(
                    "cannot write self-referencing {child:?}"
                )));
            }

            let parent = ParentRow {
                path,
                record: &record,
                identifier,
            };
            let written = self.insert_elements(&parent, &child, object).await?;

            if let Some(slot) = slot_at(&mut record, segments) {
                *slot = written;
            }
        }

        Ok(record)
    }

    async fn insert_elements(
        &self,
        parent: &ParentRow<'_>,
        child: &AggregatePath,
        object: Object,
    ) -> Result<Object> {
        Ok(match object {
            Object::Record(element) => {
                let identifier = parent.identifier_for(child, None)?;
                Object::Record(self.insert_row(child, element, identifier).await?)
            }
            Object::List(items) => {
                let mut written = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let qualifier = Value::I32(index as i32);
                    written.push(self.insert_element(parent, child, Some(qualifier), item).await?);
                }
                Object::List(written)
            }
            Object::Set(items) => {
                let mut written = Vec::with_capacity(items.len());
                for item in items {
                    written.push(self.insert_element(parent, child, None, item).await?);
                }
                Object::Set(written)
            }
            Object::Map(entries) => {
                let mut written = Vec::with_capacity(entries.len());
                for (key, item) in entries {
                    let item = self
                        .insert_element(parent, child, Some(key.clone()), item)
                        .await?;
                    written.push((key, item));
                }
                Object::Map(written)
            }
            value @ Object::Value(_) => value,
        })
    }

    async fn insert_element(
        &self,
        parent: &ParentRow<'_>,
        child: &AggregatePath,
        qualifier: Option<Value>,
        item: Object,
    ) -> Result<Object> {
        let Object::Record(element) = item else {
            return Ok(item);
        };
        let identifier = parent.identifier_for(child, qualifier)?;
        Ok(Object::Record(
            self.insert_row(child, element, identifier).await?,
        ))
    }

    /// The statements deleting the rows of every dependent table of one
    /// aggregate, deepest first, with their parameters.
    fn dependent_deletes(
        &self,
        generator: &SqlGenerator,
        id: &Object,
    ) -> Result<(Vec<Sql>, ParameterSource)> {
        let statements = generator
            .dependent_table_paths()?
            .iter()
            .map(|path| generator.delete_by_path(path))
            .collect::<Result<Vec<_>>>()?;
        Ok((statements, dependent_params(generator, id)?))
    }

    async fn run_deletes(&self, (statements, params): (Vec<Sql>, ParameterSource)) -> Result<()> {
        for sql in &statements {
            self.exec(sql, &params, ExecKind::Update).await?;
        }
        Ok(())
    }

    async fn read_all(&self, generator: &SqlGenerator, rows: Vec<RowDocument>) -> Result<Vec<Record>> {
        let reader = EntityReader::new(self);
        let mut records = Vec::with_capacity(rows.len());

        for row in &rows {
            let object = reader
                .read_async(generator.root_path(), row, &ReadScope::new())
                .await?;
            let record = object.into_record().ok_or_else(|| {
                Error::invalid_path(format!(
                    "`{}` did not read as a record",
                    generator.entity().name()
                ))
            })?;
            records.push(record);
        }

        Ok(records)
    }

    async fn query(&self, sql: &Sql, params: &ParameterSource) -> Result<Vec<RowDocument>> {
        Ok(self.exec(sql, params, ExecKind::Query).await?.into_rows())
    }

    async fn exec(&self, sql: &Sql, params: &ParameterSource, kind: ExecKind) -> Result<Response> {
        let bound = sql.bind(params, self.source.dialect())?;
        trace!(sql = %bound.sql, params = bound.values.len(), ?kind, "executing statement");
        self.driver.exec(bound, kind).await
    }
}

#[async_trait]
impl<D: Driver> AsyncRelationResolver for AggregateTemplate<D> {
    async fn find_all_by_path(
        &self,
        identifier: &Identifier,
        path: &AggregatePath,
    ) -> Result<Vec<RowDocument>> {
        let generator = self.source.generator(path.root_entity().name())?;
        let sql = generator.find_all_by_property(identifier, path, path.is_qualified())?;

        let mut params = ParameterSource::new();
        for part in identifier.parts() {
            params.add(param_name(&part.name), part.value.clone());
        }

        self.query(&sql, &params).await
    }
}

fn id_of(generator: &SqlGenerator, record: &Record) -> Result<Object> {
    let id = generator.entity().required_id_property()?;
    Ok(record.get(id.name()).cloned().unwrap_or(Object::null()))
}

/// Binds an aggregate id for the root row and its dependent rows: `:id` and
/// `:rootId` for a simple id, one parameter per key column for a composite
/// one.
fn dependent_params(generator: &SqlGenerator, id: &Object) -> Result<ParameterSource> {
    let mut params = id_params(generator.root_path(), id)?;
    if let Some(root_id) = id.as_value() {
        params.add(ROOT_ID_PARAMETER, root_id.clone());
    }
    Ok(params)
}

fn id_list(ids: impl IntoIterator<Item = impl Into<Value>>) -> Value {
    Value::List(ids.into_iter().map(Into::into).collect())
}

fn initial_version(version: &Arc<PersistentProperty>) -> Result<Value> {
    cast_to(version, Value::I64(0))
}

fn next_version(version: &Arc<PersistentProperty>, current: &Value) -> Result<Value> {
    let current = if current.is_null() { 0 } else { current.to_i64()? };
    cast_to(version, Value::I64(current + 1))
}

fn cast_to(property: &PersistentProperty, value: Value) -> Result<Value> {
    match property.value_type() {
        Some(ty) => value.cast(ty),
        None => Ok(value),
    }
}

fn scalar_count(response: Response) -> Result<u64> {
    let count = response.into_scalar()?.to_i64()?;
    Ok(u64::try_from(count).unwrap_or(0))
}

fn is_empty(object: &Object) -> bool {
    match object {
        Object::Value(value) => value.is_null(),
        Object::Record(_) => false,
        Object::List(items) | Object::Set(items) => items.is_empty(),
        Object::Map(entries) => entries.is_empty(),
    }
}

fn describe(id: &Object) -> String {
    match id {
        Object::Value(value) => value.to_string(),
        other => format!("{other:?}"),
    }
}
