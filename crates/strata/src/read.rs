//! Rebuilding aggregates from result rows.
//!
//! A row of the aggregate select carries the root, its embedded values and
//! every to-one entity reachable without crossing a collection, each column
//! under the alias of its [`AggregatePath`]. Collections are fetched through
//! a resolver, one query per collection and parent.

mod scope;
pub use scope::ReadScope;

use strata_core::schema::app::OnEmpty;
use strata_core::schema::AggregatePath;
use strata_core::stmt::{Identifier, Object, Record, RowDocument, Value};
use strata_core::Result;

use async_recursion::async_recursion;
use async_trait::async_trait;
use tracing::debug;

/// Loads the rows of a collection for one parent.
pub trait RelationResolver {
    fn find_all_by_path(
        &self,
        identifier: &Identifier,
        path: &AggregatePath,
    ) -> Result<Vec<RowDocument>>;
}

#[async_trait]
pub trait AsyncRelationResolver: Send + Sync {
    async fn find_all_by_path(
        &self,
        identifier: &Identifier,
        path: &AggregatePath,
    ) -> Result<Vec<RowDocument>>;
}

/// Reads aggregates top-down from rows, resolving collections through `R`.
#[derive(Debug)]
pub struct EntityReader<'a, R: ?Sized> {
    resolver: &'a R,
}

/// How the value at a path is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Simple,
    Record,
    Embedded,
    ToOne,
    Many,
    Recursive,
}

impl Shape {
    fn of(path: &AggregatePath) -> Shape {
        if path.is_root() {
            Shape::Record
        } else if !path.is_entity() {
            Shape::Simple
        } else if path.is_embedded() {
            Shape::Embedded
        } else if path.is_recursive() {
            Shape::Recursive
        } else if path.is_collection_like() || path.is_map() {
            Shape::Many
        } else {
            Shape::ToOne
        }
    }
}

impl<'a, R: ?Sized> EntityReader<'a, R> {
    pub fn new(resolver: &'a R) -> EntityReader<'a, R> {
        EntityReader { resolver }
    }
}

impl<R: RelationResolver + ?Sized> EntityReader<'_, R> {
    /// Reads the value at `path` from `row`.
    ///
    /// The root and elements of collections read as records. Below them,
    /// absent to-one entities and empty embedded values read as `Null`.
    pub fn read(&self, path: &AggregatePath, row: &RowDocument, scope: &ReadScope) -> Result<Object> {
        match Shape::of(path) {
            Shape::Simple => read_simple(path, row).map(Object::Value),
            Shape::Recursive => Ok(skip_recursive(path)),
            Shape::Embedded if reads_as_null(path, row)? => Ok(Object::null()),
            Shape::ToOne if !is_present(path, row)? => Ok(Object::null()),
            Shape::Record | Shape::Embedded | Shape::ToOne => {
                self.read_record(path, row, scope).map(Object::Record)
            }
            Shape::Many => self.read_many(path, scope),
        }
    }

    fn read_record(&self, path: &AggregatePath, row: &RowDocument, scope: &ReadScope) -> Result<Record> {
        let scope = scope.enter(path, row)?;
        let entity = path.required_leaf_entity()?;
        let mut record = Record::new(entity.name());

        for property in entity.properties() {
            let child = path.append(property.name())?;
            record.set(property.name(), self.read(&child, row, &scope)?);
        }

        Ok(record)
    }

    fn read_many(&self, path: &AggregatePath, scope: &ReadScope) -> Result<Object> {
        let identifier = scope.identifier_for(path)?;
        let rows = self.resolver.find_all_by_path(&identifier, path)?;

        let mut elements = Vec::with_capacity(rows.len());
        for row in &rows {
            let qualifier = read_qualifier(path, row)?;
            let scope = scope.element(path, qualifier.as_ref());
            let element = self.read_record(path, row, &scope)?;
            elements.push((qualifier, Object::Record(element)));
        }

        collect(path, elements)
    }
}

impl<R: AsyncRelationResolver + ?Sized> EntityReader<'_, R> {
    /// Async form of [`read`](EntityReader::read). Collection queries are
    /// awaited one after another; dropping the future abandons the read.
    #[async_recursion]
    pub async fn read_async(
        &self,
        path: &AggregatePath,
        row: &RowDocument,
        scope: &ReadScope,
    ) -> Result<Object> {
        match Shape::of(path) {
            Shape::Simple => read_simple(path, row).map(Object::Value),
            Shape::Recursive => Ok(skip_recursive(path)),
            Shape::Embedded if reads_as_null(path, row)? => Ok(Object::null()),
            Shape::ToOne if !is_present(path, row)? => Ok(Object::null()),
            Shape::Record | Shape::Embedded | Shape::ToOne => self
                .read_record_async(path, row, scope)
                .await
                .map(Object::Record),
            Shape::Many => self.read_many_async(path, scope).await,
        }
    }

    #[async_recursion]
    async fn read_record_async(
        &self,
        path: &AggregatePath,
        row: &RowDocument,
        scope: &ReadScope,
    ) -> Result<Record> {
        let scope = scope.enter(path, row)?;
        let entity = path.required_leaf_entity()?;
        let mut record = Record::new(entity.name());

        for property in entity.properties() {
            let child = path.append(property.name())?;
            let value = self.read_async(&child, row, &scope).await?;
            record.set(property.name(), value);
        }

        Ok(record)
    }

    #[async_recursion]
    async fn read_many_async(&self, path: &AggregatePath, scope: &ReadScope) -> Result<Object> {
        let identifier = scope.identifier_for(path)?;
        let rows = self.resolver.find_all_by_path(&identifier, path).await?;

        let mut elements = Vec::with_capacity(rows.len());
        for row in &rows {
            let qualifier = read_qualifier(path, row)?;
            let scope = scope.element(path, qualifier.as_ref());
            let element = self.read_record_async(path, row, &scope).await?;
            elements.push((qualifier, Object::Record(element)));
        }

        collect(path, elements)
    }
}

fn read_simple(path: &AggregatePath, row: &RowDocument) -> Result<Value> {
    let alias = path.column_info()?.alias.reference();
    let value = row.get(&alias).cloned().unwrap_or_default();

    match path.required_leaf_property()?.value_type() {
        Some(ty) => value.cast(ty),
        None => Ok(value),
    }
}

fn skip_recursive(path: &AggregatePath) -> Object {
    debug!(path = path.dot_path(), "not reading recursive reference");
    if path.is_collection_like() || path.is_map() {
        collect_empty(path)
    } else {
        Object::null()
    }
}

/// A to-one entity exists when its id, or for entities without an id the
/// back-reference column selected in its place, is not null.
fn is_present(path: &AggregatePath, row: &RowDocument) -> Result<bool> {
    let info = path.table_info()?;

    if path.has_id_property() {
        Ok(info
            .id_columns()
            .iter()
            .any(|column| row.has_value(&column.alias.reference())))
    } else {
        Ok(info
            .reverse_column()
            .is_some_and(|column| row.has_value(&column.alias.reference())))
    }
}

/// `true` for an embedded value whose columns are all null and which is
/// mapped with [`OnEmpty::UseNull`].
fn reads_as_null(path: &AggregatePath, row: &RowDocument) -> Result<bool> {
    if path.required_leaf_property()?.on_empty() != OnEmpty::UseNull {
        return Ok(false);
    }

    let owner = path.table_owning_path();
    for column in path.descendants()? {
        if column.is_entity() || column.table_owning_path() != owner {
            continue;
        }
        if row.has_value(&column.column_info()?.alias.reference()) {
            return Ok(false);
        }
    }

    Ok(true)
}

fn read_qualifier(path: &AggregatePath, row: &RowDocument) -> Result<Option<Value>> {
    let info = path.table_info()?;
    let (Some(column), Some(ty)) = (info.qualifier_column(), info.qualifier_type()) else {
        return Ok(None);
    };

    let value = row
        .get(&column.alias.reference())
        .cloned()
        .unwrap_or_default();
    value.cast(ty).map(Some)
}

fn collect(path: &AggregatePath, mut elements: Vec<(Option<Value>, Object)>) -> Result<Object> {
    if path.is_map() {
        return Ok(Object::Map(
            elements
                .into_iter()
                .map(|(key, element)| (key.unwrap_or_default(), element))
                .collect(),
        ));
    }

    if path.is_qualified() {
        let mut keyed = Vec::with_capacity(elements.len());
        for (key, element) in elements.drain(..) {
            let index = key.as_ref().map(Value::to_i64).transpose()?.unwrap_or(0);
            keyed.push((index, element));
        }
        keyed.sort_by_key(|(index, _)| *index);
        return Ok(Object::List(keyed.into_iter().map(|(_, element)| element).collect()));
    }

    Ok(Object::Set(elements.into_iter().map(|(_, element)| element).collect()))
}

fn collect_empty(path: &AggregatePath) -> Object {
    if path.is_map() {
        Object::Map(vec![])
    } else if path.is_qualified() {
        Object::List(vec![])
    } else {
        Object::Set(vec![])
    }
}
