//! SQL templates for the CRUD operations of one aggregate.

mod columns;
pub use columns::param_name;
pub(crate) use columns::{column_of, table_of};

mod delete;
pub use delete::DeleteStep;

mod source;
pub use source::SqlGeneratorSource;

use crate::query::{Pageable, ParametrizedQuery, Query, QueryMapper, Sort};
use crate::stmt::{Assignment, Delete, Expr, Insert, OrderBy, Select, Update};
use crate::{Dialect, LockMode, ParameterSource, Serializer, Sql, Statement};

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use strata_core::schema::{AggregatePath, MappingContext, PersistentEntity, SqlIdentifier};
use strata_core::stmt::{Identifier, Value};
use strata_core::{Error, Result};
use tracing::debug;

/// Parameter holding the aggregate id.
pub const ID_SQL_PARAMETER: &str = "id";

/// Parameter holding a list of aggregate ids.
pub const IDS_SQL_PARAMETER: &str = "ids";

/// Parameter holding the version an update or delete expects to find.
pub const VERSION_SQL_PARAMETER: &str = "___oldOptimisticLockingVersion";

/// Parameter holding the root id in deletes by path.
pub const ROOT_ID_PARAMETER: &str = "rootId";

/// Generates and caches the statements for one aggregate root and dialect.
///
/// Fixed templates are built on first use and then reused; concurrent first
/// calls may both build a template but only one is kept.
#[derive(Debug)]
pub struct SqlGenerator {
    serializer: Serializer,

    entity: Arc<PersistentEntity>,

    root: AggregatePath,

    find_one: OnceLock<Result<Sql>>,
    find_all: OnceLock<Result<Sql>>,
    find_all_in_list: OnceLock<Result<Sql>>,
    exists: OnceLock<Result<Sql>>,
    count: OnceLock<Result<Sql>>,
    update: OnceLock<Result<Sql>>,
    update_with_version: OnceLock<Result<Sql>>,
    delete_by_id: OnceLock<Result<Sql>>,
    delete_by_id_and_version: OnceLock<Result<Sql>>,
    delete_by_list: OnceLock<Result<Sql>>,
    delete_all: OnceLock<Result<Sql>>,

    /// Keyed by the additional columns
    insert: RwLock<HashMap<Vec<SqlIdentifier>, Sql>>,

    /// Keyed by path, identifier columns and whether the qualifier orders
    find_all_by_property: RwLock<HashMap<(AggregatePath, Vec<SqlIdentifier>, bool), Sql>>,
}

impl SqlGenerator {
    pub fn new(context: &MappingContext, entity: &str, dialect: Dialect) -> Result<SqlGenerator> {
        let root = context.root_path(entity)?;

        Ok(SqlGenerator {
            serializer: Serializer::new(dialect),
            entity: root.required_leaf_entity()?.clone(),
            root,
            find_one: OnceLock::new(),
            find_all: OnceLock::new(),
            find_all_in_list: OnceLock::new(),
            exists: OnceLock::new(),
            count: OnceLock::new(),
            update: OnceLock::new(),
            update_with_version: OnceLock::new(),
            delete_by_id: OnceLock::new(),
            delete_by_id_and_version: OnceLock::new(),
            delete_by_list: OnceLock::new(),
            delete_all: OnceLock::new(),
            insert: RwLock::new(HashMap::new()),
            find_all_by_property: RwLock::new(HashMap::new()),
        })
    }

    pub fn entity(&self) -> &Arc<PersistentEntity> {
        &self.entity
    }

    pub fn root_path(&self) -> &AggregatePath {
        &self.root
    }

    pub fn dialect(&self) -> &Dialect {
        self.serializer.dialect()
    }

    /// `SELECT ... WHERE id = :id`
    pub fn find_one(&self) -> Result<&Sql> {
        self.cached(&self.find_one, "find_one", || {
            let mut select = self.select()?;
            select.and_where(self.id_condition(ID_SQL_PARAMETER)?);
            Ok(self.render(select))
        })
    }

    pub fn find_all(&self) -> Result<&Sql> {
        self.cached(&self.find_all, "find_all", || {
            Ok(self.render(self.select()?))
        })
    }

    /// `SELECT ... WHERE id IN (:ids)`
    pub fn find_all_in_list(&self) -> Result<&Sql> {
        self.cached(&self.find_all_in_list, "find_all_in_list", || {
            let mut select = self.select()?;
            let ids = self.single_id_column()?;
            select.and_where(ids.in_list(vec![Expr::bind(IDS_SQL_PARAMETER)]));
            Ok(self.render(select))
        })
    }

    /// `SELECT COUNT(id) ... WHERE id = :id`
    pub fn exists(&self) -> Result<&Sql> {
        self.cached(&self.exists, "exists", || {
            let (_, id) = self.id_columns()?.remove(0);
            let mut select = Select::new(vec![Expr::Count(Box::new(id))], table_of(&self.root)?);
            select.and_where(self.id_condition(ID_SQL_PARAMETER)?);
            Ok(self.render(select))
        })
    }

    /// `SELECT COUNT(*) FROM table`
    pub fn count(&self) -> Result<&Sql> {
        self.cached(&self.count, "count", || {
            let select = Select::new(vec![Expr::count_all()], table_of(&self.root)?);
            Ok(self.render(select))
        })
    }

    /// Inserts the writable columns of the root table plus
    /// `additional_columns`, typically a provided id or the back references
    /// of a child row. Each column binds the parameter
    /// [`param_name`]`(column)`.
    pub fn insert(&self, additional_columns: &[SqlIdentifier]) -> Result<Sql> {
        let key = additional_columns.to_vec();

        if let Some(sql) = self
            .insert
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(sql.clone());
        }

        let mut columns = self.insertable_columns()?;
        for column in additional_columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }

        let insert = Insert {
            table: self.entity.qualified_table_name().clone(),
            values: columns
                .iter()
                .map(|column| Expr::bind(param_name(column)))
                .collect(),
            columns,
        };
        let sql = self.render(insert);

        let mut cache = self.insert.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache
            .entry(key)
            .or_insert_with(|| {
                self.log_template("insert", &sql);
                sql
            })
            .clone())
    }

    /// Updates every updatable column of the row identified by its id
    /// column.
    pub fn update(&self) -> Result<&Sql> {
        self.cached(&self.update, "update", || {
            Ok(self.render(self.base_update()?))
        })
    }

    /// [`update`](Self::update), additionally requiring the version column
    /// to hold `:___oldOptimisticLockingVersion`.
    pub fn update_with_version(&self) -> Result<&Sql> {
        self.cached(&self.update_with_version, "update_with_version", || {
            let mut update = self.base_update()?;
            let condition = self.version_condition()?;
            update.filter = Some(match update.filter.take() {
                Some(filter) => Expr::and([filter, condition]),
                None => condition,
            });
            Ok(self.render(update))
        })
    }

    pub fn delete_by_id(&self) -> Result<&Sql> {
        self.cached(&self.delete_by_id, "delete_by_id", || {
            let delete = self.root_delete(Some(self.id_condition(ID_SQL_PARAMETER)?));
            Ok(self.render(delete))
        })
    }

    pub fn delete_by_id_and_version(&self) -> Result<&Sql> {
        self.cached(&self.delete_by_id_and_version, "delete_by_id_and_version", || {
            let condition = Expr::and([
                self.id_condition(ID_SQL_PARAMETER)?,
                self.version_condition()?,
            ]);
            Ok(self.render(self.root_delete(Some(condition))))
        })
    }

    pub fn delete_by_list(&self) -> Result<&Sql> {
        self.cached(&self.delete_by_list, "delete_by_list", || {
            let condition = self
                .single_id_column()?
                .in_list(vec![Expr::bind(IDS_SQL_PARAMETER)]);
            Ok(self.render(self.root_delete(Some(condition))))
        })
    }

    pub fn delete_all(&self) -> Result<&Sql> {
        self.cached(&self.delete_all, "delete_all", || {
            Ok(self.render(self.root_delete(None)))
        })
    }

    pub fn find_all_sorted(&self, sort: &Sort) -> Result<Sql> {
        let mut select = self.select()?;
        select.order_by = self.order_by(sort)?;
        Ok(self.render(select))
    }

    pub fn find_all_paged(&self, page: &Pageable) -> Result<Sql> {
        let mut select = self.select()?;
        select.order_by = self.order_by(&page.sort)?;
        select.limit = Some(page.size);
        select.offset = Some(page.offset());
        Ok(self.render(select))
    }

    pub fn find_one_locked(&self, mode: LockMode) -> Result<Sql> {
        let mut select = self.select()?;
        select.and_where(self.id_condition(ID_SQL_PARAMETER)?);
        select.lock = Some(mode);
        Ok(self.render(select))
    }

    pub fn find_all_locked(&self, mode: LockMode) -> Result<Sql> {
        let mut select = self.select()?;
        select.lock = Some(mode);
        Ok(self.render(select))
    }

    /// Selects the id of the row with id `:id`, locking it.
    pub fn acquire_lock_by_id(&self, mode: LockMode) -> Result<Sql> {
        let id = self.single_id_column()?;
        let mut select = Select::new(vec![id], table_of(&self.root)?);
        select.and_where(self.id_condition(ID_SQL_PARAMETER)?);
        select.lock = Some(mode);
        Ok(self.render(select))
    }

    /// Loads the rows stored for `path`, a collection, map or to-one entity
    /// below this aggregate, belonging to the parent described by
    /// `identifier`.
    ///
    /// Columns are selected under the aliases of their aggregate paths,
    /// together with the qualifier column for lists and maps. Each identifier
    /// part binds the parameter [`param_name`]`(part)`.
    pub fn find_all_by_property(
        &self,
        identifier: &Identifier,
        path: &AggregatePath,
        order_by_qualifier: bool,
    ) -> Result<Sql> {
        if path.root_entity().name() != self.entity.name() || path.is_root() || !path.is_entity() {
            return Err(Error::invalid_path(format!(
                "{path:?} is not a relation of `{}`",
                self.entity.name()
            )));
        }

        let names: Vec<SqlIdentifier> = identifier.parts().iter().map(|p| p.name.clone()).collect();
        let key = (path.clone(), names, order_by_qualifier);

        if let Some(sql) = self
            .find_all_by_property
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(sql.clone());
        }

        let info = path.table_info()?;
        let table = table_of(path)?;
        let (mut columns, joins) = columns::columns_and_joins(path)?;

        let qualifier = info
            .qualifier_column()
            .map(|column| Expr::column(table.reference(), &column.name));
        if let (Some(qualifier), Some(column)) = (&qualifier, info.qualifier_column()) {
            columns.push(qualifier.clone().aliased(&column.alias));
        }

        let mut select = Select::new(columns, table.clone());
        select.joins = joins;

        for name in &key.1 {
            select.and_where(
                Expr::column(table.reference(), name).equals(Expr::bind(param_name(name))),
            );
        }

        if order_by_qualifier {
            if let Some(qualifier) = qualifier {
                select.order_by.push(OrderBy::asc(qualifier));
            }
        }

        let sql = self.render(select);
        let mut cache = self
            .find_all_by_property
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(cache
            .entry(key)
            .or_insert_with(|| {
                self.log_template("find_all_by_property", &sql);
                sql
            })
            .clone())
    }

    /// [`exists`](Self::exists) with `id` bound.
    pub fn exists_by_id(&self, id: impl Into<Value>) -> Result<ParametrizedQuery> {
        Ok(ParametrizedQuery {
            sql: self.exists()?.clone(),
            parameters: ParameterSource::new().with(ID_SQL_PARAMETER, id),
            criteria: Default::default(),
        })
    }

    /// `SELECT COUNT(*)` of the rows matching `query`'s criteria.
    pub fn count_by_criteria(&self, query: &Query) -> Result<ParametrizedQuery> {
        let (_, joins) = columns::columns_and_joins(&self.root)?;
        let mut select = Select::new(vec![Expr::count_all()], table_of(&self.root)?);
        select.joins = joins;
        let parameters = self.apply_criteria(&mut select, query)?;

        Ok(ParametrizedQuery {
            sql: self.render(select),
            parameters,
            criteria: query.criteria.clone(),
        })
    }

    /// The aggregate select restricted, sorted, paged and locked by `query`.
    pub fn select_by_query(&self, query: &Query) -> Result<ParametrizedQuery> {
        let mut select = self.select()?;
        let parameters = self.apply_criteria(&mut select, query)?;
        select.order_by = self.order_by(&query.sort)?;
        select.limit = query.limit;
        select.offset = query.offset;
        select.lock = query.lock;

        Ok(ParametrizedQuery {
            sql: self.render(select),
            parameters,
            criteria: query.criteria.clone(),
        })
    }

    /// `SELECT 1 ... LIMIT 1` over the rows matching `query`'s criteria.
    pub fn exists_by_query(&self, query: &Query) -> Result<ParametrizedQuery> {
        let (_, joins) = columns::columns_and_joins(&self.root)?;
        let mut select = Select::new(vec![Expr::literal(1)], table_of(&self.root)?);
        select.joins = joins;
        let parameters = self.apply_criteria(&mut select, query)?;
        select.limit = Some(1);

        Ok(ParametrizedQuery {
            sql: self.render(select),
            parameters,
            criteria: query.criteria.clone(),
        })
    }

    /// The query fetching the next id from the entity's id sequence.
    pub fn next_sequence_value(&self) -> Result<Sql> {
        let sequence = self.entity.id_sequence().ok_or_else(|| {
            Error::invalid_path(format!("`{}` has no id sequence", self.entity.name()))
        })?;

        let mut sql = Sql::default();
        sql.push_str(&self.dialect().sequence_query(sequence)?);
        Ok(sql)
    }

    fn cached<'a>(
        &self,
        cell: &'a OnceLock<Result<Sql>>,
        name: &str,
        build: impl FnOnce() -> Result<Sql>,
    ) -> Result<&'a Sql> {
        let result = cell.get_or_init(|| {
            build()
                .inspect(|sql| self.log_template(name, sql))
                .map_err(|err| err.context(format!("generating {name} for `{}`", self.entity.name())))
        });

        match result {
            Ok(sql) => Ok(sql),
            Err(err) => Err(err.clone()),
        }
    }

    fn render(&self, stmt: impl Into<Statement>) -> Sql {
        self.serializer.serialize(&stmt.into())
    }

    fn log_template(&self, name: &str, sql: &Sql) {
        debug!(entity = self.entity.name(), statement = name, %sql, "generated SQL template");
    }

    /// The aggregate select without any condition.
    fn select(&self) -> Result<Select> {
        let (columns, joins) = columns::columns_and_joins(&self.root)?;
        let mut select = Select::new(columns, table_of(&self.root)?);
        select.joins = joins;
        Ok(select)
    }

    fn order_by(&self, sort: &Sort) -> Result<Vec<OrderBy>> {
        QueryMapper::new(self.dialect()).map_sort(sort, &self.root)
    }

    fn apply_criteria(&self, select: &mut Select, query: &Query) -> Result<ParameterSource> {
        let (condition, parameters) =
            QueryMapper::new(self.dialect()).map(&query.criteria, &self.root)?;
        if let Some(condition) = condition {
            select.and_where(condition);
        }
        Ok(parameters)
    }

    /// Key columns of the root table, qualified by the table name.
    fn id_columns(&self) -> Result<Vec<(SqlIdentifier, Expr)>> {
        self.entity.required_id_property()?;
        let table = table_of(&self.root)?;
        Ok(self
            .root
            .table_info()?
            .id_columns()
            .iter()
            .map(|c| (c.name.clone(), Expr::column(table.reference(), &c.name)))
            .collect())
    }

    fn single_id_column(&self) -> Result<Expr> {
        let mut columns = self.id_columns()?;
        if columns.len() != 1 {
            return Err(Error::unsupported_feature(format!(
                "`{}` has a composite id; id lists need a single key column",
                self.entity.name()
            )));
        }
        Ok(columns.remove(0).1)
    }

    /// `id = :param`. Composite keys bind each key column by its own name.
    fn id_condition(&self, param: &str) -> Result<Expr> {
        let mut columns = self.id_columns()?;
        if columns.len() == 1 {
            let (_, column) = columns.remove(0);
            return Ok(column.equals(Expr::bind(param)));
        }

        Ok(Expr::and(columns.into_iter().map(|(name, column)| {
            column.equals(Expr::bind(param_name(&name)))
        })))
    }

    fn version_condition(&self) -> Result<Expr> {
        let version = self.entity.version_property().ok_or_else(|| {
            Error::invalid_path(format!("`{}` has no version property", self.entity.name()))
        })?;
        let path = self.root.append(version.name())?;
        Ok(column_of(&path)?.equals(Expr::bind(VERSION_SQL_PARAMETER)))
    }

    fn root_delete(&self, filter: Option<Expr>) -> Delete {
        Delete {
            table: self.entity.qualified_table_name().clone(),
            filter,
        }
    }

    fn base_update(&self) -> Result<Update> {
        let id_columns = self.id_columns()?;

        let assignments = self
            .column_paths()?
            .into_iter()
            .filter(|path| !path.segments().iter().any(|p| p.is_insert_only()))
            .map(|path| path.column_name())
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .filter(|column| !id_columns.iter().any(|(id, _)| id == column))
            .map(|column| Assignment {
                value: Expr::bind(param_name(&column)),
                column,
            })
            .collect();

        let filter = Expr::and(id_columns.into_iter().map(|(name, column)| {
            column.equals(Expr::bind(param_name(&name)))
        }));

        Ok(Update {
            table: self.entity.qualified_table_name().clone(),
            assignments,
            filter: Some(filter),
        })
    }

    /// Writable simple paths stored in the root table.
    fn column_paths(&self) -> Result<Vec<AggregatePath>> {
        Ok(self
            .root
            .descendants()?
            .into_iter()
            .filter(|path| {
                !path.is_entity() && path.table_owning_path() == self.root && path.is_writable()
            })
            .collect())
    }

    /// Columns an insert always lists. A simple id is left out; callers add
    /// it when they provide the value.
    fn insertable_columns(&self) -> Result<Vec<SqlIdentifier>> {
        self.column_paths()?
            .into_iter()
            .filter(|path| !(path.len() == 1 && path.leaf_property().is_some_and(|p| p.is_id())))
            .map(|path| path.column_name())
            .collect()
    }
}
