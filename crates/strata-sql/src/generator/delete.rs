use super::{param_name, SqlGenerator, IDS_SQL_PARAMETER, ROOT_ID_PARAMETER};
use crate::stmt::{Delete, Expr, Select, TableRef};
use crate::Sql;

use strata_core::schema::path::BackReferenceSource;
use strata_core::schema::{AggregatePath, SqlIdentifier};
use strata_core::{Error, Result};

/// One statement of a cascading delete.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStep {
    /// The table-owning path deleted from; `None` for the root table
    pub path: Option<AggregatePath>,
    pub sql: Sql,
}

impl SqlGenerator {
    /// Deletes the rows of `path` belonging to one aggregate.
    ///
    /// A simple root id is bound as `:rootId`. With a composite root id each
    /// back-reference column is compared to the parameter of the key column
    /// it refers to, e.g. `:tenant` and `:number`.
    pub fn delete_by_path(&self, path: &AggregatePath) -> Result<Sql> {
        self.delete_by_path_and_condition(path, &|columns| match columns {
            [(column, _)] => Ok(column.clone().equals(Expr::bind(ROOT_ID_PARAMETER))),
            columns => {
                let mut equalities = Vec::with_capacity(columns.len());
                for (column, referenced) in columns {
                    let referenced = referenced.as_ref().ok_or_else(|| {
                        Error::invalid_path(format!("{path:?} refers to a parent without id"))
                    })?;
                    equalities.push(column.clone().equals(Expr::bind(param_name(referenced))));
                }
                Ok(Expr::and(equalities))
            }
        })
    }

    /// Deletes the rows of `path` belonging to any aggregate in `:ids`.
    pub fn delete_in_by_path(&self, path: &AggregatePath) -> Result<Sql> {
        self.delete_by_path_and_condition(path, &|columns| match columns {
            [(column, _)] => Ok(column.clone().in_list(vec![Expr::bind(IDS_SQL_PARAMETER)])),
            _ => Err(Error::unsupported_feature(format!(
                "deleting `{}` aggregates by a list of composite ids",
                self.entity.name()
            ))),
        })
    }

    /// Deletes the rows of `path` for all aggregates.
    pub fn delete_all_by_path(&self, path: &AggregatePath) -> Result<Sql> {
        self.delete_by_path_and_condition(path, &|columns| {
            Ok(Expr::and(
                columns.iter().map(|(column, _)| column.clone().is_not_null()),
            ))
        })
    }

    /// The statements deleting one aggregate: every dependent table,
    /// innermost first, then the root row. The root delete checks the
    /// version when the entity is versioned.
    pub fn delete_plan(&self) -> Result<Vec<DeleteStep>> {
        let mut steps = self.dependent_steps(|path| self.delete_by_path(path))?;

        let root = if self.entity.has_version_property() {
            self.delete_by_id_and_version()?
        } else {
            self.delete_by_id()?
        };
        steps.push(DeleteStep {
            path: None,
            sql: root.clone(),
        });

        Ok(steps)
    }

    /// Like [`delete_plan`](Self::delete_plan) for all aggregates.
    pub fn delete_all_plan(&self) -> Result<Vec<DeleteStep>> {
        let mut steps = self.dependent_steps(|path| self.delete_all_by_path(path))?;
        steps.push(DeleteStep {
            path: None,
            sql: self.delete_all()?.clone(),
        });
        Ok(steps)
    }

    /// Paths below the root that own a table, deepest first. Paths of equal
    /// depth keep their declaration order.
    pub fn dependent_table_paths(&self) -> Result<Vec<AggregatePath>> {
        let mut paths: Vec<AggregatePath> = self
            .root
            .descendants()?
            .into_iter()
            .filter(|path| path.is_entity() && !path.is_embedded())
            .collect();
        paths.sort_by_key(|path| std::cmp::Reverse(path.len()));
        Ok(paths)
    }

    fn dependent_steps(
        &self,
        sql: impl Fn(&AggregatePath) -> Result<Sql>,
    ) -> Result<Vec<DeleteStep>> {
        self.dependent_table_paths()?
            .into_iter()
            .map(|path| {
                Ok(DeleteStep {
                    sql: sql(&path)?,
                    path: Some(path),
                })
            })
            .collect()
    }

    fn delete_by_path_and_condition(
        &self,
        path: &AggregatePath,
        root_condition: &RootCondition<'_>,
    ) -> Result<Sql> {
        if path.root_entity().name() != self.entity.name()
            || path.is_root()
            || !path.is_entity()
            || path.is_embedded()
        {
            return Err(Error::invalid_path(format!(
                "{path:?} does not own a table below `{}`",
                self.entity.name()
            )));
        }

        let info = path.table_info()?;
        let table = info.qualified_table_name();
        let condition = parent_condition(path, table, root_condition)?;

        Ok(self.render(Delete {
            table: table.clone(),
            filter: Some(condition),
        }))
    }
}

/// Builds the condition on the root-referencing columns, each paired with
/// the root key column it refers to (`None` when the root has no id).
type RootCondition<'a> = dyn Fn(&[(Expr, Option<SqlIdentifier>)]) -> Result<Expr> + 'a;

/// Restricts the rows of `path`, stored in `table`, to the selected
/// aggregates. Each ancestor with an id of its own adds one sub-select
/// `(refs) IN (SELECT parent keys FROM parent WHERE ...)`.
fn parent_condition(
    path: &AggregatePath,
    table: &SqlIdentifier,
    root_condition: &RootCondition<'_>,
) -> Result<Expr> {
    let columns: Vec<(Expr, Option<SqlIdentifier>)> = parent_key_columns(path)?
        .into_iter()
        .map(|(column, referenced)| (Expr::column(table, &column), referenced))
        .collect();

    let parent = path.id_defining_parent_path()?;
    if parent.is_root() {
        return root_condition(&columns);
    }

    let info = parent.table_info()?;
    let parent_table = info.qualified_table_name();

    let mut filter = Vec::with_capacity(columns.len());
    let mut keys = Vec::with_capacity(columns.len());
    for (column, referenced) in columns {
        let referenced = referenced.ok_or_else(|| {
            Error::invalid_path(format!("{path:?} refers to {parent:?}, which has no id"))
        })?;
        filter.push(column);
        keys.push(Expr::column(parent_table, &referenced));
    }

    let mut select = Select::new(keys, TableRef::new(parent_table));
    select.and_where(parent_condition(&parent, parent_table, root_condition)?);

    Ok(Expr::tuple(filter).in_subquery(select))
}

/// The back-reference columns of `path` referring to its parent's key, with
/// the key column each one refers to.
fn parent_key_columns(
    path: &AggregatePath,
) -> Result<Vec<(SqlIdentifier, Option<SqlIdentifier>)>> {
    let info = path.table_info()?;
    let mut out = vec![];

    for reference in info.back_references() {
        if let BackReferenceSource::ParentKey { referenced, .. } = &reference.source {
            out.push((reference.column.name.clone(), referenced.clone()));
        }
    }

    if out.is_empty() {
        return Err(Error::invalid_path(format!(
            "{path:?} has no back-reference column"
        )));
    }

    Ok(out)
}
