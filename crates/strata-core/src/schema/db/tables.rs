use super::{Column, ForeignKey, SqlTypeMapping, Table};
use crate::schema::{AggregatePath, MappingContext, SqlIdentifier};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::iter;

/// The tables an aggregate mapping needs, in dependency order: a table
/// always comes after the tables it references.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    tables: IndexMap<SqlIdentifier, Table>,
}

impl Tables {
    /// Derives one table per table-owning path below each of `roots`.
    /// Tables reached through several paths are merged.
    pub fn from_context<'a>(
        ctx: &MappingContext,
        roots: impl IntoIterator<Item = &'a str>,
        types: &dyn SqlTypeMapping,
    ) -> Result<Tables> {
        let mut tables = Tables::default();

        for root in roots {
            let paths = ctx.find_paths(root, |_| true)?;
            let owners = iter::once(ctx.root_path(root)?)
                .chain(paths.iter().filter(|p| p.is_table_owner()).cloned());

            for owner in owners {
                tables
                    .add(&owner, &paths, types)
                    .map_err(|err| err.context(format!("deriving table for {owner:?}")))?;
            }
        }

        Ok(tables)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Table> + ExactSizeIterator + '_ {
        self.tables.values()
    }

    /// Looks a table up by its (qualified) name.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.values().find(|t| t.name.reference() == name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn add(
        &mut self,
        owner: &AggregatePath,
        paths: &[AggregatePath],
        types: &dyn SqlTypeMapping,
    ) -> Result<()> {
        let info = owner.table_info()?;
        let name = info.qualified_table_name().clone();

        let foreign_key = if owner.is_root() {
            None
        } else {
            Some(foreign_key(owner)?)
        };

        let primary_key = primary_key(owner)?;

        let table = self
            .tables
            .entry(name.clone())
            .or_insert_with(|| Table::new(name));

        for back_reference in info.back_references() {
            let ty = back_reference.ty.as_ref().ok_or_else(|| {
                Error::invalid_schema(format!(
                    "no identifier found up the chain of {owner:?}"
                ))
            })?;

            table.add_column(Column {
                name: back_reference.column.name.clone(),
                ty: types.column_type(ty),
                nullable: false,
                identity: false,
            });
        }

        if let (Some(column), Some(ty)) = (info.qualifier_column(), info.qualifier_type()) {
            table.add_column(Column {
                name: column.name.clone(),
                ty: types.column_type(ty),
                nullable: false,
                identity: false,
            });
        }

        for path in paths {
            if path.is_entity() || path.table_owning_path() != *owner {
                continue;
            }

            let property = path.required_leaf_property()?;
            let Some(ty) = property.value_type() else {
                continue;
            };

            let name = path.column_name()?;
            let identity = info.id_columns().iter().any(|c| c.name == name);

            table.add_column(Column {
                name,
                ty: types.column_type(ty),
                nullable: property.is_nullable() && !identity,
                identity,
            });
        }

        if table.primary_key.is_empty() {
            table.primary_key = primary_key;
        }

        if let Some(foreign_key) = foreign_key {
            table.add_foreign_key(foreign_key);
        }

        Ok(())
    }
}

/// The key of the table owned by `owner`: the entity's id columns, or for
/// id-less lists, maps and to-one references the back-reference columns
/// plus the index/key column. Id-less set elements have no key.
fn primary_key(owner: &AggregatePath) -> Result<Vec<SqlIdentifier>> {
    let info = owner.table_info()?;

    if !info.id_columns().is_empty() {
        return Ok(info.id_columns().iter().map(|c| c.name.clone()).collect());
    }

    let to_one = owner
        .leaf_property()
        .is_some_and(|p| p.is_entity() && !p.is_collection_like() && !p.is_map());

    if owner.is_root() || !(owner.is_qualified() || to_one) {
        return Ok(vec![]);
    }

    Ok(info
        .back_reference_columns()
        .chain(info.qualifier_column())
        .map(|c| c.name.clone())
        .collect())
}

fn foreign_key(owner: &AggregatePath) -> Result<ForeignKey> {
    let info = owner.table_info()?;
    let parent = owner.parent_path()?.table_owning_path();
    let parent_info = parent.table_info()?;

    let referenced_columns = primary_key(&parent)?;
    if referenced_columns.is_empty() {
        return Err(Error::invalid_schema(format!(
            "no identifier found up the chain of {owner:?}; {parent:?} has no key to reference"
        )));
    }

    let columns: Vec<_> = info
        .back_reference_columns()
        .map(|c| c.name.clone())
        .collect();

    if columns.len() != referenced_columns.len() {
        return Err(Error::invalid_schema(format!(
            "{owner:?} has {} back-reference columns but {parent:?} has {} key columns",
            columns.len(),
            referenced_columns.len()
        )));
    }

    let referenced_table = parent_info.qualified_table_name().clone();
    let name = format!(
        "{}_{}_fk",
        referenced_table.last().reference(),
        referenced_columns
            .iter()
            .map(|c| c.reference())
            .collect::<Vec<_>>()
            .join("_")
    );

    Ok(ForeignKey {
        name,
        table: info.qualified_table_name().clone(),
        columns,
        referenced_table,
        referenced_columns,
    })
}
