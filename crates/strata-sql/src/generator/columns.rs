use crate::stmt::{Expr, Join, TableRef};

use strata_core::schema::{AggregatePath, SqlIdentifier};
use strata_core::{Error, Result};

/// The table storing `path`, aliased unless it is the root table.
pub(crate) fn table_of(path: &AggregatePath) -> Result<TableRef> {
    let info = path.table_info()?;
    Ok(TableRef::aliased(
        info.qualified_table_name(),
        info.table_alias(),
    ))
}

/// The leaf column of `path`, qualified by its table.
pub(crate) fn column_of(path: &AggregatePath) -> Result<Expr> {
    let table = table_of(path)?;
    Ok(Expr::column(table.reference(), &path.column_name()?))
}

/// Parameter name for a column: its reference with non-word characters
/// removed.
pub fn param_name(column: &SqlIdentifier) -> String {
    column
        .reference()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Select list and joins reading everything stored in the row of `base`:
/// its simple properties, embedded values, and to-one entities reachable
/// without crossing a collection.
///
/// Each column is selected under its path alias. To-one entities without an
/// id also select their back-reference column as a stand-in id, so a missing
/// child can be told apart from one whose columns are all null.
pub(crate) fn columns_and_joins(base: &AggregatePath) -> Result<(Vec<Expr>, Vec<Join>)> {
    let mut columns = vec![];
    let mut joins = vec![];

    for path in base.descendants()? {
        if path.is_multi_valued_below(base) || path.is_embedded() {
            continue;
        }

        if path.is_entity() {
            joins.push(join(&path, base)?);

            if !path.has_id_property() {
                let info = path.table_info()?;
                let reverse = info.reverse_column().ok_or_else(|| {
                    Error::invalid_path(format!("{path:?} has no back-reference column"))
                })?;
                let table = table_of(&path)?;
                columns.push(
                    Expr::column(table.reference(), &reverse.name).aliased(&reverse.alias),
                );
            }
            continue;
        }

        let info = path.column_info()?;
        columns.push(column_of(&path)?.aliased(&info.alias));
    }

    Ok((columns, joins))
}

/// Joins the table of the to-one entity at `path` to its parent row.
///
/// When the id-defining parent is part of the select, the join goes to its
/// key. Otherwise the parent is reached through the back references shared
/// with the nearest enclosing table.
fn join(path: &AggregatePath, base: &AggregatePath) -> Result<Join> {
    let table = table_of(path)?;
    let info = path.table_info()?;
    let parent = path.id_defining_parent_path()?;

    let pairs: Vec<(SqlIdentifier, SqlIdentifier, TableRef)> = if parent.len() >= base.len() {
        let parent_table = table_of(&parent)?;
        info.reverse_columns()
            .zip(parent.table_info()?.id_columns())
            .map(|(reverse, id)| (reverse.name.clone(), id.name.clone(), parent_table.clone()))
            .collect()
    } else {
        let enclosing = path.parent_path()?.table_owning_path();
        let enclosing_table = table_of(&enclosing)?;
        let enclosing_info = enclosing.table_info()?;
        info.back_reference_columns()
            .zip(
                enclosing_info
                    .back_reference_columns()
                    .chain(enclosing_info.qualifier_column()),
            )
            .map(|(reference, key)| {
                (
                    reference.name.clone(),
                    key.name.clone(),
                    enclosing_table.clone(),
                )
            })
            .collect()
    };

    if pairs.is_empty() {
        return Err(Error::invalid_path(format!(
            "cannot join {path:?}: its parent has no key"
        )));
    }

    let on = Expr::and(pairs.into_iter().map(|(column, key, parent_table)| {
        Expr::column(table.reference(), &column)
            .equals(Expr::column(parent_table.reference(), &key))
    }));

    Ok(Join { table, on })
}
