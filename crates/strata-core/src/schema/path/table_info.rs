use super::AggregatePath;
use crate::schema::{PersistentEntity, SqlIdentifier};
use crate::stmt::ValueType;
use crate::{Error, Result};

/// Table-level naming for the paths stored in one table.
///
/// All paths sharing a table owner share one `TableInfo`.
#[derive(Debug, Clone)]
pub struct TableInfo {
    qualified_table_name: SqlIdentifier,

    /// `None` for the aggregate root's table
    table_alias: Option<SqlIdentifier>,

    /// Columns referring to the parent row: the parent key columns first,
    /// then the index/key columns of any collections in between
    back_references: Vec<BackReference>,

    /// Index or key column of a list or map, and its type
    qualifier: Option<(ColumnInfo, ValueType)>,

    /// Key columns of the entity stored in this table
    id_columns: Vec<ColumnInfo>,
}

/// A column name together with the alias it is selected as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnInfo {
    pub name: SqlIdentifier,
    pub alias: SqlIdentifier,
}

/// A column of a child table that identifies the parent row.
#[derive(Debug, Clone)]
pub struct BackReference {
    pub column: ColumnInfo,

    /// Column type. Unknown when the parent has no id.
    pub ty: Option<ValueType>,

    pub source: BackReferenceSource,
}

/// Where the value of a back-reference column comes from.
#[derive(Debug, Clone)]
pub enum BackReferenceSource {
    /// A key column of the id-defining parent. `property` lists the property
    /// names leading to the value within the parent, e.g. `["id"]`, or
    /// `["id", "tenant"]` for a composite key. Both are empty when the parent
    /// has no id.
    ParentKey {
        parent: AggregatePath,
        referenced: Option<SqlIdentifier>,
        property: Vec<String>,
    },

    /// The list index or map key of the enclosing collection element at the
    /// given path.
    Qualifier(AggregatePath),
}

impl TableInfo {
    pub(super) fn of(owner: &AggregatePath) -> Result<TableInfo> {
        debug_assert!(owner.is_table_owner());

        let entity = owner.required_leaf_entity()?;
        let settings = owner.settings();

        let table_alias = if owner.is_root() {
            None
        } else {
            let alias = owner.segments().iter().map(|p| p.name()).collect::<Vec<_>>();
            Some(settings.derived(alias.join("__")))
        };

        let prefix = |column: &SqlIdentifier| prefix_with_alias(table_alias.as_ref(), column);

        let back_references = if owner.is_root() {
            vec![]
        } else {
            back_references(owner, &prefix)?
        };

        let qualifier = if owner.is_qualified() {
            let property = owner.required_leaf_property()?;
            let name = match property.key_column_override() {
                Some(name) => name.clone(),
                None => {
                    let property_owner = owner.parent_path()?.required_leaf_entity()?;
                    let reverse = settings
                        .naming
                        .reverse_column_name(&property_owner.owner_name(settings));
                    settings.derived(settings.naming.key_column(&reverse))
                }
            };

            let ty = property.qualifier_type().ok_or_else(|| {
                Error::invalid_path(format!("`{owner:?}` has no qualifier type"))
            })?;

            Some((
                ColumnInfo {
                    alias: prefix(&name),
                    name,
                },
                ty,
            ))
        } else {
            None
        };

        let id_columns = key_columns(owner, entity)?
            .into_iter()
            .map(|(name, _, _)| ColumnInfo {
                alias: prefix(&name),
                name,
            })
            .collect();

        Ok(TableInfo {
            qualified_table_name: entity.qualified_table_name().clone(),
            table_alias,
            back_references,
            qualifier,
            id_columns,
        })
    }

    pub fn qualified_table_name(&self) -> &SqlIdentifier {
        &self.qualified_table_name
    }

    pub fn table_alias(&self) -> Option<&SqlIdentifier> {
        self.table_alias.as_ref()
    }

    /// The first column referring to the parent's key.
    pub fn reverse_column(&self) -> Option<&ColumnInfo> {
        self.reverse_columns().next()
    }

    /// Columns referring to the parent's key, one per key column.
    pub fn reverse_columns(&self) -> impl Iterator<Item = &ColumnInfo> + '_ {
        self.back_references
            .iter()
            .filter(|r| matches!(r.source, BackReferenceSource::ParentKey { .. }))
            .map(|r| &r.column)
    }

    pub fn back_references(&self) -> &[BackReference] {
        &self.back_references
    }

    pub fn back_reference_columns(&self) -> impl Iterator<Item = &ColumnInfo> + '_ {
        self.back_references.iter().map(|r| &r.column)
    }

    pub fn qualifier_column(&self) -> Option<&ColumnInfo> {
        self.qualifier.as_ref().map(|(column, _)| column)
    }

    pub fn qualifier_type(&self) -> Option<&ValueType> {
        self.qualifier.as_ref().map(|(_, ty)| ty)
    }

    /// The id column of the stored entity; the first one for composite keys.
    pub fn id_column_name(&self) -> Option<&SqlIdentifier> {
        self.id_columns.first().map(|c| &c.name)
    }

    pub fn id_columns(&self) -> &[ColumnInfo] {
        &self.id_columns
    }

    /// The column that identifies a row for joins: the id column for the
    /// root table, the back-reference column for any other table.
    pub fn effective_id_column_name(&self) -> Option<&SqlIdentifier> {
        match &self.table_alias {
            None => self.id_column_name(),
            Some(_) => self.reverse_column().map(|c| &c.name),
        }
    }
}

impl ColumnInfo {
    pub(super) fn of(path: &AggregatePath) -> Result<ColumnInfo> {
        let name = path.column_name()?;
        let table = path.table_info()?;

        Ok(ColumnInfo {
            alias: prefix_with_alias(table.table_alias(), &name),
            name,
        })
    }
}

fn prefix_with_alias(alias: Option<&SqlIdentifier>, column: &SqlIdentifier) -> SqlIdentifier {
    match alias {
        Some(alias) => alias.transform(|alias| format!("{alias}__{}", column.reference())),
        None => column.clone(),
    }
}

/// Key columns of `entity` stored at `path`, with their types and the
/// property names leading to each value.
fn key_columns(
    path: &AggregatePath,
    entity: &PersistentEntity,
) -> Result<Vec<(SqlIdentifier, ValueType, Vec<String>)>> {
    let Some(id) = entity.id_property() else {
        return Ok(vec![]);
    };

    if let Some(ty) = id.value_type() {
        return Ok(vec![(
            id.column_name().clone(),
            ty.clone(),
            vec![id.name().to_string()],
        )]);
    }

    // Composite key: an embedded value of simple properties
    let prefix = id.embedded_prefix().unwrap_or_default();
    let target = id
        .target()
        .ok_or_else(|| Error::invalid_schema(format!("id `{}` has no type", id.name())))?;
    let key_entity = path.context()?.entity(target)?;

    key_entity
        .properties()
        .map(|part| {
            let ty = part.value_type().cloned().ok_or_else(|| {
                Error::invalid_schema(format!(
                    "composite id `{}` contains non-simple property `{}`",
                    id.name(),
                    part.name()
                ))
            })?;
            Ok((
                part.column_name()
                    .transform(|name| format!("{prefix}{name}")),
                ty,
                vec![id.name().to_string(), part.name().to_string()],
            ))
        })
        .collect()
}

fn back_references(
    owner: &AggregatePath,
    prefix: &dyn Fn(&SqlIdentifier) -> SqlIdentifier,
) -> Result<Vec<BackReference>> {
    let settings = owner.settings();
    let parent = owner.id_defining_parent_path()?;
    let parent_entity = parent.required_leaf_entity()?;
    let property = owner.required_leaf_property()?;

    let reverse = match property.reverse_column_override() {
        Some(name) => name.clone(),
        None => settings.derived(
            settings
                .naming
                .reverse_column_name(&parent_entity.owner_name(settings)),
        ),
    };

    let mut out = vec![];
    let keys = key_columns(&parent, parent_entity)?;

    if keys.is_empty() {
        out.push(BackReference {
            column: ColumnInfo {
                alias: prefix(&reverse),
                name: reverse,
            },
            ty: None,
            source: BackReferenceSource::ParentKey {
                parent: parent.clone(),
                referenced: None,
                property: vec![],
            },
        });
    } else {
        let composite = keys.len() > 1;
        for (referenced, ty, property) in keys {
            let name = if composite {
                reverse.transform(|name| format!("{name}_{}", referenced.reference()))
            } else {
                reverse.clone()
            };

            out.push(BackReference {
                column: ColumnInfo {
                    alias: prefix(&name),
                    name,
                },
                ty: Some(ty),
                source: BackReferenceSource::ParentKey {
                    parent: parent.clone(),
                    referenced: Some(referenced),
                    property,
                },
            });
        }
    }

    // Qualifiers of the collections strictly between the id-defining parent
    // and this table, outermost first
    let mut between: Vec<AggregatePath> = owner
        .ancestors()
        .skip(1)
        .take_while(|p| **p != parent)
        .filter(|p| p.is_qualified())
        .cloned()
        .collect();
    between.reverse();

    for collection in between {
        let info = collection.table_info()?;
        let (Some(column), Some(ty)) = (info.qualifier_column(), info.qualifier_type()) else {
            continue;
        };

        out.push(BackReference {
            column: ColumnInfo {
                name: column.name.clone(),
                alias: prefix(&column.name),
            },
            ty: Some(ty.clone()),
            source: BackReferenceSource::Qualifier(collection.clone()),
        });
    }

    Ok(out)
}
