use strata_core::schema::path::BackReferenceSource;
use strata_core::schema::AggregatePath;
use strata_core::stmt::{Identifier, RowDocument, Value};
use strata_core::{Error, Result};

/// Key values known while reading one level of an aggregate.
///
/// Child tables refer to their id-defining parent and to the index or key
/// of every collection element in between. Rows of a nested collection do
/// not select those columns, so the reader carries them down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadScope {
    /// The nearest entity with a key, and its key values in column order
    key: Option<(AggregatePath, Vec<Value>)>,

    /// Qualifiers of the collection elements entered below `key`
    qualifiers: Vec<(AggregatePath, Value)>,
}

impl ReadScope {
    pub fn new() -> ReadScope {
        ReadScope::default()
    }

    /// The scope for the properties of the entity at `path`, read from
    /// `row`. Entities with a key start a fresh scope.
    pub(super) fn enter(&self, path: &AggregatePath, row: &RowDocument) -> Result<ReadScope> {
        if !(path.is_root() || (path.has_id_property() && !path.is_embedded())) {
            return Ok(self.clone());
        }

        let values = path
            .table_info()?
            .id_columns()
            .iter()
            .map(|column| {
                row.get(&column.alias.reference())
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();

        Ok(ReadScope {
            key: Some((path.clone(), values)),
            qualifiers: vec![],
        })
    }

    /// The scope for one element of the collection at `path`.
    pub(super) fn element(&self, path: &AggregatePath, qualifier: Option<&Value>) -> ReadScope {
        let mut scope = self.clone();
        if let Some(qualifier) = qualifier {
            scope.qualifiers.push((path.clone(), qualifier.clone()));
        }
        scope
    }

    /// The identifier selecting the rows of `path` that belong to the
    /// current parent.
    pub fn identifier_for(&self, path: &AggregatePath) -> Result<Identifier> {
        let mut identifier = Identifier::empty();
        let mut key_index = 0;

        for reference in path.table_info()?.back_references() {
            let value = match &reference.source {
                BackReferenceSource::ParentKey { parent, .. } => {
                    let value = self
                        .key
                        .as_ref()
                        .filter(|(key_path, _)| key_path == parent)
                        .and_then(|(_, values)| values.get(key_index))
                        .cloned()
                        .ok_or_else(|| {
                            Error::invalid_path(format!(
                                "no key of {parent:?} is known while reading {path:?}"
                            ))
                        })?;
                    key_index += 1;
                    value
                }
                BackReferenceSource::Qualifier(element) => self
                    .qualifiers
                    .iter()
                    .find(|(qualified, _)| qualified == element)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| {
                        Error::invalid_path(format!(
                            "no element of {element:?} is known while reading {path:?}"
                        ))
                    })?,
            };

            let ty = reference.ty.clone().or_else(|| value.ty()).ok_or_else(|| {
                Error::invalid_path(format!(
                    "back reference `{}` has no type",
                    reference.column.name.reference()
                ))
            })?;

            identifier = identifier.with_part(reference.column.name.clone(), value.cast(&ty)?, ty);
        }

        Ok(identifier)
    }
}
