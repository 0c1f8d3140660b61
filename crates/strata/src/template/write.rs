use strata_core::schema::path::BackReferenceSource;
use strata_core::schema::{AggregatePath, PersistentProperty};
use strata_core::stmt::{Identifier, Object, Record, Value};
use strata_core::{Error, Result};
use strata_sql::generator::{param_name, ID_SQL_PARAMETER};
use strata_sql::ParameterSource;

use std::sync::Arc;

/// Binds every column stored in the table of `root`, navigating `record`
/// through embedded values. Missing values bind as `NULL`.
pub(super) fn column_params(root: &AggregatePath, record: &Record) -> Result<ParameterSource> {
    let mut params = ParameterSource::new();

    for path in root.descendants()? {
        if path.is_entity() || path.table_owning_path() != *root {
            continue;
        }

        let value = value_at(record, names_below(&path, root));
        params.add(param_name(&path.column_name()?), value);
    }

    Ok(params)
}

/// Binds an aggregate id: `:id` for a simple id, one parameter per key
/// column for an embedded key.
pub(super) fn id_params(root: &AggregatePath, id: &Object) -> Result<ParameterSource> {
    match id {
        Object::Value(value) => Ok(ParameterSource::new().with(ID_SQL_PARAMETER, value.clone())),
        Object::Record(key) => {
            let id_path = root.append(root.required_id_property()?.name())?;
            let mut params = ParameterSource::new();

            for path in id_path.descendants()? {
                if path.is_entity() {
                    continue;
                }
                let value = value_at(key, names_below(&path, &id_path));
                params.add(param_name(&path.column_name()?), value);
            }

            Ok(params)
        }
        _ => Err(Error::unsupported_feature(
            "an id must be a simple value or an embedded key",
        )),
    }
}

/// Paths of the tables whose rows hang directly off the row of `path`.
pub(super) fn child_tables(path: &AggregatePath) -> Result<Vec<AggregatePath>> {
    let mut out = vec![];

    for child in path.descendants()? {
        if !child.is_entity() || child.is_embedded() {
            continue;
        }
        if child.parent_path()?.table_owning_path() == *path {
            out.push(child);
        }
    }

    Ok(out)
}

/// The value reached by following `names` from `record`; `Null` as soon as
/// a step is missing.
pub(super) fn value_at<'a>(record: &Record, names: impl IntoIterator<Item = &'a str>) -> Value {
    let mut names = names.into_iter().peekable();
    let mut current = record;

    while let Some(name) = names.next() {
        if names.peek().is_none() {
            return current.value(name).clone();
        }
        match current.get(name).and_then(Object::as_record) {
            Some(next) => current = next,
            None => break,
        }
    }

    Value::Null
}

/// The object stored at `segments` below `record`, reached through nested
/// records.
pub(super) fn slot_at<'r>(
    record: &'r mut Record,
    segments: &[Arc<PersistentProperty>],
) -> Option<&'r mut Object> {
    let (last, parents) = segments.split_last()?;
    let mut current = record;

    for property in parents {
        match current.get_mut(property.name()) {
            Some(Object::Record(next)) => current = next,
            _ => return None,
        }
    }

    current.get_mut(last.name())
}

pub(super) fn names_below<'a>(
    path: &'a AggregatePath,
    base: &AggregatePath,
) -> impl Iterator<Item = &'a str> + 'a {
    path.segments()[base.len()..].iter().map(|p| p.name())
}

/// A row just written, seen from the tables below it.
pub(super) struct ParentRow<'a> {
    pub(super) path: &'a AggregatePath,
    pub(super) record: &'a Record,

    /// The back references the row was written with, including its own
    /// qualifier
    pub(super) identifier: &'a Identifier,
}

impl ParentRow<'_> {
    /// The back references of one row of `child`. `qualifier` is the list
    /// index or map key of the element.
    pub(super) fn identifier_for(
        &self,
        child: &AggregatePath,
        qualifier: Option<Value>,
    ) -> Result<Identifier> {
        let info = child.table_info()?;
        let mut identifier = Identifier::empty();
        let mut key_index = 0;

        for reference in info.back_references() {
            let value = match &reference.source {
                BackReferenceSource::ParentKey { parent, property, .. } => {
                    key_index += 1;

                    if parent == self.path {
                        if property.is_empty() {
                            return Err(Error::invalid_path(format!(
                                "{child:?} refers to {parent:?}, which has no id"
                            )));
                        }
                        value_at(self.record, property.iter().map(String::as_str))
                    } else {
                        self.identifier
                            .parts()
                            .get(key_index - 1)
                            .map(|part| part.value.clone())
                            .ok_or_else(|| {
                                Error::invalid_path(format!(
                                    "no key of {parent:?} is known while writing {child:?}"
                                ))
                            })?
                    }
                }
                BackReferenceSource::Qualifier(element) => self
                    .identifier
                    .get(&reference.column.name)
                    .cloned()
                    .ok_or_else(|| {
                        Error::invalid_path(format!(
                            "no element of {element:?} is known while writing {child:?}"
                        ))
                    })?,
            };

            if value.is_null() {
                return Err(Error::invalid_path(format!(
                    "back reference `{}` of {child:?} is null",
                    reference.column.name.reference()
                )));
            }

            let ty = reference.ty.clone().or_else(|| value.ty()).ok_or_else(|| {
                Error::invalid_path(format!(
                    "back reference `{}` has no type",
                    reference.column.name.reference()
                ))
            })?;
            identifier = identifier.with_part(reference.column.name.clone(), value.cast(&ty)?, ty);
        }

        if let (Some(qualifier), Some(column), Some(ty)) =
            (qualifier, info.qualifier_column(), info.qualifier_type())
        {
            identifier = identifier.with_part(column.name.clone(), qualifier.cast(ty)?, ty.clone());
        }

        Ok(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_at_follows_nested_records() {
        let record = Record::new("Person")
            .with_value("name", "Ada")
            .with(
                "address",
                Record::new("Address").with_value("city", "London"),
            );

        assert_eq!(value_at(&record, ["name"]), Value::from("Ada"));
        assert_eq!(value_at(&record, ["address", "city"]), Value::from("London"));
        assert_eq!(value_at(&record, ["address", "street"]), Value::Null);
        assert_eq!(value_at(&record, ["missing", "city"]), Value::Null);
        assert_eq!(value_at(&record, std::iter::empty()), Value::Null);
    }
}
