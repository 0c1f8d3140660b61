use super::criteria::{Comparator, Criteria, CriteriaValue, NodeKind};
use super::{Combinator, Sort};
use crate::generator::{column_of, param_name, table_of};
use crate::stmt::{BinaryOp, Expr, OrderBy};
use crate::{Dialect, ParameterSource};

use strata_core::schema::{AggregatePath, SqlIdentifier};
use strata_core::stmt::{Object, Record, Value};
use strata_core::{Error, Result};

/// Maps [`Criteria`] and [`Sort`] onto SQL expressions for an aggregate.
///
/// Columns are named by property path relative to the aggregate root
/// (`"name"`, `"embedded.name"`, `"with_id.name"`). Names that do not
/// resolve to a property are used as raw column names of the root table.
#[derive(Debug, Clone, Copy)]
pub struct QueryMapper<'a> {
    dialect: &'a Dialect,
}

/// Where a criteria column points.
enum Target {
    Column { expr: Expr, base: String },
    Embedded(AggregatePath),
}

impl<'a> QueryMapper<'a> {
    pub fn new(dialect: &'a Dialect) -> QueryMapper<'a> {
        QueryMapper { dialect }
    }

    /// Returns the condition for `criteria`, `None` when it is empty,
    /// together with the parameter values it binds.
    pub fn map(
        &self,
        criteria: &Criteria,
        root: &AggregatePath,
    ) -> Result<(Option<Expr>, ParameterSource)> {
        let mut params = ParameterSource::new();
        let condition = self.map_into(criteria, root, &mut params)?;
        Ok((condition, params))
    }

    /// Like [`map`](Self::map), adding parameters to an existing source.
    pub fn map_into(
        &self,
        criteria: &Criteria,
        root: &AggregatePath,
        params: &mut ParameterSource,
    ) -> Result<Option<Expr>> {
        let mut condition: Option<Expr> = None;

        for node in criteria.nodes() {
            let expr = match &node.kind {
                NodeKind::Group(group) => match self.map_into(group, root, params)? {
                    Some(expr) => expr.nested(),
                    None => continue,
                },
                NodeKind::Condition {
                    column,
                    comparator,
                    value,
                    ignore_case,
                } => self
                    .map_condition(root, column, *comparator, value, *ignore_case, params)
                    .map_err(|err| err.context(format!("mapping criteria on `{column}`")))?,
            };

            condition = Some(match (condition, node.combinator) {
                (None, _) | (Some(_), Combinator::Initial) => expr,
                (Some(lhs), Combinator::And) => Expr::and([lhs, expr]),
                (Some(lhs), Combinator::Or) => Expr::or([lhs, expr]),
            });
        }

        Ok(condition)
    }

    /// ORDER BY items for `sort`.
    pub fn map_sort(&self, sort: &Sort, root: &AggregatePath) -> Result<Vec<OrderBy>> {
        sort.orders()
            .iter()
            .map(|order| {
                let Target::Column { expr, .. } = self.resolve(root, &order.property)? else {
                    return Err(Error::unsupported_feature(format!(
                        "cannot sort by embedded value `{}`",
                        order.property
                    )));
                };

                let expr = if order.ignore_case { expr.upper() } else { expr };

                Ok(OrderBy {
                    expr,
                    direction: order.direction,
                    nulls: order.nulls,
                })
            })
            .collect()
    }

    fn map_condition(
        &self,
        root: &AggregatePath,
        column: &str,
        comparator: Comparator,
        value: &CriteriaValue,
        ignore_case: bool,
        params: &mut ParameterSource,
    ) -> Result<Expr> {
        let (expr, base) = match self.resolve(root, column)? {
            Target::Column { expr, base } => (expr, base),
            Target::Embedded(path) => {
                return match (comparator, value) {
                    (Comparator::Eq, CriteriaValue::Object(object)) => {
                        self.map_embedded(&path, object.as_record(), params)
                    }
                    (Comparator::Eq, CriteriaValue::Single(Value::Null))
                    | (Comparator::IsNull, _) => self.map_embedded(&path, None, params),
                    _ => Err(Error::unsupported_feature(format!(
                        "{comparator:?} on embedded value `{column}`"
                    ))),
                };
            }
        };

        let upper = |expr: Expr| if ignore_case { expr.upper() } else { expr };

        let mut bind = |value: &Value, params: &mut ParameterSource| {
            let name = unique_name(params, &base);
            params.add(name.clone(), value.clone());
            upper(Expr::bind(name))
        };

        let condition = match (comparator, value) {
            (Comparator::IsNull, _) => expr.is_null(),
            (Comparator::IsNotNull, _) => expr.is_not_null(),
            (Comparator::IsTrue, _) => Expr::IsTrue(Box::new(expr)),
            (Comparator::IsFalse, _) => Expr::IsFalse(Box::new(expr)),
            (
                Comparator::Eq
                | Comparator::Neq
                | Comparator::Lt
                | Comparator::Lte
                | Comparator::Gt
                | Comparator::Gte,
                CriteriaValue::Single(value),
            ) => {
                let op = match comparator {
                    Comparator::Eq => BinaryOp::Eq,
                    Comparator::Neq => BinaryOp::Ne,
                    Comparator::Lt => BinaryOp::Lt,
                    Comparator::Lte => BinaryOp::Le,
                    Comparator::Gt => BinaryOp::Gt,
                    _ => BinaryOp::Ge,
                };
                upper(expr).binary(op, bind(value, params))
            }
            (Comparator::Like | Comparator::NotLike, CriteriaValue::Single(value)) => Expr::Like {
                expr: Box::new(upper(expr)),
                pattern: Box::new(bind(value, params)),
                negate: comparator == Comparator::NotLike,
                escape: None,
            },
            (Comparator::Like | Comparator::NotLike, CriteriaValue::Pattern(kind, raw)) => {
                let escaper = self.dialect.escaper();
                let pattern = Value::from(kind.wrap(&escaper.escape(raw)));
                Expr::Like {
                    expr: Box::new(upper(expr)),
                    pattern: Box::new(bind(&pattern, params)),
                    negate: comparator == Comparator::NotLike,
                    escape: escaper.escape_clause(),
                }
            }
            (Comparator::In | Comparator::NotIn, CriteriaValue::Single(value)) => Expr::InList {
                expr: Box::new(upper(expr)),
                list: vec![bind(value, params)],
                negate: comparator == Comparator::NotIn,
            },
            (Comparator::In | Comparator::NotIn, CriteriaValue::Iterable(values)) => {
                let list = if values.is_empty() {
                    vec![Expr::literal(Value::Null)]
                } else {
                    values.iter().map(|value| bind(value, params)).collect()
                };
                Expr::InList {
                    expr: Box::new(upper(expr)),
                    list,
                    negate: comparator == Comparator::NotIn,
                }
            }
            (Comparator::Between | Comparator::NotBetween, CriteriaValue::Pair(low, high)) => {
                Expr::Between {
                    expr: Box::new(upper(expr)),
                    low: Box::new(bind(low, params)),
                    high: Box::new(bind(high, params)),
                    negate: comparator == Comparator::NotBetween,
                }
            }
            (Comparator::Between | Comparator::NotBetween, _) => {
                return Err(Error::unsupported_feature(format!(
                    "{comparator:?} requires a pair of values"
                )))
            }
            (comparator, value) => {
                return Err(Error::unsupported_feature(format!(
                    "{comparator:?} does not accept {}",
                    shape(value)
                )))
            }
        };

        Ok(condition)
    }

    /// One equality per simple property of the embedded value, ANDed and
    /// parenthesized. Missing values compare with `IS NULL`.
    fn map_embedded(
        &self,
        path: &AggregatePath,
        record: Option<&Record>,
        params: &mut ParameterSource,
    ) -> Result<Expr> {
        let mut conditions = vec![];
        self.collect_embedded(path, record, params, &mut conditions)?;

        if conditions.is_empty() {
            return Err(Error::unsupported_feature(format!(
                "embedded value `{}` has no columns",
                path.dot_path()
            )));
        }

        Ok(Expr::and(conditions).nested())
    }

    fn collect_embedded(
        &self,
        path: &AggregatePath,
        record: Option<&Record>,
        params: &mut ParameterSource,
        out: &mut Vec<Expr>,
    ) -> Result<()> {
        let entity = path.required_leaf_entity()?;

        for property in entity.properties() {
            let child = path.append(property.name())?;
            let value = record.and_then(|r| r.get(property.name()));

            if child.is_embedded() {
                self.collect_embedded(&child, value.and_then(Object::as_record), params, out)?;
                continue;
            }

            if child.is_entity() {
                return Err(Error::unsupported_feature(format!(
                    "criteria on `{}` reaches entity `{}`",
                    path.dot_path(),
                    property.name()
                )));
            }

            let column = column_of(&child)?;
            match value.and_then(Object::as_value) {
                None | Some(Value::Null) => out.push(column.is_null()),
                Some(value) => {
                    let name = unique_name(params, &param_name(&child.column_name()?));
                    params.add(name.clone(), value.clone());
                    out.push(column.equals(Expr::bind(name)));
                }
            }
        }

        Ok(())
    }

    fn resolve(&self, root: &AggregatePath, column: &str) -> Result<Target> {
        let Some(path) = resolve_path(root, column) else {
            let table = table_of(root)?;
            let name = SqlIdentifier::unquoted(column);
            return Ok(Target::Column {
                base: param_name(&name),
                expr: Expr::column(table.reference(), &name),
            });
        };

        if path.is_multi_valued_below(root) {
            return Err(Error::unsupported_feature(format!(
                "`{column}` is part of a collection and cannot be queried"
            )));
        }

        if path.is_embedded() {
            return Ok(Target::Embedded(path));
        }

        if path.is_entity() {
            return Err(Error::unsupported_feature(format!(
                "`{column}` refers to an entity; query one of its properties instead"
            )));
        }

        Ok(Target::Column {
            base: param_name(&path.column_name()?),
            expr: column_of(&path)?,
        })
    }
}

/// Follows `dotted` from `root`; `None` as soon as a segment is unknown.
fn resolve_path(root: &AggregatePath, dotted: &str) -> Option<AggregatePath> {
    let mut path = root.clone();
    for segment in dotted.split('.') {
        let entity = path.leaf_entity()?;
        entity.property(segment)?;
        path = path.append(segment).ok()?;
    }
    Some(path)
}

/// `name`, or `name` followed by the smallest counter not yet taken.
fn unique_name(params: &ParameterSource, name: &str) -> String {
    if !params.contains(name) {
        return name.to_string();
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{name}{counter}");
        if !params.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn shape(value: &CriteriaValue) -> &'static str {
    match value {
        CriteriaValue::None => "no value",
        CriteriaValue::Single(_) => "a single value",
        CriteriaValue::Iterable(_) => "a list of values",
        CriteriaValue::Pair(..) => "a pair of values",
        CriteriaValue::Pattern(..) => "a pattern",
        CriteriaValue::Object(_) => "an embedded value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_names_count_up() {
        let mut params = ParameterSource::new();
        assert_eq!(unique_name(&params, "name"), "name");
        params.add("name", 1);
        assert_eq!(unique_name(&params, "name"), "name1");
        params.add("name1", 2);
        assert_eq!(unique_name(&params, "name"), "name2");
    }
}
