use strata_core::stmt::{Object, Value};

/// A chain of conditions, combined left to right.
///
/// ```
/// # use strata_sql::Criteria;
/// let criteria = Criteria::where_("name")
///     .is("Alfred")
///     .and("age")
///     .greater_than(30)
///     .or_group(Criteria::where_("nick").is_null());
/// assert_eq!(criteria.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node {
    pub(crate) combinator: Combinator,
    pub(crate) kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Condition {
        column: String,
        comparator: Comparator,
        value: CriteriaValue,
        ignore_case: bool,
    },

    /// Nested criteria, rendered in parentheses
    Group(Criteria),
}

/// How a node joins the conditions before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Initial,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    In,
    NotIn,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
    IsTrue,
    IsFalse,
}

/// The right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaValue {
    /// Comparators without operand
    None,

    Single(Value),

    Iterable(Vec<Value>),

    Pair(Value, Value),

    /// A LIKE operand whose wildcards are escaped before it is wrapped
    Pattern(PatternKind, String),

    /// An embedded value, compared property by property
    Object(Object),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// `%value%`
    Containing,

    /// `value%`
    StartingWith,

    /// `%value`
    EndingWith,
}

/// A column waiting for its comparator.
#[derive(Debug, Clone)]
#[must_use]
pub struct CriteriaStep {
    criteria: Criteria,
    combinator: Combinator,
    column: String,
}

impl Criteria {
    /// Matches everything.
    pub fn empty() -> Criteria {
        Criteria::default()
    }

    /// Starts a chain at `column`, a property path such as `"name"` or
    /// `"address.city"`, or a raw column name.
    pub fn where_(column: impl Into<String>) -> CriteriaStep {
        CriteriaStep {
            criteria: Criteria::empty(),
            combinator: Combinator::Initial,
            column: column.into(),
        }
    }

    pub fn and(self, column: impl Into<String>) -> CriteriaStep {
        self.step(Combinator::And, column.into())
    }

    pub fn or(self, column: impl Into<String>) -> CriteriaStep {
        self.step(Combinator::Or, column.into())
    }

    pub fn and_group(self, group: Criteria) -> Criteria {
        self.push_group(Combinator::And, group)
    }

    pub fn or_group(self, group: Criteria) -> Criteria {
        self.push_group(Combinator::Or, group)
    }

    /// Makes the most recent condition case-insensitive.
    pub fn ignore_case(mut self, ignore_case: bool) -> Criteria {
        if let Some(Node {
            kind: NodeKind::Condition {
                ignore_case: flag, ..
            },
            ..
        }) = self.nodes.last_mut()
        {
            *flag = ignore_case;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn step(self, combinator: Combinator, column: String) -> CriteriaStep {
        let combinator = if self.is_empty() {
            Combinator::Initial
        } else {
            combinator
        };

        CriteriaStep {
            criteria: self,
            combinator,
            column,
        }
    }

    fn push_group(mut self, combinator: Combinator, group: Criteria) -> Criteria {
        if group.is_empty() {
            return self;
        }

        let combinator = if self.is_empty() {
            Combinator::Initial
        } else {
            combinator
        };

        self.nodes.push(Node {
            combinator,
            kind: NodeKind::Group(group),
        });
        self
    }
}

impl CriteriaStep {
    pub fn is(self, value: impl Into<Value>) -> Criteria {
        self.with(Comparator::Eq, CriteriaValue::Single(value.into()))
    }

    /// Compares an embedded property against a whole embedded value.
    pub fn is_object(self, value: impl Into<Object>) -> Criteria {
        self.with(Comparator::Eq, CriteriaValue::Object(value.into()))
    }

    pub fn not(self, value: impl Into<Value>) -> Criteria {
        self.with(Comparator::Neq, CriteriaValue::Single(value.into()))
    }

    pub fn less_than(self, value: impl Into<Value>) -> Criteria {
        self.with(Comparator::Lt, CriteriaValue::Single(value.into()))
    }

    pub fn less_than_or_equals(self, value: impl Into<Value>) -> Criteria {
        self.with(Comparator::Lte, CriteriaValue::Single(value.into()))
    }

    pub fn greater_than(self, value: impl Into<Value>) -> Criteria {
        self.with(Comparator::Gt, CriteriaValue::Single(value.into()))
    }

    pub fn greater_than_or_equals(self, value: impl Into<Value>) -> Criteria {
        self.with(Comparator::Gte, CriteriaValue::Single(value.into()))
    }

    /// A LIKE with a user supplied pattern, passed through unescaped.
    pub fn like(self, pattern: impl Into<Value>) -> Criteria {
        self.with(Comparator::Like, CriteriaValue::Single(pattern.into()))
    }

    pub fn not_like(self, pattern: impl Into<Value>) -> Criteria {
        self.with(Comparator::NotLike, CriteriaValue::Single(pattern.into()))
    }

    pub fn containing(self, value: impl Into<String>) -> Criteria {
        self.pattern(PatternKind::Containing, value.into())
    }

    pub fn starting_with(self, value: impl Into<String>) -> Criteria {
        self.pattern(PatternKind::StartingWith, value.into())
    }

    pub fn ending_with(self, value: impl Into<String>) -> Criteria {
        self.pattern(PatternKind::EndingWith, value.into())
    }

    pub fn in_<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Criteria {
        let values = values.into_iter().map(Into::into).collect();
        self.with(Comparator::In, CriteriaValue::Iterable(values))
    }

    pub fn not_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Criteria {
        let values = values.into_iter().map(Into::into).collect();
        self.with(Comparator::NotIn, CriteriaValue::Iterable(values))
    }

    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Criteria {
        self.with(
            Comparator::Between,
            CriteriaValue::Pair(low.into(), high.into()),
        )
    }

    pub fn not_between(self, low: impl Into<Value>, high: impl Into<Value>) -> Criteria {
        self.with(
            Comparator::NotBetween,
            CriteriaValue::Pair(low.into(), high.into()),
        )
    }

    pub fn is_null(self) -> Criteria {
        self.with(Comparator::IsNull, CriteriaValue::None)
    }

    pub fn is_not_null(self) -> Criteria {
        self.with(Comparator::IsNotNull, CriteriaValue::None)
    }

    pub fn is_true(self) -> Criteria {
        self.with(Comparator::IsTrue, CriteriaValue::None)
    }

    pub fn is_false(self) -> Criteria {
        self.with(Comparator::IsFalse, CriteriaValue::None)
    }

    /// Adds a condition with an arbitrary comparator and value. The value
    /// shape is checked when the criteria is mapped.
    pub fn with(self, comparator: Comparator, value: CriteriaValue) -> Criteria {
        let mut criteria = self.criteria;
        criteria.nodes.push(Node {
            combinator: self.combinator,
            kind: NodeKind::Condition {
                column: self.column,
                comparator,
                value,
                ignore_case: false,
            },
        });
        criteria
    }

    fn pattern(self, kind: PatternKind, value: String) -> Criteria {
        self.with(Comparator::Like, CriteriaValue::Pattern(kind, value))
    }
}

impl PatternKind {
    /// Wraps an already escaped value in wildcards.
    pub fn wrap(&self, escaped: &str) -> String {
        match self {
            PatternKind::Containing => format!("%{escaped}%"),
            PatternKind::StartingWith => format!("{escaped}%"),
            PatternKind::EndingWith => format!("%{escaped}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_node_is_initial() {
        let criteria = Criteria::empty().and("name").is("x");
        assert_eq!(criteria.nodes()[0].combinator, Combinator::Initial);

        let criteria = criteria.or("age").is(3);
        assert_eq!(criteria.nodes()[1].combinator, Combinator::Or);
    }

    #[test]
    fn empty_groups_are_dropped() {
        let criteria = Criteria::where_("name")
            .is("x")
            .and_group(Criteria::empty());
        assert_eq!(criteria.len(), 1);
    }

    #[test]
    fn ignore_case_applies_to_last_condition() {
        let criteria = Criteria::where_("a")
            .is("x")
            .and("b")
            .is("y")
            .ignore_case(true);

        let flags: Vec<bool> = criteria
            .nodes()
            .iter()
            .map(|node| match node.kind {
                NodeKind::Condition { ignore_case, .. } => ignore_case,
                NodeKind::Group(_) => false,
            })
            .collect();
        assert_eq!(flags, [false, true]);
    }
}
