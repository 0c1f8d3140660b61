use crate::stmt::{Direction, NullOrdering};

/// Ordering of query results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    orders: Vec<Order>,
}

/// One ORDER BY item. `property` is resolved like a criteria column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub property: String,
    pub direction: Direction,
    pub ignore_case: bool,
    pub nulls: NullOrdering,
}

/// A page of results: `size` rows starting at page number `page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable {
    pub page: u64,
    pub size: u64,
    pub sort: Sort,
}

impl Sort {
    pub fn unsorted() -> Sort {
        Sort::default()
    }

    pub fn by(orders: impl IntoIterator<Item = Order>) -> Sort {
        Sort {
            orders: orders.into_iter().collect(),
        }
    }

    pub fn and(mut self, order: Order) -> Sort {
        self.orders.push(order);
        self
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }
}

impl Order {
    pub fn asc(property: impl Into<String>) -> Order {
        Order {
            property: property.into(),
            direction: Direction::Asc,
            ignore_case: false,
            nulls: NullOrdering::Native,
        }
    }

    pub fn desc(property: impl Into<String>) -> Order {
        Order {
            direction: Direction::Desc,
            ..Order::asc(property)
        }
    }

    pub fn ignore_case(mut self) -> Order {
        self.ignore_case = true;
        self
    }

    pub fn nulls_first(mut self) -> Order {
        self.nulls = NullOrdering::First;
        self
    }

    pub fn nulls_last(mut self) -> Order {
        self.nulls = NullOrdering::Last;
        self
    }
}

impl Pageable {
    pub fn of(page: u64, size: u64) -> Pageable {
        Pageable {
            page,
            size,
            sort: Sort::unsorted(),
        }
    }

    pub fn sorted(mut self, sort: Sort) -> Pageable {
        self.sort = sort;
        self
    }

    pub fn offset(&self) -> u64 {
        self.page * self.size
    }
}
