use rand::{seq::SliceRandom, thread_rng};
use std::{collections::HashSet, hash::Hash};

pub trait SliceUtil<T> {
    /// Returns `true` if no element appears twice.
    fn is_unique(&self) -> bool
    where
        T: Eq + Hash;

    /// Position of the first element matching `pred`.
    fn index_where(&self, pred: impl FnMut(&T) -> bool) -> Option<usize>;

    /// Shuffles in place using the thread-local RNG.
    fn shuffled(&mut self);
}

impl<T> SliceUtil<T> for [T] {
    fn is_unique(&self) -> bool
    where
        T: Eq + Hash,
    {
        let mut seen = HashSet::with_capacity(self.len());
        self.iter().all(|el| seen.insert(el))
    }

    fn index_where(&self, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.iter().position(pred)
    }

    fn shuffled(&mut self) {
        self.shuffle(&mut thread_rng());
    }
}

#[macro_export]
macro_rules! assert_unique {
    ($slice:expr) => {{
        use $crate::slice::SliceUtil;
        let slice = &$slice[..];
        assert!(
            slice.is_unique(),
            "expected `{}` to hold unique values; actual={:?}",
            stringify!($slice),
            slice,
        );
    }};
}

#[macro_export]
macro_rules! assert_empty {
    ($slice:expr) => {{
        let slice = &$slice[..];
        assert!(slice.is_empty(), "expected empty; actual={:?}", slice);
    }};
}

/// Asserts that the first element matching `$first` comes before the first
/// element matching `$second`.
#[macro_export]
macro_rules! assert_ordered {
    ($slice:expr, $first:expr, $second:expr) => {{
        use $crate::slice::SliceUtil;
        let slice = &$slice[..];
        let a = slice
            .index_where($first)
            .unwrap_or_else(|| panic!("no element matches `{}`", stringify!($first)));
        let b = slice
            .index_where($second)
            .unwrap_or_else(|| panic!("no element matches `{}`", stringify!($second)));
        assert!(
            a < b,
            "expected `{}` (at {a}) before `{}` (at {b}); actual={:?}",
            stringify!($first),
            stringify!($second),
            slice,
        );
    }};
}
