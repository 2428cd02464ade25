// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::Slice;
use std::collections::btree_map::{BTreeMap, IntoIter, Iter};

/// Ordered set of column mutations forming one row batch
///
/// Keys are column names, ordered byte-lexicographically. A `None` value
/// denotes a column tombstone; an empty map denotes a row-level deletion
/// request (which the backing store does not support, see
/// [`Store::set_columns`](crate::Store::set_columns)).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BlockMap(BTreeMap<Slice, Option<Slice>>);

impl BlockMap {
    /// Creates an empty block map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a column write.
    pub fn insert<K: Into<Slice>, V: Into<Slice>>(&mut self, name: K, value: V) {
        self.0.insert(name.into(), Some(value.into()));
    }

    /// Stages a column tombstone.
    pub fn tombstone<K: Into<Slice>>(&mut self, name: K) {
        self.0.insert(name.into(), None);
    }

    /// Returns the staged value for a column name, if any.
    #[must_use]
    pub fn get(&self, name: &[u8]) -> Option<&Option<Slice>> {
        self.0.get(name)
    }

    /// Returns the number of staged mutations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no mutations are staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the staged mutations in column name order.
    pub fn iter(&self) -> Iter<'_, Slice, Option<Slice>> {
        self.0.iter()
    }
}

impl IntoIterator for BlockMap {
    type Item = (Slice, Option<Slice>);
    type IntoIter = IntoIter<Slice, Option<Slice>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BlockMap {
    type Item = (&'a Slice, &'a Option<Slice>);
    type IntoIter = Iter<'a, Slice, Option<Slice>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Slice, Option<Slice>)> for BlockMap {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (Slice, Option<Slice>)>,
    {
        Self(iter.into_iter().collect())
    }
}
