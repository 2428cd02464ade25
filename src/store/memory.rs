// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::Store;
use crate::{time::unix_timestamp_millis, BlockMap, Slice};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Clone, Debug)]
struct Column {
    value: Slice,
    timestamp: i64,
}

type Row = BTreeMap<Slice, Column>;

#[derive(Default)]
struct Inner {
    schema_ready: bool,
    rows: BTreeMap<Slice, Row>,
}

/// In-process [`Store`] over plain maps
///
/// Models the parts of the wide-column contract the directory layer relies
/// on: per-column last-write-wins by mutation timestamp, atomic per-row
/// batches, column tombstones, and the row-deletion no-op. Used by the test
/// suite and useful for embedding without a running cluster.
pub struct MemoryStore {
    keyspace: String,
    column_family: String,
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store for the given keyspace and column family.
    #[must_use]
    pub fn new(keyspace: &str, column_family: &str) -> Self {
        Self {
            keyspace: keyspace.to_string(),
            column_family: column_family.to_string(),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Number of rows physically present, tombstoned files included.
    #[must_use]
    pub fn row_count(&self) -> usize {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let inner = self.inner.read().expect("lock is poisoned");

        inner.rows.len()
    }

    /// All column names physically present under a row, garbage included.
    #[doc(hidden)]
    #[must_use]
    pub fn raw_column_names(&self, row: &[u8]) -> Vec<Slice> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let inner = self.inner.read().expect("lock is poisoned");

        inner
            .rows
            .get(row)
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl Store for MemoryStore {
    fn initialize(&self) -> crate::Result<()> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let mut inner = self.inner.write().expect("lock is poisoned");

        if inner.schema_ready {
            log::trace!(
                "keyspace {:?} and column family {:?} already exist",
                self.keyspace,
                self.column_family,
            );
        } else {
            log::debug!(
                "created keyspace {:?} with column family {:?}",
                self.keyspace,
                self.column_family,
            );
            inner.schema_ready = true;
        }

        Ok(())
    }

    fn list_rows_with_column(&self, column: &[u8]) -> crate::Result<Vec<Slice>> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let inner = self.inner.read().expect("lock is poisoned");

        Ok(inner
            .rows
            .iter()
            .filter(|(_, row)| row.contains_key(column))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn get_column(&self, row: &[u8], column: &[u8]) -> crate::Result<Option<Slice>> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let inner = self.inner.read().expect("lock is poisoned");

        Ok(inner
            .rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|c| c.value.clone()))
    }

    fn get_columns(&self, row: &[u8], columns: &[Slice]) -> crate::Result<FxHashMap<Slice, Slice>> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let inner = self.inner.read().expect("lock is poisoned");

        let mut result = FxHashMap::default();

        if let Some(r) = inner.rows.get(row) {
            for name in columns {
                if let Some(column) = r.get(name) {
                    result.insert(name.clone(), column.value.clone());
                }
            }
        }

        Ok(result)
    }

    fn set_columns(&self, row: &[u8], batch: &BlockMap) -> crate::Result<()> {
        if batch.is_empty() {
            // row-level deletion is unsupported
            log::trace!("ignoring row deletion request for {row:?}");
            return Ok(());
        }

        let timestamp = unix_timestamp_millis();

        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let mut inner = self.inner.write().expect("lock is poisoned");

        let columns = inner.rows.entry(Slice::new(row)).or_default();

        for (name, value) in batch {
            match value {
                Some(value) => {
                    let stale = columns
                        .get(name)
                        .is_some_and(|existing| existing.timestamp > timestamp);

                    if !stale {
                        columns.insert(
                            name.clone(),
                            Column {
                                value: value.clone(),
                                timestamp,
                            },
                        );
                    }
                }
                None => {
                    columns.remove(name);
                }
            }
        }

        Ok(())
    }
}
