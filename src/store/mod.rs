// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// In-process store over plain maps
pub mod memory;

pub use memory::MemoryStore;

use crate::{BlockMap, Slice};
use rustc_hash::FxHashMap;

/// Thin facade over one column family of a wide-column store
///
/// All operations are synchronous and round-trip to the store. Mutations
/// carry millisecond timestamps and are applied at the store's minimum
/// consistency level (one replica acknowledges); per-column last-write-wins
/// is assumed. A batch on one row is observed atomically.
///
/// Transport failures are surfaced as [`Error::Io`](crate::Error::Io) and
/// never retried at this layer.
///
/// Implementations are shared across directory handles and file streams,
/// so they must be [`Send`] + [`Sync`].
pub trait Store: Send + Sync {
    /// Creates the keyspace and column family if absent.
    ///
    /// Must be idempotent: "already exists" conditions are ignored.
    ///
    /// # Errors
    ///
    /// Will return `Err` on transport failure.
    fn initialize(&self) -> crate::Result<()>;

    /// Enumerates the keys of rows that have the given column.
    ///
    /// Key order depends on the store's partitioner; callers must not rely
    /// on it.
    ///
    /// # Errors
    ///
    /// Will return `Err` on transport failure.
    fn list_rows_with_column(&self, column: &[u8]) -> crate::Result<Vec<Slice>>;

    /// Reads a single column of a row.
    ///
    /// # Errors
    ///
    /// Will return `Err` on transport failure.
    fn get_column(&self, row: &[u8], column: &[u8]) -> crate::Result<Option<Slice>>;

    /// Reads a set of named columns of a row in one round-trip.
    ///
    /// Absent columns are simply missing from the result map.
    ///
    /// # Errors
    ///
    /// Will return `Err` on transport failure.
    fn get_columns(&self, row: &[u8], columns: &[Slice]) -> crate::Result<FxHashMap<Slice, Slice>>;

    /// Atomically applies a batch of column mutations to one row.
    ///
    /// A `None` value in the batch is a column tombstone. An empty batch is
    /// a row-level deletion request, which the store does not support; it
    /// is accepted and ignored.
    ///
    /// # Errors
    ///
    /// Will return `Err` on transport failure.
    fn set_columns(&self, row: &[u8], batch: &BlockMap) -> crate::Result<()>;
}
