// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    coding::Encode, BlockMap, FileDescriptor, Slice, Store, DESCRIPTOR_COLUMN,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Maps one file onto one row of the column family
///
/// Reads fetch a set of named block columns in one round-trip; writes add
/// the re-encoded descriptor to the batch, so a flush lands as a single
/// row mutation and readers see either the old or the new file state.
#[derive(Clone)]
pub struct FileRow {
    store: Arc<dyn Store>,
    key: Slice,
}

impl FileRow {
    pub(crate) fn new(store: Arc<dyn Store>, name: &str) -> Self {
        Self {
            store,
            key: Slice::from(name),
        }
    }

    /// The row key (the file name).
    #[must_use]
    pub fn key(&self) -> &Slice {
        &self.key
    }

    /// Fetches the named block columns of this row.
    ///
    /// # Errors
    ///
    /// Will return `Err` on transport failure.
    pub fn read_blocks(&self, names: &[Slice]) -> crate::Result<FxHashMap<Slice, Slice>> {
        self.store.get_columns(&self.key, names)
    }

    /// Writes the staged block columns plus the descriptor as one batch.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the descriptor cannot be encoded or on
    /// transport failure.
    pub fn write_blocks(
        &self,
        descriptor: &FileDescriptor,
        mut batch: BlockMap,
    ) -> crate::Result<()> {
        batch.insert(DESCRIPTOR_COLUMN, descriptor.encode_into_vec()?);

        log::trace!(
            "writing batch of {} columns to row {:?}",
            batch.len(),
            self.key,
        );

        self.store.set_columns(&self.key, &batch)
    }
}
