// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    coding::Decode, time::unix_timestamp_millis, BlockMap, FileDescriptor, FileRow, Reader, Slice,
    Store, Writer, DESCRIPTOR_COLUMN,
};
use std::sync::Arc;

/// A namespace of files backed by one column family
///
/// Each file is one row; the file's inode lives under the well-known
/// `DESCRIPTOR` column of that row. Deletion is logical: a tombstone flag
/// on the descriptor, because the backing store cannot remove rows.
///
/// Opened through [`Config::open`](crate::Config::open). The store session
/// is shared; directory handles are cheap to pass around by reference.
pub struct Directory {
    store: Arc<dyn Store>,
    block_size: u64,
    buffer_size: usize,
}

impl Directory {
    pub(crate) fn new(store: Arc<dyn Store>, block_size: u64, buffer_size: usize) -> Self {
        Self {
            store,
            block_size,
            buffer_size,
        }
    }

    /// Lists the names of all live files.
    ///
    /// Logically deleted files are skipped. The order of names follows the
    /// store's row enumeration and carries no meaning.
    ///
    /// # Errors
    ///
    /// Will return `Err` on transport failure or a malformed descriptor.
    pub fn list(&self) -> crate::Result<Vec<String>> {
        let keys = self
            .store
            .list_rows_with_column(DESCRIPTOR_COLUMN.as_bytes())?;

        log::debug!("listing {} rows", keys.len());

        let mut names = Vec::with_capacity(keys.len());

        for key in keys {
            // a row can lose its descriptor between the scan and this read
            let Some(payload) = self.store.get_column(&key, DESCRIPTOR_COLUMN.as_bytes())? else {
                continue;
            };

            let descriptor = self.decode_descriptor(&payload)?;

            if !descriptor.deleted {
                names.push(descriptor.name);
            }
        }

        Ok(names)
    }

    /// Returns `true` if the file exists and is not logically deleted.
    ///
    /// Any store failure degrades to `false`.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        matches!(self.load_descriptor(name, false), Ok(Some(d)) if !d.deleted)
    }

    /// Returns the logical byte length of a file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file is absent or deleted, or on transport
    /// failure.
    pub fn length(&self, name: &str) -> crate::Result<u64> {
        Ok(self.live_descriptor(name)?.length)
    }

    /// Returns the last-modified timestamp of a file in milliseconds.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file is absent or deleted, or on transport
    /// failure.
    pub fn modified(&self, name: &str) -> crate::Result<i64> {
        Ok(self.live_descriptor(name)?.last_modified)
    }

    /// Bumps the last-modified timestamp of a file to now.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file is absent or deleted, or on transport
    /// failure.
    pub fn touch(&self, name: &str) -> crate::Result<()> {
        let mut descriptor = self.live_descriptor(name)?;
        descriptor.last_modified = unix_timestamp_millis();
        self.store_descriptor(&descriptor)
    }

    /// Logically deletes a file.
    ///
    /// The descriptor is flagged; the row and its block columns remain in
    /// the store as dead bytes.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file is absent or already deleted, or on
    /// transport failure.
    pub fn delete(&self, name: &str) -> crate::Result<()> {
        log::debug!("deleting {name:?}");

        let mut descriptor = self.live_descriptor(name)?;
        descriptor.deleted = true;
        self.store_descriptor(&descriptor)
    }

    /// Opens a write stream over a file, creating it if needed.
    ///
    /// An existing live file is resumed: its bytes are kept and the write
    /// cursor starts at position 0. A logically deleted file is revived as
    /// a fresh empty file under the same name.
    ///
    /// At most one writer per file may be active; a second concurrent
    /// writer's flushes race at the store level (last flush wins).
    ///
    /// # Errors
    ///
    /// Will return `Err` on transport failure or a malformed descriptor.
    pub fn create_output(&self, name: &str) -> crate::Result<Writer> {
        log::debug!("creating output for {name:?}");

        #[expect(clippy::expect_used, reason = "create_if_missing always yields a descriptor")]
        let mut descriptor = self
            .load_descriptor(name, true)?
            .expect("descriptor was just created");

        if descriptor.deleted {
            descriptor = FileDescriptor::new(name, self.block_size, unix_timestamp_millis());
            self.store_descriptor(&descriptor)?;
        }

        Ok(Writer::new(
            FileRow::new(self.store.clone(), name),
            descriptor,
            self.buffer_size,
        ))
    }

    /// Opens a read stream over a file.
    ///
    /// The reader works against a descriptor snapshot taken here; flushes
    /// by a concurrent writer are not observed until the file is reopened.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file is absent or deleted, or on transport
    /// failure.
    pub fn open_input(&self, name: &str) -> crate::Result<Reader> {
        log::debug!("opening input for {name:?}");

        let descriptor = self.live_descriptor(name)?;

        Ok(Reader::new(
            FileRow::new(self.store.clone(), name),
            descriptor,
            self.buffer_size,
        ))
    }

    /// Loads a file's descriptor.
    ///
    /// With `create_if_missing`, an absent descriptor is initialized empty
    /// with the directory's block size and persisted immediately.
    ///
    /// # Errors
    ///
    /// Will return `Err` on transport failure or a malformed descriptor.
    pub fn load_descriptor(
        &self,
        name: &str,
        create_if_missing: bool,
    ) -> crate::Result<Option<FileDescriptor>> {
        let payload = self
            .store
            .get_column(name.as_bytes(), DESCRIPTOR_COLUMN.as_bytes())?;

        match payload {
            Some(payload) => Ok(Some(self.decode_descriptor(&payload)?)),
            None if create_if_missing => {
                let descriptor =
                    FileDescriptor::new(name, self.block_size, unix_timestamp_millis());
                self.store_descriptor(&descriptor)?;
                Ok(Some(descriptor))
            }
            None => Ok(None),
        }
    }

    /// Persists a descriptor as a single-column batch under its row.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the descriptor cannot be encoded or on
    /// transport failure.
    pub fn store_descriptor(&self, descriptor: &FileDescriptor) -> crate::Result<()> {
        FileRow::new(self.store.clone(), &descriptor.name)
            .write_blocks(descriptor, BlockMap::new())
    }

    /// Releases the directory handle.
    ///
    /// The underlying store session is shared and stays open.
    pub fn close(self) {}

    /// The configured maximum number of logical bytes per block.
    #[must_use]
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// The configured write-behind / read-ahead buffer size.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn live_descriptor(&self, name: &str) -> crate::Result<FileDescriptor> {
        match self.load_descriptor(name, false)? {
            Some(d) if !d.deleted => Ok(d),
            _ => Err(crate::Error::FileNotFound(name.to_string())),
        }
    }

    fn decode_descriptor(&self, payload: &Slice) -> crate::Result<FileDescriptor> {
        let mut reader = payload.as_ref();
        let mut descriptor = FileDescriptor::decode_from(&mut reader)?;

        // older payloads omit the block size
        if descriptor.block_size == 0 {
            descriptor.block_size = self.block_size;
        }

        Ok(descriptor)
    }
}
