// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    seek::locate, time::unix_timestamp_millis, BlockMap, Error, FileBlock, FileDescriptor,
    FileRow, Slice,
};

fn past_end(position: u64, length: u64) -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("position {position} is past end of file (length {length})"),
    ))
}

/// Write-behind buffered output stream over one file
///
/// Bytes are collected in a buffer of the configured size; a full buffer
/// (or [`Writer::close`]) flushes as one atomic row batch containing every
/// rewritten block column plus the updated descriptor. [`Writer::seek`]
/// drains the buffer and moves the logical cursor, so overwrites at
/// arbitrary offsets are supported; a write that only partially covers an
/// existing block splits it into fragments around a freshly numbered
/// block instead of re-uploading the untouched bytes.
///
/// The writer owns a private descriptor snapshot. At most one writer per
/// file may be active.
pub struct Writer {
    row: FileRow,
    descriptor: FileDescriptor,
    buffer: Vec<u8>,
    buffer_size: usize,
    buffer_start: u64,
}

impl Writer {
    pub(crate) fn new(row: FileRow, descriptor: FileDescriptor, buffer_size: usize) -> Self {
        Self {
            row,
            descriptor,
            buffer: Vec::with_capacity(buffer_size),
            buffer_size,
            buffer_start: 0,
        }
    }

    /// Appends bytes at the current position, buffering them until a flush.
    ///
    /// # Errors
    ///
    /// Will return `Err` if a buffer flush fails.
    // NOTE: `take` is clamped to both the buffer room and `data.len()`
    #[allow(clippy::indexing_slicing)]
    pub fn write_bytes(&mut self, mut data: &[u8]) -> crate::Result<()> {
        while !data.is_empty() {
            if self.buffer.len() == self.buffer_size {
                self.flush()?;
            }

            let take = (self.buffer_size - self.buffer.len()).min(data.len());

            self.buffer.extend_from_slice(&data[..take]);
            data = &data[take..];
        }

        Ok(())
    }

    /// Moves the logical cursor, draining the buffer first.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the flush fails or the position lies past the
    /// end of the file.
    pub fn seek(&mut self, position: u64) -> crate::Result<()> {
        self.flush()?;

        if position > self.descriptor.length {
            return Err(past_end(position, self.descriptor.length));
        }

        self.buffer_start = position;

        Ok(())
    }

    /// Current logical cursor position, buffered bytes included.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.buffer_start + self.buffer.len() as u64
    }

    /// Logical file length, buffered bytes included.
    #[must_use]
    pub fn length(&self) -> u64 {
        self.descriptor.length.max(self.position())
    }

    /// Drains the buffer into one atomic row batch.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the descriptor cannot be encoded or on
    /// transport failure.
    pub fn flush(&mut self) -> crate::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        log::trace!(
            "flushing {} bytes at position {} of {:?}",
            self.buffer.len(),
            self.buffer_start,
            self.row.key(),
        );

        let mut staged = BlockMap::new();
        plan_write(
            &mut self.descriptor,
            self.buffer_start,
            &self.buffer,
            &mut staged,
        )?;

        let now = unix_timestamp_millis();
        self.descriptor.last_modified = now;
        self.descriptor.last_accessed = now;

        self.row.write_blocks(&self.descriptor, staged)?;

        self.buffer_start += self.buffer.len() as u64;
        self.buffer.clear();

        Ok(())
    }

    /// Flushes any remaining bytes and releases the stream.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the final flush fails.
    pub fn close(mut self) -> crate::Result<()> {
        self.flush()
    }

    #[doc(hidden)]
    #[must_use]
    pub fn descriptor(&self) -> &FileDescriptor {
        &self.descriptor
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            log::warn!(
                "writer for {:?} dropped with {} unflushed bytes",
                self.row.key(),
                self.buffer.len(),
            );
        }
    }
}

/// Positions a freshly written chunk inside its block's capacity window.
///
/// The valid bytes of every block live at `payload[data_offset..]` of its
/// column value, so a chunk landing mid-window is staged behind
/// `data_offset` padding bytes. Fragments taken from the block later keep
/// slicing correctly.
fn window_payload(data_offset: u64, chunk: &[u8]) -> Slice {
    if data_offset == 0 {
        return Slice::new(chunk);
    }

    #[allow(clippy::cast_possible_truncation)]
    let offset = data_offset as usize;

    let mut payload = vec![0u8; offset + chunk.len()];

    #[allow(clippy::indexing_slicing)]
    payload[offset..].copy_from_slice(chunk);

    payload.into()
}

/// Maps a byte range onto the block list of the descriptor.
///
/// Mutates the list in place, stages every column payload that needs to be
/// uploaded into `staged`, and recomputes the file length. Columns of
/// blocks that fall out of the list are left behind in the store as
/// unreferenced garbage; no tombstones are staged for them.
#[allow(clippy::indexing_slicing, clippy::cast_possible_truncation)]
fn plan_write(
    descriptor: &mut FileDescriptor,
    position: u64,
    data: &[u8],
    staged: &mut BlockMap,
) -> crate::Result<()> {
    debug_assert!(!data.is_empty(), "flush of an empty range");

    if position > descriptor.length {
        return Err(past_end(position, descriptor.length));
    }

    let block_size = descriptor.block_size;

    let (mut index, mut data_position) = if descriptor.blocks.is_empty() {
        descriptor
            .blocks
            .push(FileBlock::allocated(0, block_size, 0));
        (0, 0)
    } else {
        let cursor =
            locate(descriptor, position).ok_or_else(|| past_end(position, descriptor.length))?;
        (cursor.index, cursor.data_position)
    };

    // A cursor at the right edge of a block with a successor is the same
    // position as the successor's start.
    if data_position == descriptor.blocks[index].data_length
        && index + 1 < descriptor.blocks.len()
    {
        index += 1;
        data_position = 0;
    }

    if data_position > 0 {
        let current = descriptor.blocks[index].clone();

        if data_position < current.data_length {
            // The write starts strictly inside the block: split it into
            // head and tail views of the same column. Neither view's
            // payload is re-uploaded.
            let mut head = current.clone();
            head.data_length = data_position;

            let mut tail = current;
            tail.data_offset += data_position;
            tail.data_length -= data_position;

            descriptor.blocks[index] = head;
            descriptor.blocks.insert(index + 1, tail);
        } else {
            // At the end of the last block. Existing columns are never
            // read-modify-written, so the append lands in a freshly
            // numbered block; it continues the window if there is room.
            let offset = if current.is_full() {
                0
            } else {
                current.window_end()
            };
            let number = descriptor.next_block_number();
            descriptor
                .blocks
                .insert(index + 1, FileBlock::allocated(number, block_size, offset));
        }

        index += 1;
    }

    // Invariant: the cursor sits at the start of the block at `index`.
    let mut remaining = data;

    while !remaining.is_empty() {
        if index == descriptor.blocks.len() {
            let number = descriptor.next_block_number();
            descriptor
                .blocks
                .push(FileBlock::allocated(number, block_size, 0));
        }

        let current = descriptor.blocks[index].clone();
        let capacity = block_size - current.data_offset;
        debug_assert!(capacity > 0, "block window exhausted");

        let chunk_len = capacity.min(remaining.len() as u64) as usize;
        let (chunk, rest) = remaining.split_at(chunk_len);

        if chunk_len as u64 >= current.data_length {
            // The chunk subsumes every valid byte of the block.
            let aliased = descriptor
                .blocks
                .iter()
                .enumerate()
                .any(|(i, b)| i != index && b.block_name == current.block_name);

            let name = if aliased {
                // Rewriting an aliased column would corrupt the sibling
                // fragments still pointing into it; displace the block
                // with a freshly numbered one instead.
                let number = descriptor.next_block_number();
                let mut block = FileBlock::allocated(number, block_size, current.data_offset);
                block.data_length = chunk_len as u64;
                let name = block.block_name.clone();
                descriptor.blocks[index] = block;
                name
            } else {
                descriptor.blocks[index].data_length = chunk_len as u64;
                current.block_name
            };

            staged.insert(name, window_payload(current.data_offset, chunk));

            // Bytes written past the block's old extent overwrite the
            // logical range of the blocks after it.
            let mut overshoot = chunk_len as u64 - current.data_length;

            while overshoot > 0 && index + 1 < descriptor.blocks.len() {
                let next = &mut descriptor.blocks[index + 1];

                if next.data_length <= overshoot {
                    overshoot -= next.data_length;
                    descriptor.blocks.remove(index + 1);
                } else {
                    next.data_offset += overshoot;
                    next.data_length -= overshoot;
                    overshoot = 0;
                }
            }
        } else {
            // The chunk covers a strict prefix of the block's bytes: a
            // freshly numbered block takes the chunk and the block shrinks
            // into a post-fragment of its own column.
            let number = descriptor.next_block_number();
            let mut block = FileBlock::allocated(number, block_size, current.data_offset);
            block.data_length = chunk_len as u64;

            staged.insert(
                block.block_name.clone(),
                window_payload(current.data_offset, chunk),
            );

            let shrunk = &mut descriptor.blocks[index];
            shrunk.data_offset += chunk_len as u64;
            shrunk.data_length -= chunk_len as u64;

            descriptor.blocks.insert(index, block);
        }

        remaining = rest;
        index += 1;
    }

    descriptor.length = descriptor.blocks_length();

    Ok(())
}
