// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{seek::locate, Error, FileDescriptor, FileRow, Slice};

fn past_end(position: u64, length: u64) -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("position {position} is past end of file (length {length})"),
    ))
}

fn missing_block(name: &Slice) -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("block column {name:?} referenced by descriptor is missing"),
    ))
}

fn truncated_block(name: &Slice) -> Error {
    Error::Io(std::io::Error::other(format!(
        "block column {name:?} is shorter than its descriptor entry",
    )))
}

/// One contiguous copy out of a block's column payload
struct BlockRead {
    name: Slice,
    start: usize,
    len: usize,
}

/// Read-ahead buffered input stream over one file
///
/// Works against a descriptor snapshot taken at open time; flushes by a
/// concurrent writer are not observed. A buffer refill resolves the blocks
/// covering the wanted range and fetches their columns in one multi-get.
pub struct Reader {
    row: FileRow,
    descriptor: FileDescriptor,
    position: u64,
    buffer: Vec<u8>,
    buffer_start: u64,
    buffer_size: usize,
}

impl Reader {
    pub(crate) fn new(row: FileRow, descriptor: FileDescriptor, buffer_size: usize) -> Self {
        Self {
            row,
            descriptor,
            position: 0,
            buffer: Vec::new(),
            buffer_start: 0,
            buffer_size,
        }
    }

    /// Reads up to `out.len()` bytes into `out`, advancing the cursor.
    ///
    /// Returns the number of bytes read; `0` signals end of file.
    ///
    /// # Errors
    ///
    /// Will return `Err` on transport failure or when the descriptor
    /// references a missing or truncated block column.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> crate::Result<usize> {
        let mut written = 0;

        while written < out.len() && self.position < self.descriptor.length {
            if !self.buffered(self.position) {
                self.refill()?;
            }

            #[allow(clippy::cast_possible_truncation)]
            let offset = (self.position - self.buffer_start) as usize;

            let available = self.buffer.len() - offset;
            let take = available.min(out.len() - written);

            #[allow(clippy::indexing_slicing)]
            out[written..written + take].copy_from_slice(&self.buffer[offset..offset + take]);

            written += take;
            self.position += take as u64;
        }

        Ok(written)
    }

    /// Moves the read cursor.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the position lies past the end of the file.
    pub fn seek(&mut self, position: u64) -> crate::Result<()> {
        if position > self.descriptor.length {
            return Err(past_end(position, self.descriptor.length));
        }

        self.position = position;

        Ok(())
    }

    /// Current read cursor position.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Logical file length, as of the snapshot taken at open time.
    #[must_use]
    pub fn length(&self) -> u64 {
        self.descriptor.length
    }

    /// Releases the stream.
    pub fn close(self) {}

    #[doc(hidden)]
    #[must_use]
    pub fn descriptor(&self) -> &FileDescriptor {
        &self.descriptor
    }

    fn buffered(&self, position: u64) -> bool {
        position >= self.buffer_start && position < self.buffer_start + self.buffer.len() as u64
    }

    fn refill(&mut self) -> crate::Result<()> {
        #[allow(clippy::cast_possible_truncation)]
        let want = (self.descriptor.length - self.position).min(self.buffer_size as u64) as usize;

        log::trace!(
            "refilling {} bytes at position {} of {:?}",
            want,
            self.position,
            self.row.key(),
        );

        self.buffer = read_range(&self.row, &self.descriptor, self.position, want)?;
        self.buffer_start = self.position;

        Ok(())
    }
}

/// Resolves which block columns satisfy a range read.
fn plan_range(
    descriptor: &FileDescriptor,
    position: u64,
    want: usize,
) -> crate::Result<Vec<BlockRead>> {
    let cursor =
        locate(descriptor, position).ok_or_else(|| past_end(position, descriptor.length))?;

    let mut reads = Vec::new();
    let mut skip = cursor.data_position;
    let mut outstanding = want as u64;

    #[allow(clippy::indexing_slicing)]
    for block in &descriptor.blocks[cursor.index..] {
        if outstanding == 0 {
            break;
        }

        // the first block may contribute nothing when the cursor sits at
        // its right edge
        let available = block.data_length - skip;

        if available > 0 {
            let take = available.min(outstanding);

            #[allow(clippy::cast_possible_truncation)]
            reads.push(BlockRead {
                name: Slice::from(block.block_name.as_str()),
                start: (block.data_offset + skip) as usize,
                len: take as usize,
            });

            outstanding -= take;
        }

        skip = 0;
    }

    Ok(reads)
}

/// Copies a byte range out of the file with one multi-get round-trip.
fn read_range(
    row: &FileRow,
    descriptor: &FileDescriptor,
    position: u64,
    want: usize,
) -> crate::Result<Vec<u8>> {
    let reads = plan_range(descriptor, position, want)?;

    // fragments alias their parent's column, so names may repeat
    let mut names = Vec::<Slice>::with_capacity(reads.len());
    for read in &reads {
        if !names.contains(&read.name) {
            names.push(read.name.clone());
        }
    }

    let payloads = row.read_blocks(&names)?;

    let mut out = Vec::with_capacity(want);

    for read in reads {
        let payload = payloads.get(&read.name).ok_or_else(|| missing_block(&read.name))?;

        let slice = payload
            .get(read.start..read.start + read.len)
            .ok_or_else(|| truncated_block(&read.name))?;

        out.extend_from_slice(slice);
    }

    Ok(out)
}
