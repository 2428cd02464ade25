// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::{Decode, DecodeError, Encode, EncodeError};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Name of the column holding the encoded [`FileDescriptor`] of a row
pub const DESCRIPTOR_COLUMN: &str = "DESCRIPTOR";

/// Prefix of block column names (`BLOCK-<n>`)
pub const BLOCK_NAME_PREFIX: &str = "BLOCK-";

/// One contiguous byte run of a file, stored as one column
///
/// The valid bytes of a block are
/// `payload[data_offset .. data_offset + data_length]` of its column value.
/// Fragments produced by partial overwrites keep pointing into their parent
/// block's column (same `block_name`), so column names may repeat within a
/// descriptor while block numbers of freshly allocated blocks never do.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FileBlock {
    /// Column this block's bytes live in; also its stable identity
    #[serde(rename = "columnName")]
    pub block_name: String,

    /// Allocation counter value, monotonic per file
    #[serde(rename = "blockNumber")]
    pub block_number: u64,

    /// Capacity ceiling of this block's window
    #[serde(rename = "blockSize")]
    pub block_size: u64,

    /// Offset within the column payload at which valid bytes begin
    #[serde(rename = "dataOffset")]
    pub data_offset: u64,

    /// Number of valid bytes beginning at `data_offset`
    #[serde(rename = "dataLength")]
    pub data_length: u64,
}

impl FileBlock {
    /// Creates a freshly allocated, still empty block.
    #[must_use]
    pub fn allocated(block_number: u64, block_size: u64, data_offset: u64) -> Self {
        Self {
            block_name: format!("{BLOCK_NAME_PREFIX}{block_number}"),
            block_number,
            block_size,
            data_offset,
            data_length: 0,
        }
    }

    /// End of the valid bytes within the block's capacity window.
    #[must_use]
    pub fn window_end(&self) -> u64 {
        self.data_offset + self.data_length
    }

    /// Returns `true` if the valid bytes reach the capacity ceiling.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.window_end() == self.block_size
    }
}

/// The inode: stitches a file's blocks into an ordered byte stream
///
/// The file's byte content is the concatenation, in list order, of the
/// `data_length` bytes of each block. Stored under the [`DESCRIPTOR_COLUMN`]
/// of the file's row as a self-describing JSON payload.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FileDescriptor {
    /// File name; also the row key
    pub name: String,

    /// Current logical byte length of the file
    pub length: u64,

    /// Logical tombstone; the row itself is never removed
    #[serde(default)]
    pub deleted: bool,

    /// Milliseconds since epoch of the last mutation
    #[serde(rename = "lastModified", default)]
    pub last_modified: i64,

    /// Milliseconds since epoch of the last flush or open
    #[serde(rename = "lastAccessed", default)]
    pub last_accessed: i64,

    /// Maximum number of logical bytes any one block may contain
    ///
    /// Older payloads may omit this; decoding then yields `0` and the
    /// directory substitutes its configured block size.
    #[serde(rename = "blockSize", default)]
    pub block_size: u64,

    /// Ordered block list
    #[serde(default)]
    pub blocks: Vec<FileBlock>,
}

impl FileDescriptor {
    /// Creates an empty descriptor for a fresh file.
    #[must_use]
    pub fn new(name: &str, block_size: u64, now: i64) -> Self {
        Self {
            name: name.to_string(),
            length: 0,
            deleted: false,
            last_modified: now,
            last_accessed: now,
            block_size,
            blocks: Vec::new(),
        }
    }

    /// Next free block number.
    ///
    /// Derived from the block list instead of being persisted; fragments
    /// keep their parent's number, so a live fragment pins its number
    /// against reallocation.
    #[must_use]
    pub fn next_block_number(&self) -> u64 {
        self.blocks
            .iter()
            .map(|b| b.block_number)
            .max()
            .map_or(0, |n| n + 1)
    }

    /// Sum of the block lengths; must equal `length` for a valid descriptor.
    #[must_use]
    pub fn blocks_length(&self) -> u64 {
        self.blocks.iter().map(|b| b.data_length).sum()
    }
}

impl Encode for FileDescriptor {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}

impl Decode for FileDescriptor {
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self, crate::Error> {
        let descriptor: Self = serde_json::from_reader(reader).map_err(DecodeError::from)?;
        Ok(descriptor)
    }
}
