// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::FileDescriptor;

/// Position of a logical byte offset within a file's block list
///
/// Computed per operation; never persisted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockCursor {
    /// Index into the descriptor's block list
    pub index: usize,

    /// Starting logical byte position of the block within the file
    pub block_offset: u64,

    /// Within-block position (`0 ..= data_length`)
    pub data_position: u64,
}

/// Locates the block containing the given logical position.
///
/// The containing block is the first one whose cumulative end reaches
/// `position`; a position equal to the file length lands at the end of the
/// last block. Returns `None` if the block list is empty or `position` lies
/// past the end of the file.
#[must_use]
pub fn locate(descriptor: &FileDescriptor, position: u64) -> Option<BlockCursor> {
    let mut block_offset = 0;

    for (index, block) in descriptor.blocks.iter().enumerate() {
        let end = block_offset + block.data_length;

        if position <= end {
            return Some(BlockCursor {
                index,
                block_offset,
                data_position: position - block_offset,
            });
        }

        block_offset = end;
    }

    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::FileBlock;

    fn descriptor(lengths: &[u64]) -> FileDescriptor {
        let mut d = FileDescriptor::new("f", 8, 0);

        for (n, len) in lengths.iter().enumerate() {
            let mut block = FileBlock::allocated(n as u64, 8, 0);
            block.data_length = *len;
            d.blocks.push(block);
        }

        d.length = d.blocks_length();
        d
    }

    #[test]
    fn locate_in_first_block() {
        let d = descriptor(&[4, 4]);
        let cursor = locate(&d, 2).unwrap();

        assert_eq!(0, cursor.index);
        assert_eq!(0, cursor.block_offset);
        assert_eq!(2, cursor.data_position);
    }

    #[test]
    fn locate_at_block_boundary_stays_left() {
        let d = descriptor(&[4, 4]);
        let cursor = locate(&d, 4).unwrap();

        assert_eq!(0, cursor.index);
        assert_eq!(4, cursor.data_position);
    }

    #[test]
    fn locate_in_second_block() {
        let d = descriptor(&[4, 4]);
        let cursor = locate(&d, 5).unwrap();

        assert_eq!(1, cursor.index);
        assert_eq!(4, cursor.block_offset);
        assert_eq!(1, cursor.data_position);
    }

    #[test]
    fn locate_at_file_end() {
        let d = descriptor(&[4, 4]);
        let cursor = locate(&d, 8).unwrap();

        assert_eq!(1, cursor.index);
        assert_eq!(4, cursor.data_position);
    }

    #[test]
    fn locate_past_end_is_none() {
        let d = descriptor(&[4, 4]);
        assert!(locate(&d, 9).is_none());
    }

    #[test]
    fn locate_start_of_file() {
        let d = descriptor(&[4]);
        let cursor = locate(&d, 0).unwrap();

        assert_eq!(0, cursor.index);
        assert_eq!(0, cursor.data_position);
    }

    #[test]
    fn locate_in_empty_list_is_none() {
        let d = descriptor(&[]);
        assert!(locate(&d, 0).is_none());
    }

    #[test]
    fn locate_with_fragments() {
        // uneven fragment lengths, as after a partial overwrite
        let d = descriptor(&[3, 2, 3]);

        assert_eq!(1, locate(&d, 4).unwrap().index);
        assert_eq!(3, locate(&d, 4).unwrap().block_offset);
        assert_eq!(2, locate(&d, 7).unwrap().index);
        assert_eq!(5, locate(&d, 7).unwrap().block_offset);
    }
}
