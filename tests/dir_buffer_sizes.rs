use column_dir::{Config, Directory, MemoryStore};
use rand::RngCore;
use std::sync::Arc;
use test_log::test;

fn read_all(directory: &Directory, name: &str) -> column_dir::Result<Vec<u8>> {
    let mut input = directory.open_input(name)?;

    #[allow(clippy::cast_possible_truncation)]
    let mut out = vec![0u8; input.length() as usize];

    let mut filled = 0;
    while filled < out.len() {
        let read = input.read_bytes(&mut out[filled..])?;
        assert!(read > 0, "unexpected end of file");
        filled += read;
    }

    Ok(out)
}

fn roundtrip(block_size: u64, buffer_size: usize, data: &[u8]) -> column_dir::Result<Vec<u8>> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new()
        .block_size(block_size)
        .buffer_size(buffer_size)
        .open(store)?;

    let mut output = directory.create_output("f.bin")?;

    // write in awkward chunk sizes to exercise the buffer boundaries
    for chunk in data.chunks(7) {
        output.write_bytes(chunk)?;
    }
    output.close()?;

    let descriptor = directory.load_descriptor("f.bin", false)?.unwrap();
    assert_eq!(descriptor.length, descriptor.blocks_length());

    for block in &descriptor.blocks {
        assert!(block.data_offset + block.data_length <= block.block_size);
    }

    read_all(&directory, "f.bin")
}

#[test]
fn dir_buffer_smaller_than_block() -> column_dir::Result<()> {
    let data = (0u8..=255).collect::<Vec<_>>();
    assert_eq!(data, roundtrip(64, 16, &data)?);
    Ok(())
}

#[test]
fn dir_buffer_equal_to_block() -> column_dir::Result<()> {
    let data = (0u8..=255).collect::<Vec<_>>();
    assert_eq!(data, roundtrip(64, 64, &data)?);
    Ok(())
}

#[test]
fn dir_buffer_larger_than_block() -> column_dir::Result<()> {
    let data = (0u8..=255).collect::<Vec<_>>();
    assert_eq!(data, roundtrip(64, 256, &data)?);
    Ok(())
}

#[test]
fn dir_unaligned_buffer_size() -> column_dir::Result<()> {
    // works, just with more round-trips and fragments
    let data = (0u8..=255).collect::<Vec<_>>();
    assert_eq!(data, roundtrip(64, 24, &data)?);
    Ok(())
}

#[test]
fn dir_randomized_sequential_roundtrip() -> column_dir::Result<()> {
    let mut rng = rand::rng();

    for (block_size, buffer_size) in [(16, 16), (16, 5), (32, 128), (1_000, 333)] {
        let mut data = vec![0u8; 2_500];
        rng.fill_bytes(&mut data);

        assert_eq!(
            data,
            roundtrip(block_size, buffer_size, &data)?,
            "mismatch for block size {block_size}, buffer size {buffer_size}",
        );
    }

    Ok(())
}

#[test]
fn dir_randomized_overwrite_roundtrip() -> column_dir::Result<()> {
    let mut rng = rand::rng();

    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().block_size(32).buffer_size(32).open(store)?;

    let mut expected = vec![0u8; 500];
    rng.fill_bytes(&mut expected);

    let mut output = directory.create_output("f.bin")?;
    output.write_bytes(&expected)?;
    output.close()?;

    // shadow model: apply the same random overwrites to a plain vec
    for _ in 0..50 {
        let position = rng.next_u64() % expected.len() as u64;
        let len = 1 + (rng.next_u64() as usize % 40);

        let mut patch = vec![0u8; len];
        rng.fill_bytes(&mut patch);

        let mut output = directory.create_output("f.bin")?;
        output.seek(position)?;
        output.write_bytes(&patch)?;
        output.close()?;

        let end = position as usize + len;
        if end > expected.len() {
            expected.resize(end, 0);
        }
        expected[position as usize..end].copy_from_slice(&patch);

        assert_eq!(expected.len() as u64, directory.length("f.bin")?);
    }

    assert_eq!(expected, read_all(&directory, "f.bin")?);

    let descriptor = directory.load_descriptor("f.bin", false)?.unwrap();
    assert_eq!(descriptor.length, descriptor.blocks_length());

    Ok(())
}
