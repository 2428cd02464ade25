use column_dir::{Config, Directory, MemoryStore};
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

#[test]
fn dir_create_write_list() -> column_dir::Result<()> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().open(store)?;

    let mut output = directory.create_output("a.txt")?;
    output.write_bytes(&[0x41, 0x42, 0x43])?;
    output.close()?;

    assert_eq!(vec!["a.txt".to_string()], directory.list()?);
    assert_eq!(3, directory.length("a.txt")?);
    assert!(directory.exists("a.txt"));
    assert_eq!(b"ABC".to_vec(), read_all(&directory, "a.txt")?);

    Ok(())
}

#[test]
fn dir_fresh_file_is_empty_and_listed() -> column_dir::Result<()> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().open(store)?;

    let output = directory.create_output("empty.bin")?;
    output.close()?;

    assert_eq!(0, directory.length("empty.bin")?);
    assert_eq!(vec!["empty.bin".to_string()], directory.list()?);

    let descriptor = directory.load_descriptor("empty.bin", false)?.unwrap();
    assert!(descriptor.blocks.is_empty());

    let mut input = directory.open_input("empty.bin")?;
    let mut buf = [0u8; 8];
    assert_eq!(0, input.read_bytes(&mut buf)?);

    Ok(())
}

#[test]
fn dir_missing_file_errors() -> column_dir::Result<()> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().open(store)?;

    assert!(!directory.exists("nope"));
    assert!(matches!(
        directory.length("nope"),
        Err(column_dir::Error::FileNotFound(_))
    ));
    assert!(matches!(
        directory.modified("nope"),
        Err(column_dir::Error::FileNotFound(_))
    ));
    assert!(matches!(
        directory.open_input("nope"),
        Err(column_dir::Error::FileNotFound(_))
    ));

    Ok(())
}

#[test]
fn dir_timestamps_progress() -> column_dir::Result<()> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().open(store)?;

    let mut output = directory.create_output("t.bin")?;
    output.write_bytes(b"x")?;
    output.close()?;

    let before = directory.modified("t.bin")?;
    assert!(before > 0);

    directory.touch("t.bin")?;
    assert!(directory.modified("t.bin")? >= before);

    Ok(())
}

#[test]
fn dir_list_multiple_files() -> column_dir::Result<()> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().open(store)?;

    for name in ["_0.cfs", "_0.si", "segments_1"] {
        let mut output = directory.create_output(name)?;
        output.write_bytes(name.as_bytes())?;
        output.close()?;
    }

    let mut names = directory.list()?;
    names.sort();

    assert_eq!(
        vec![
            "_0.cfs".to_string(),
            "_0.si".to_string(),
            "segments_1".to_string(),
        ],
        names,
    );

    Ok(())
}
