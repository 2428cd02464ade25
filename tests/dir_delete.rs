use column_dir::{Config, MemoryStore};
use std::sync::Arc;
use test_log::test;

#[test]
fn dir_logical_delete_hides_from_listing() -> column_dir::Result<()> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().open(store.clone())?;

    for name in ["x", "y"] {
        let mut output = directory.create_output(name)?;
        output.write_bytes(b"data")?;
        output.close()?;
    }

    directory.delete("x")?;

    assert_eq!(vec!["y".to_string()], directory.list()?);
    assert!(!directory.exists("x"));
    assert!(directory.exists("y"));

    // the row is retained; deletion is only a descriptor flag
    assert_eq!(2, store.row_count());

    Ok(())
}

#[test]
fn dir_deleted_file_cannot_be_opened() -> column_dir::Result<()> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().open(store)?;

    let mut output = directory.create_output("x")?;
    output.write_bytes(b"data")?;
    output.close()?;

    directory.delete("x")?;

    assert!(matches!(
        directory.open_input("x"),
        Err(column_dir::Error::FileNotFound(_))
    ));
    assert!(matches!(
        directory.length("x"),
        Err(column_dir::Error::FileNotFound(_))
    ));
    assert!(matches!(
        directory.touch("x"),
        Err(column_dir::Error::FileNotFound(_))
    ));

    Ok(())
}

#[test]
fn dir_delete_missing_file_fails() -> column_dir::Result<()> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().open(store)?;

    assert!(matches!(
        directory.delete("nope"),
        Err(column_dir::Error::FileNotFound(_))
    ));

    Ok(())
}

#[test]
fn dir_double_delete_fails() -> column_dir::Result<()> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().open(store)?;

    let output = directory.create_output("x")?;
    output.close()?;

    directory.delete("x")?;

    assert!(matches!(
        directory.delete("x"),
        Err(column_dir::Error::FileNotFound(_))
    ));

    Ok(())
}

#[test]
fn dir_create_output_revives_deleted_name() -> column_dir::Result<()> {
    let store = Arc::new(MemoryStore::new("lucene", "files"));
    let directory = Config::new().open(store)?;

    let mut output = directory.create_output("x")?;
    output.write_bytes(b"old contents")?;
    output.close()?;

    directory.delete("x")?;

    let mut output = directory.create_output("x")?;
    output.write_bytes(b"new")?;
    output.close()?;

    assert!(directory.exists("x"));
    assert_eq!(3, directory.length("x")?);
    assert_eq!(vec!["x".to_string()], directory.list()?);

    Ok(())
}
