// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A block-addressed virtual file directory on top of a wide-column store.
//!
//! ##### About
//!
//! This crate lets an indexing engine (or any other consumer of a flat
//! file namespace) treat a remote column family as a mountable directory:
//! each file is a single row, each fixed-size block of a file is a single
//! column value, and a well-known `DESCRIPTOR` column holds the inode-like
//! metadata that stitches the blocks into an ordered byte stream.
//!
//! The consumer only sees the classic directory surface
//! (`create`/`open`/`read`/`write`/`seek`/`length`/`delete`/`list`);
//! the block mapping, fragment-aware overwrites and descriptor bookkeeping
//! happen underneath.
//!
//! Writes go through a write-behind buffer ([`Writer`]), reads through a
//! read-ahead buffer ([`Reader`]). One buffer flush becomes one atomic
//! row batch (all touched block columns plus the re-encoded descriptor),
//! so readers observe either the pre-flush or the post-flush file, never
//! a mix.
//!
//! The backing store is abstracted behind the [`Store`] trait; an
//! in-process [`MemoryStore`] is included for tests and embedding.
//!
//! # Example usage
//!
//! ```
//! use column_dir::{Config, MemoryStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new("lucene", "files"));
//! let directory = Config::new().block_size(1_024).open(store)?;
//!
//! let mut output = directory.create_output("segments.gen")?;
//! output.write_bytes(b"hello")?;
//! output.close()?;
//!
//! assert_eq!(vec!["segments.gen".to_string()], directory.list()?);
//! assert_eq!(5, directory.length("segments.gen")?);
//!
//! let mut input = directory.open_input("segments.gen")?;
//! let mut buf = [0u8; 5];
//! input.read_bytes(&mut buf)?;
//! assert_eq!(b"hello", &buf);
//! #
//! # Ok::<(), column_dir::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]

mod block_map;
mod coding;
mod config;
mod descriptor;
mod directory;
mod error;
mod reader;
mod row;
mod seek;
mod slice;

/// Store client facade and implementations
pub mod store;

mod time;
mod writer;

#[doc(hidden)]
pub use seek::{locate, BlockCursor};

pub use {
    block_map::BlockMap,
    coding::{Decode, DecodeError, Encode, EncodeError},
    config::Config,
    descriptor::{FileBlock, FileDescriptor, BLOCK_NAME_PREFIX, DESCRIPTOR_COLUMN},
    directory::Directory,
    error::{Error, Result},
    reader::Reader,
    row::FileRow,
    slice::Slice,
    store::{MemoryStore, Store},
    writer::Writer,
};
