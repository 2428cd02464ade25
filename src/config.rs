// Copyright (c) 2024-present, the column-dir contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{Directory, Store};
use std::sync::Arc;

const DEFAULT_KEYSPACE: &str = "lucene";
const DEFAULT_COLUMN_FAMILY: &str = "files";

/// Directory configuration builder
///
/// Collects the connection knobs consumed by transport-backed [`Store`]
/// implementations and the block/buffer geometry of the directory itself.
#[derive(Clone, Debug)]
pub struct Config {
    /// Store host
    pub host: String,

    /// Store port
    pub port: u16,

    /// Whether the transport uses framed mode
    pub framed: bool,

    /// Keyspace the column family lives in
    pub keyspace: String,

    /// Column family backing the directory
    pub column_family: String,

    /// Maximum number of logical bytes per block column
    pub block_size: u64,

    /// Write-behind / read-ahead buffer size
    ///
    /// Defaults to the block size. An integer multiple of the block size
    /// keeps the number of store round-trips per flush minimal.
    pub buffer_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9_160,
            framed: false,
            keyspace: DEFAULT_KEYSPACE.to_string(),
            column_family: DEFAULT_COLUMN_FAMILY.to_string(),
            block_size: /* 1 MiB */ 1_024 * 1_024,
            buffer_size: None,
        }
    }
}

impl Config {
    /// Initializes new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store host.
    #[must_use]
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Sets the store port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets framed transport mode.
    #[must_use]
    pub fn framed(mut self, framed: bool) -> Self {
        self.framed = framed;
        self
    }

    /// Sets the keyspace.
    #[must_use]
    pub fn keyspace(mut self, keyspace: &str) -> Self {
        self.keyspace = keyspace.to_string();
        self
    }

    /// Sets the column family.
    #[must_use]
    pub fn column_family(mut self, column_family: &str) -> Self {
        self.column_family = column_family.to_string();
        self
    }

    /// Sets the maximum number of logical bytes per block column.
    #[must_use]
    pub fn block_size(mut self, block_size: u64) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the write-behind / read-ahead buffer size.
    #[must_use]
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }

    /// Opens a directory over the given store session.
    ///
    /// Initializes the store schema idempotently.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the geometry is invalid or schema
    /// initialization fails.
    pub fn open(self, store: Arc<dyn Store>) -> crate::Result<Directory> {
        if self.block_size == 0 {
            return Err(crate::Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "block size must be positive",
            )));
        }

        #[allow(clippy::cast_possible_truncation)]
        let buffer_size = self.buffer_size.unwrap_or(self.block_size as usize);

        if buffer_size == 0 {
            return Err(crate::Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "buffer size must be positive",
            )));
        }

        store.initialize()?;

        log::debug!(
            "opening directory over {}/{} at {}:{} (block size: {}, buffer size: {})",
            self.keyspace,
            self.column_family,
            self.host,
            self.port,
            self.block_size,
            buffer_size,
        );

        Ok(Directory::new(store, self.block_size, buffer_size))
    }
}
