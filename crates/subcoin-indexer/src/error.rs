//! Error types for the address and timestamp indexes.

use crate::config::IndexKind;
use bitcoin::{BlockHash, OutPoint};

/// Errors that can occur while maintaining or querying the indexes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested index is turned off for this node.
    #[error("{0} is not enabled")]
    IndexDisabled(IndexKind),

    /// The address string could not be decoded into an indexable address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Reading the confirmed index failed.
    #[error("No information available: {0}")]
    AddressIndexUnavailable(Box<Error>),

    /// The chain tip kept moving while a query needed a consistent view of it.
    #[error("Chain tip changed during query after {attempts} attempts")]
    ChainInconsistent { attempts: u32 },

    /// RocksDB error.
    #[error("RocksDB error: {0}")]
    Rocksdb(#[from] rocksdb::Error),

    /// A stored key or value does not have the expected layout.
    #[error("Malformed entry in column family {column}: {len} bytes")]
    MalformedEntry { column: &'static str, len: usize },

    /// An input spends an output that is neither in the block nor in the provided spent outputs.
    #[error("Spent output not provided: {0}")]
    MissingPrevout(OutPoint),

    /// Connecting or disconnecting a block that does not extend or match the index tip.
    #[error("Invalid height: {0}")]
    InvalidHeight(String),

    /// The block being disconnected is not the indexed tip.
    #[error("Block {0} is not the index tip")]
    NotTip(BlockHash),

    /// Storage not initialized.
    #[error("Storage not initialized")]
    NotInitialized,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps a failed store read, leaving configuration errors untouched.
    pub(crate) fn unavailable(self) -> Self {
        match self {
            e @ (Self::IndexDisabled(_) | Self::AddressIndexUnavailable(_)) => e,
            e => Self::AddressIndexUnavailable(Box::new(e)),
        }
    }
}
