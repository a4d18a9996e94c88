//! Address and timestamp secondary indexes for Subcoin.
//!
//! The indexes let clients answer "what is the balance/history of address X" and
//! "which blocks were produced in the time range [low, high]" without scanning
//! the chain.
//!
//! ## Architecture
//!
//! - **Confirmed store**: RocksDB column families holding address deltas in two
//!   orders (address-first and height-first) plus the timestamp index. Written
//!   atomically when a block is connected or disconnected.
//! - **Mempool overlay**: in-memory address deltas for unconfirmed transactions.
//! - **Chain view**: read access to the active chain, used to filter out blocks
//!   orphaned by a reorg.
//! - **Query engine**: balance aggregation, txid deduplication and timestamp
//!   range lookups on top of the above.

mod address;
mod chain;
mod config;
mod error;
mod key;
mod mempool;
mod query;
mod store;
mod types;

#[cfg(test)]
mod test_utils;

pub use address::{AddressKey, AddressType, ADDRESS_HASH_LEN};
pub use chain::{filter_active_only, ActiveChain, ChainSnapshot, ChainTip, ChainView};
#[cfg(feature = "cli")]
pub use config::IndexParams;
pub use config::{IndexConfig, IndexKind, COINBASE_MATURITY, DEFAULT_MAX_CHAIN_RETRIES};
pub use error::Error;
pub use key::{
    AddressHeightKey, AddressIndexKey, AddressIndexValue, MempoolAddressDelta,
    MempoolAddressDeltaKey, TimestampIndexKey, TimestampIndexValue,
};
pub use mempool::MempoolAddressIndex;
pub use query::{collect_txids, IndexQuery};
pub use store::{IndexReader, IndexStore};
pub use types::{
    AddressBalance, AddressDelta, BlockHashesOptions, HeightRange, IndexTip, MempoolAddressEntry,
    TimestampEntry,
};

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A confirmed address index entry as read from the store.
pub type AddressIndexEntry = (AddressIndexKey, AddressIndexValue);

/// Outputs consumed by the inputs of a block or transaction, keyed by outpoint.
///
/// Provided by the validation engine (block undo data) or the mempool (coins view).
pub type SpentOutputs = std::collections::HashMap<bitcoin::OutPoint, bitcoin::TxOut>;

/// Column family names for RocksDB.
mod cf {
    /// Address deltas, address-first.
    /// Key: AddressIndexKey (78 bytes)
    /// Value: AddressIndexValue
    pub const ADDRESS_INDEX: &str = "address_index";

    /// Address deltas, height-first. Same entries as `ADDRESS_INDEX`.
    /// Key: AddressHeightKey (78 bytes)
    /// Value: AddressIndexValue
    pub const ADDRESS_HEIGHT: &str = "address_height";

    /// Block hashes by block time.
    /// Key: TimestampIndexKey (time u32 big-endian || block hash)
    /// Value: TimestampIndexValue
    pub const TIMESTAMP: &str = "timestamp";

    /// Logical timestamp of each indexed block.
    /// Key: block hash (32 bytes)
    /// Value: logical time (u32, little-endian)
    pub const BLOCK_LOGICAL_TIME: &str = "block_logical_time";

    /// Column family for metadata.
    /// Keys: "tip"
    pub const META: &str = "meta";
}

/// Metadata keys.
mod meta_keys {
    pub const TIP: &[u8] = b"tip";
}
