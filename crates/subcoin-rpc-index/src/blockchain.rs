//! Timestamp index RPC methods.
//!
//! Implements: getblockhashes

use crate::error::Error;
use crate::types::{BlockHashEntry, BlockHashesOptions};
use jsonrpsee::proc_macros::rpc;
use subcoin_indexer::{ChainView, IndexQuery, IndexReader};

/// Timestamp index RPC API.
#[rpc(client, server)]
pub trait BlockchainApi {
    /// Returns the hashes of the blocks with a timestamp within `[low, high]`.
    ///
    /// If `logicalTimes` is false (default), returns an array of block hashes.
    /// If `logicalTimes` is true, returns objects with the block hash, logical
    /// timestamp and height.
    #[method(name = "getblockhashes", blocking)]
    fn get_block_hashes(
        &self,
        high: u32,
        low: u32,
        options: Option<BlockHashesOptions>,
    ) -> Result<serde_json::Value, Error>;
}

/// Timestamp index RPC implementation.
pub struct Blockchain<Reader, Chain> {
    query: IndexQuery<Reader, Chain>,
}

impl<Reader, Chain> Blockchain<Reader, Chain>
where
    Reader: IndexReader + 'static,
    Chain: ChainView + 'static,
{
    /// Creates a new instance of [`Blockchain`].
    pub fn new(query: IndexQuery<Reader, Chain>) -> Self {
        Self { query }
    }
}

#[async_trait::async_trait]
impl<Reader, Chain> BlockchainApiServer for Blockchain<Reader, Chain>
where
    Reader: IndexReader + 'static,
    Chain: ChainView + 'static,
{
    fn get_block_hashes(
        &self,
        high: u32,
        low: u32,
        options: Option<BlockHashesOptions>,
    ) -> Result<serde_json::Value, Error> {
        let options = options.unwrap_or_default();
        let entries = self.query.block_hashes(high, low, options.into())?;

        if options.logical_times {
            let entries: Vec<BlockHashEntry> = entries
                .into_iter()
                .map(|entry| BlockHashEntry {
                    blockhash: entry.block_hash,
                    logicalts: entry.logical_time,
                    height: entry.height,
                })
                .collect();
            Ok(serde_json::to_value(entries)?)
        } else {
            let hashes: Vec<_> = entries.into_iter().map(|entry| entry.block_hash).collect();
            Ok(serde_json::to_value(hashes)?)
        }
    }
}
