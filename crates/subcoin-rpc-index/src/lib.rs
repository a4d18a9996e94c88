//! Address and timestamp index JSON-RPC API for Subcoin.
//!
//! Exposes the queries of [`subcoin_indexer`] with the request and response
//! shapes of the address index RPCs found in Bitcoin Core forks, so block
//! explorers built for those (Insight and friends) work against Subcoin.
//!
//! # Supported RPC Methods
//!
//! ## Address index (`--addressindex`)
//! - `getaddressbalance` - Returns the balance of an address(es)
//! - `getaddresstxids` - Returns the txids touching an address(es)
//! - `getaddressdeltas` - Returns every confirmed change of an address(es)
//! - `getaddressmempool` - Returns the unconfirmed changes of an address(es)
//!
//! ## Timestamp index (`--timestampindex`)
//! - `getblockhashes` - Returns the block hashes within a timestamp range

mod address;
mod blockchain;
mod error;
mod types;

pub use address::{Address, AddressApiServer};
pub use blockchain::{Blockchain, BlockchainApiServer};
pub use error::Error;
pub use types::*;

use subcoin_indexer::{ChainView, IndexQuery, IndexReader};

/// Index RPC server.
///
/// Aggregates all index RPC modules.
pub struct IndexRpc<Reader, Chain> {
    /// Address index RPC.
    pub address: Address<Reader, Chain>,
    /// Timestamp index RPC.
    pub blockchain: Blockchain<Reader, Chain>,
}

impl<Reader, Chain> IndexRpc<Reader, Chain>
where
    Reader: IndexReader + 'static,
    Chain: ChainView + 'static,
{
    /// Creates a new instance of [`IndexRpc`].
    pub fn new(query: IndexQuery<Reader, Chain>) -> Self {
        Self {
            address: Address::new(query.clone()),
            blockchain: Blockchain::new(query),
        }
    }

    /// Merges all RPC modules into a given RPC method registry.
    pub fn merge_into(
        self,
        module: &mut jsonrpsee::Methods,
    ) -> Result<(), jsonrpsee::server::RegisterMethodError> {
        let Self {
            address,
            blockchain,
        } = self;

        module.merge(address.into_rpc())?;
        module.merge(blockchain.into_rpc())?;

        Ok(())
    }
}
