//! Address index RPC methods.
//!
//! Implements: getaddressbalance, getaddresstxids, getaddressdeltas, getaddressmempool

use crate::error::Error;
use crate::types::{AddressBalance, AddressDelta, AddressMempoolDelta, AddressRequest};
use bitcoin::Txid;
use jsonrpsee::proc_macros::rpc;
use std::collections::HashMap;
use subcoin_indexer::{AddressKey, ChainView, IndexKind, IndexQuery, IndexReader};

/// Address index RPC API.
#[rpc(client, server)]
pub trait AddressApi {
    /// Returns the balance for an address(es).
    #[method(name = "getaddressbalance", blocking)]
    fn get_address_balance(&self, request: AddressRequest) -> Result<AddressBalance, Error>;

    /// Returns the txids for an address(es), ascending by block height.
    #[method(name = "getaddresstxids", blocking)]
    fn get_address_txids(&self, request: AddressRequest) -> Result<Vec<Txid>, Error>;

    /// Returns all changes for an address(es).
    #[method(name = "getaddressdeltas", blocking)]
    fn get_address_deltas(&self, request: AddressRequest) -> Result<Vec<AddressDelta>, Error>;

    /// Returns all mempool deltas for an address(es).
    #[method(name = "getaddressmempool", blocking)]
    fn get_address_mempool(&self, request: AddressRequest) -> Result<Vec<AddressMempoolDelta>, Error>;
}

/// Address index RPC implementation.
pub struct Address<Reader, Chain> {
    query: IndexQuery<Reader, Chain>,
}

impl<Reader, Chain> Address<Reader, Chain>
where
    Reader: IndexReader + 'static,
    Chain: ChainView + 'static,
{
    /// Creates a new instance of [`Address`].
    pub fn new(query: IndexQuery<Reader, Chain>) -> Self {
        Self { query }
    }

    /// Decodes the requested addresses, keeping the strings for the response.
    ///
    /// Spellings that decode to the same address are echoed as the first one requested.
    fn decode(&self, request: &AddressRequest) -> Result<(Vec<AddressKey>, HashMap<AddressKey, String>), Error> {
        let addresses = request.addresses();
        let keys = self.query.decode_addresses(addresses)?;
        let mut names = HashMap::with_capacity(keys.len());
        for (key, address) in keys.iter().zip(addresses) {
            names.entry(*key).or_insert_with(|| address.clone());
        }
        Ok((keys, names))
    }
}

#[async_trait::async_trait]
impl<Reader, Chain> AddressApiServer for Address<Reader, Chain>
where
    Reader: IndexReader + 'static,
    Chain: ChainView + 'static,
{
    fn get_address_balance(&self, request: AddressRequest) -> Result<AddressBalance, Error> {
        let (keys, _) = self.decode(&request)?;
        let balance = self.query.address_balance(&keys)?;
        Ok(balance.into())
    }

    fn get_address_txids(&self, request: AddressRequest) -> Result<Vec<Txid>, Error> {
        // Checked before the addresses are decoded.
        self.query.ensure_enabled(IndexKind::Address)?;
        let (keys, _) = self.decode(&request)?;
        Ok(self.query.address_txids(&keys, request.height_range())?)
    }

    fn get_address_deltas(&self, request: AddressRequest) -> Result<Vec<AddressDelta>, Error> {
        let (keys, names) = self.decode(&request)?;
        let deltas = self.query.address_deltas(&keys, request.height_range())?;

        Ok(deltas
            .into_iter()
            .map(|delta| AddressDelta {
                satoshis: delta.satoshis,
                txid: delta.txid,
                index: delta.index,
                blockindex: delta.tx_index,
                height: delta.block_height,
                address: names.get(&delta.address).cloned().unwrap_or_default(),
            })
            .collect())
    }

    fn get_address_mempool(&self, request: AddressRequest) -> Result<Vec<AddressMempoolDelta>, Error> {
        let (keys, names) = self.decode(&request)?;
        let entries = self.query.address_mempool(&keys)?;

        Ok(entries
            .into_iter()
            .map(|entry| AddressMempoolDelta {
                address: names.get(&entry.address).cloned().unwrap_or_default(),
                txid: entry.txid,
                index: entry.index,
                satoshis: entry.satoshis,
                timestamp: entry.time,
                prevtxid: entry.prevout.map(|prevout| prevout.txid),
                prevout: entry.prevout.map(|prevout| prevout.vout),
            })
            .collect())
    }
}
