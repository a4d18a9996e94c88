//! JSON-RPC request and response types of the index methods.
//!
//! Field names follow the address index RPCs of Bitcoin Core forks (Insight),
//! so existing explorers can talk to Subcoin unchanged.

use bitcoin::{BlockHash, Txid};
use serde::{Deserialize, Serialize};
use subcoin_indexer::HeightRange;

/// Address argument of the address index methods.
///
/// Either a single address string or an object listing several addresses with
/// optional height bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressRequest {
    Single(String),
    Multiple {
        addresses: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<i64>,
    },
}

impl AddressRequest {
    /// The requested addresses.
    pub fn addresses(&self) -> &[String] {
        match self {
            Self::Single(address) => std::slice::from_ref(address),
            Self::Multiple { addresses, .. } => addresses,
        }
    }

    /// Height bounds, applied only when both `start` and `end` are positive.
    ///
    /// Bounds beyond `u32::MAX` saturate.
    pub fn height_range(&self) -> HeightRange {
        let height = |bound: i64| u32::try_from(bound).unwrap_or(u32::MAX);
        match self {
            Self::Multiple {
                start: Some(start),
                end: Some(end),
                ..
            } if *start > 0 && *end > 0 => HeightRange::new(height(*start), height(*end)),
            _ => HeightRange::ALL,
        }
    }
}

/// Response for `getaddressbalance` RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBalance {
    /// The current balance in satoshis.
    pub balance: i64,
    /// Coinbase outputs that are not yet spendable.
    pub balance_immature: i64,
    /// The spendable part of the balance.
    pub balance_spendable: i64,
    /// The total number of satoshis received (including change).
    pub received: i64,
}

impl From<subcoin_indexer::AddressBalance> for AddressBalance {
    fn from(balance: subcoin_indexer::AddressBalance) -> Self {
        Self {
            balance: balance.balance,
            balance_immature: balance.balance_immature,
            balance_spendable: balance.balance_spendable,
            received: balance.received,
        }
    }
}

/// Entry of the `getaddressdeltas` RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDelta {
    /// The difference of satoshis.
    pub satoshis: i64,
    /// The related txid.
    pub txid: Txid,
    /// The related input or output index.
    pub index: u32,
    /// The related block index.
    pub blockindex: u32,
    /// The block height.
    pub height: u32,
    /// The address.
    pub address: String,
}

/// Entry of the `getaddressmempool` RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMempoolDelta {
    /// The address.
    pub address: String,
    /// The related txid.
    pub txid: Txid,
    /// The related input or output index.
    pub index: u32,
    /// The difference of satoshis.
    pub satoshis: i64,
    /// The time the transaction entered the mempool (seconds).
    pub timestamp: i64,
    /// The previous txid (if spending).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prevtxid: Option<Txid>,
    /// The previous transaction output index (if spending).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prevout: Option<u32>,
}

/// Options of the `getblockhashes` RPC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockHashesOptions {
    /// Only include blocks on the main chain.
    pub no_orphans: bool,
    /// Include logical timestamps with hashes.
    pub logical_times: bool,
}

impl From<BlockHashesOptions> for subcoin_indexer::BlockHashesOptions {
    fn from(options: BlockHashesOptions) -> Self {
        Self {
            no_orphans: options.no_orphans,
            logical_times: options.logical_times,
        }
    }
}

/// Entry of the `getblockhashes` RPC response with `logicalTimes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHashEntry {
    /// The block hash.
    pub blockhash: BlockHash,
    /// The logical timestamp.
    pub logicalts: u32,
    /// The block height.
    pub height: u32,
}
