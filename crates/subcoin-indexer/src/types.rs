//! Types for the indexer.

use crate::address::AddressKey;
use crate::AddressIndexEntry;
use bitcoin::hashes::Hash;
use bitcoin::{BlockHash, OutPoint, Txid};

/// Address balance summary.
///
/// All amounts are in satoshis. `balance == balance_spendable + balance_immature`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressBalance {
    /// Sum of all deltas, credits and debits.
    pub balance: i64,
    /// Coinbase credits with fewer confirmations than the coinbase maturity.
    pub balance_immature: i64,
    /// Everything else.
    pub balance_spendable: i64,
    /// Sum of all credits.
    pub received: i64,
}

impl AddressBalance {
    /// Aggregates confirmed entries into a balance as seen from `tip_height`.
    ///
    /// An entry of the coinbase transaction (`tx_index == 0`) is immature while
    /// `tip_height - block_height < coinbase_maturity`. Without a tip every
    /// coinbase entry is immature.
    pub fn aggregate<'a>(
        entries: impl IntoIterator<Item = &'a AddressIndexEntry>,
        tip_height: Option<u32>,
        coinbase_maturity: u32,
    ) -> Self {
        let tip_height = tip_height.map_or(-1, i64::from);
        let maturity = i64::from(coinbase_maturity);

        let mut balance = Self::default();

        for (key, value) in entries {
            if value.delta > 0 {
                balance.received += value.delta;
            }

            if key.tx_index == 0 && tip_height - i64::from(key.block_height) < maturity {
                balance.balance_immature += value.delta;
            } else {
                balance.balance_spendable += value.delta;
            }
        }

        balance.balance = balance.balance_spendable + balance.balance_immature;
        balance
    }
}

/// Inclusive block height bounds of an address query.
///
/// The bounds only apply when both are positive; otherwise the range is
/// unbounded. `HeightRange::ALL` (both zero) is the canonical unbounded range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeightRange {
    pub start: u32,
    pub end: u32,
}

impl HeightRange {
    /// The unbounded range.
    pub const ALL: Self = Self { start: 0, end: 0 };

    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Effective `(start, end)` bounds, `None` if unbounded.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        (self.start > 0 && self.end > 0).then_some((self.start, self.end))
    }

    /// Returns `true` if `height` falls within the effective bounds.
    pub fn contains(&self, height: u32) -> bool {
        self.bounds()
            .map_or(true, |(start, end)| start <= height && height <= end)
    }
}

/// Options of a timestamp range query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockHashesOptions {
    /// Only return blocks on the active chain.
    pub no_orphans: bool,
    /// Return logical timestamps alongside the block hashes.
    pub logical_times: bool,
}

/// A block in the timestamp index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampEntry {
    /// Block header time.
    pub time: u32,
    pub block_hash: BlockHash,
    pub height: u32,
    /// Block time forced to be strictly increasing along the chain.
    pub logical_time: u32,
}

/// The last block connected to the confirmed index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexTip {
    pub height: u32,
    pub hash: BlockHash,
}

impl IndexTip {
    /// Format: height (4 bytes, little-endian) || block hash (32 bytes)
    pub(crate) fn encode(&self) -> [u8; 36] {
        let mut value = [0u8; 36];
        value[..4].copy_from_slice(&self.height.to_le_bytes());
        value[4..].copy_from_slice(self.hash.as_byte_array());
        value
    }

    pub(crate) fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 36 {
            return None;
        }
        Some(Self {
            height: u32::from_le_bytes(bytes[..4].try_into().ok()?),
            hash: BlockHash::from_byte_array(bytes[4..].try_into().ok()?),
        })
    }
}

/// A confirmed change to the balance of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDelta {
    pub address: AddressKey,
    pub txid: Txid,
    /// Output index for a credit, input index for a debit.
    pub index: u32,
    pub spending: bool,
    pub block_height: u32,
    /// Position of the transaction in its block.
    pub tx_index: u32,
    /// Signed amount in satoshis.
    pub satoshis: i64,
}

impl From<&AddressIndexEntry> for AddressDelta {
    fn from((key, value): &AddressIndexEntry) -> Self {
        Self {
            address: key.address,
            txid: key.txid,
            index: key.index,
            spending: key.spending,
            block_height: key.block_height,
            tx_index: key.tx_index,
            satoshis: value.delta,
        }
    }
}

/// An unconfirmed change to the balance of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MempoolAddressEntry {
    pub address: AddressKey,
    pub txid: Txid,
    /// Output index for a credit, input index for a debit.
    pub index: u32,
    pub spending: bool,
    /// Signed amount in satoshis.
    pub satoshis: i64,
    /// Time the transaction entered the mempool (unix seconds).
    pub time: i64,
    /// The output consumed by a debit.
    pub prevout: Option<OutPoint>,
}
