//! Key layouts and orderings of the address and timestamp indexes.
//!
//! Every key type has a total order given by its `Ord` impl and a fixed-width
//! big-endian encoding whose byte-lexicographic order is the same order, so a
//! RocksDB iterator visits keys exactly as `Ord` sorts them.
//!
//! Within one `(address, tx, index)` group a credit (`spending == false`) sorts
//! before a debit (`spending == true`).

use crate::address::{AddressKey, AddressType, ADDRESS_HASH_LEN};
use bitcoin::hashes::Hash;
use bitcoin::{BlockHash, OutPoint, Txid};
use std::cmp::Ordering;

const TYPE_LEN: usize = 1;
const HEIGHT_LEN: usize = 4;
const TX_INDEX_LEN: usize = 4;
const TXID_LEN: usize = 32;
const INDEX_LEN: usize = 4;
const SPENDING_LEN: usize = 1;

const ADDRESS_PREFIX_LEN: usize = TYPE_LEN + ADDRESS_HASH_LEN;

/// Encoded length of [`AddressIndexKey`] and [`AddressHeightKey`].
pub const ADDRESS_INDEX_KEY_LEN: usize =
    ADDRESS_PREFIX_LEN + HEIGHT_LEN + TX_INDEX_LEN + TXID_LEN + INDEX_LEN + SPENDING_LEN;

/// Encoded length of [`TimestampIndexKey`].
pub const TIMESTAMP_INDEX_KEY_LEN: usize = 4 + 32;

fn encode_address(out: &mut Vec<u8>, address: &AddressKey) {
    out.push(address.address_type as u8);
    out.extend_from_slice(&address.hash);
}

fn decode_address(bytes: &[u8]) -> Option<AddressKey> {
    let address_type = AddressType::from_u8(*bytes.first()?)?;
    let hash = bytes.get(TYPE_LEN..ADDRESS_PREFIX_LEN)?.try_into().ok()?;
    Some(AddressKey { address_type, hash })
}

fn read_u32_be(bytes: &[u8], offset: usize) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(offset..offset + 4)?.try_into().ok()?))
}

fn read_hash(bytes: &[u8], offset: usize) -> Option<[u8; 32]> {
    bytes.get(offset..offset + 32)?.try_into().ok()
}

fn read_spending(bytes: &[u8], offset: usize) -> Option<bool> {
    match bytes.get(offset)? {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// A confirmed address delta, ordered address-first.
///
/// Order: `address`, `block_height`, `tx_index`, `txid`, `index`, `spending`.
/// All entries of one address are contiguous and sorted by height, so a height
/// range of one address is a single scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressIndexKey {
    pub address: AddressKey,
    pub block_height: u32,
    /// Position of the transaction in its block; 0 is the coinbase.
    pub tx_index: u32,
    pub txid: Txid,
    /// Output index for a credit, input index for a debit.
    pub index: u32,
    /// `true` if the entry spends a previous output of the address.
    pub spending: bool,
}

impl Ord for AddressIndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address
            .cmp(&other.address)
            .then(self.block_height.cmp(&other.block_height))
            .then(self.tx_index.cmp(&other.tx_index))
            .then_with(|| self.txid.as_byte_array().cmp(other.txid.as_byte_array()))
            .then(self.index.cmp(&other.index))
            .then(self.spending.cmp(&other.spending))
    }
}

impl PartialOrd for AddressIndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AddressIndexKey {
    /// Prefix shared by every entry of `address`.
    pub fn address_prefix(address: &AddressKey) -> Vec<u8> {
        let mut out = Vec::with_capacity(ADDRESS_PREFIX_LEN);
        encode_address(&mut out, address);
        out
    }

    /// Smallest possible key of `address` at `height`, used to seek a height range.
    pub fn height_seek_key(address: &AddressKey, height: u32) -> Vec<u8> {
        let mut out = Self::address_prefix(address);
        out.extend_from_slice(&height.to_be_bytes());
        out
    }

    /// Encodes the key for storage.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ADDRESS_INDEX_KEY_LEN);
        encode_address(&mut out, &self.address);
        out.extend_from_slice(&self.block_height.to_be_bytes());
        out.extend_from_slice(&self.tx_index.to_be_bytes());
        out.extend_from_slice(self.txid.as_byte_array());
        out.extend_from_slice(&self.index.to_be_bytes());
        out.push(self.spending as u8);
        out
    }

    /// Decodes a stored key.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != ADDRESS_INDEX_KEY_LEN {
            return None;
        }
        let mut offset = ADDRESS_PREFIX_LEN;
        let address = decode_address(bytes)?;
        let block_height = read_u32_be(bytes, offset)?;
        offset += HEIGHT_LEN;
        let tx_index = read_u32_be(bytes, offset)?;
        offset += TX_INDEX_LEN;
        let txid = Txid::from_byte_array(read_hash(bytes, offset)?);
        offset += TXID_LEN;
        let index = read_u32_be(bytes, offset)?;
        offset += INDEX_LEN;
        let spending = read_spending(bytes, offset)?;

        Some(Self {
            address,
            block_height,
            tx_index,
            txid,
            index,
            spending,
        })
    }
}

/// The same entries as [`AddressIndexKey`], ordered height-first.
///
/// Order: `block_height`, `address`, `tx_index`, `txid`, `index`, `spending`.
/// All entries written by one block are contiguous, which is what a block
/// disconnect and a height range scan need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressHeightKey(pub AddressIndexKey);

impl Ord for AddressHeightKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.0, &other.0);
        a.block_height
            .cmp(&b.block_height)
            .then(a.address.cmp(&b.address))
            .then(a.tx_index.cmp(&b.tx_index))
            .then_with(|| a.txid.as_byte_array().cmp(b.txid.as_byte_array()))
            .then(a.index.cmp(&b.index))
            .then(a.spending.cmp(&b.spending))
    }
}

impl PartialOrd for AddressHeightKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AddressHeightKey {
    /// Prefix shared by every entry written at `height`.
    pub fn height_prefix(height: u32) -> [u8; HEIGHT_LEN] {
        height.to_be_bytes()
    }

    /// Encodes the key for storage.
    pub fn encode(&self) -> Vec<u8> {
        let key = &self.0;
        let mut out = Vec::with_capacity(ADDRESS_INDEX_KEY_LEN);
        out.extend_from_slice(&key.block_height.to_be_bytes());
        encode_address(&mut out, &key.address);
        out.extend_from_slice(&key.tx_index.to_be_bytes());
        out.extend_from_slice(key.txid.as_byte_array());
        out.extend_from_slice(&key.index.to_be_bytes());
        out.push(key.spending as u8);
        out
    }

    /// Decodes a stored key.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != ADDRESS_INDEX_KEY_LEN {
            return None;
        }
        let block_height = read_u32_be(bytes, 0)?;
        let mut offset = HEIGHT_LEN;
        let address = decode_address(&bytes[offset..])?;
        offset += ADDRESS_PREFIX_LEN;
        let tx_index = read_u32_be(bytes, offset)?;
        offset += TX_INDEX_LEN;
        let txid = Txid::from_byte_array(read_hash(bytes, offset)?);
        offset += TXID_LEN;
        let index = read_u32_be(bytes, offset)?;
        offset += INDEX_LEN;
        let spending = read_spending(bytes, offset)?;

        Some(Self(AddressIndexKey {
            address,
            block_height,
            tx_index,
            txid,
            index,
            spending,
        }))
    }
}

/// Value stored under both address index orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressIndexValue {
    /// Signed amount in satoshis: positive for a credit, negative for a debit.
    pub delta: i64,
    /// The output consumed by a debit. `None` for credits.
    pub prevout: Option<OutPoint>,
}

impl AddressIndexValue {
    /// Format: delta (8 bytes, little-endian) [|| prev txid (32 bytes) || prev vout (4 bytes, little-endian)]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + 36);
        out.extend_from_slice(&self.delta.to_le_bytes());
        if let Some(prevout) = self.prevout {
            out.extend_from_slice(prevout.txid.as_byte_array());
            out.extend_from_slice(&prevout.vout.to_le_bytes());
        }
        out
    }

    /// Decodes a stored value.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let delta = i64::from_le_bytes(bytes.get(..8)?.try_into().ok()?);
        let prevout = match bytes.len() {
            8 => None,
            44 => Some(OutPoint {
                txid: Txid::from_byte_array(read_hash(bytes, 8)?),
                vout: u32::from_le_bytes(bytes.get(40..44)?.try_into().ok()?),
            }),
            _ => return None,
        };
        Some(Self { delta, prevout })
    }
}

/// Key of an unconfirmed address delta in the mempool overlay.
///
/// Order: `address`, `txid`, `index`, `spending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MempoolAddressDeltaKey {
    pub address: AddressKey,
    pub txid: Txid,
    /// Output index for a credit, input index for a debit.
    pub index: u32,
    pub spending: bool,
}

impl Ord for MempoolAddressDeltaKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address
            .cmp(&other.address)
            .then_with(|| self.txid.as_byte_array().cmp(other.txid.as_byte_array()))
            .then(self.index.cmp(&other.index))
            .then(self.spending.cmp(&other.spending))
    }
}

impl PartialOrd for MempoolAddressDeltaKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl MempoolAddressDeltaKey {
    /// The smallest key of `address`; every delta of the address sorts at or after it.
    pub fn lowest(address: AddressKey) -> Self {
        Self {
            address,
            txid: Txid::all_zeros(),
            index: 0,
            spending: false,
        }
    }
}

/// An unconfirmed address delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MempoolAddressDelta {
    /// Time the transaction entered the mempool (unix seconds).
    pub time: i64,
    /// Signed amount in satoshis.
    pub amount: i64,
    /// The output consumed by a debit. `None` for credits.
    pub prevout: Option<OutPoint>,
}

/// Key of the timestamp index.
///
/// Order: `time`, `block_hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimestampIndexKey {
    pub time: u32,
    pub block_hash: BlockHash,
}

impl Ord for TimestampIndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.block_hash.as_byte_array().cmp(other.block_hash.as_byte_array()))
    }
}

impl PartialOrd for TimestampIndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TimestampIndexKey {
    /// Format: time (4 bytes, big-endian) || block hash (32 bytes, raw)
    pub fn encode(&self) -> [u8; TIMESTAMP_INDEX_KEY_LEN] {
        let mut key = [0u8; TIMESTAMP_INDEX_KEY_LEN];
        key[..4].copy_from_slice(&self.time.to_be_bytes());
        key[4..].copy_from_slice(self.block_hash.as_byte_array());
        key
    }

    /// Decodes a stored key.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != TIMESTAMP_INDEX_KEY_LEN {
            return None;
        }
        Some(Self {
            time: read_u32_be(bytes, 0)?,
            block_hash: BlockHash::from_byte_array(read_hash(bytes, 4)?),
        })
    }
}

/// Value of the timestamp index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampIndexValue {
    pub height: u32,
    /// Block time forced to be strictly increasing along the chain.
    pub logical_time: u32,
}

impl TimestampIndexValue {
    /// Format: height (4 bytes, little-endian) || logical time (4 bytes, little-endian)
    pub fn encode(&self) -> [u8; 8] {
        let mut value = [0u8; 8];
        value[..4].copy_from_slice(&self.height.to_le_bytes());
        value[4..].copy_from_slice(&self.logical_time.to_le_bytes());
        value
    }

    /// Decodes a stored value.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 8 {
            return None;
        }
        Some(Self {
            height: u32::from_le_bytes(bytes[..4].try_into().ok()?),
            logical_time: u32::from_le_bytes(bytes[4..].try_into().ok()?),
        })
    }
}
