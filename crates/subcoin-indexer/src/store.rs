//! Confirmed address and timestamp index storage using RocksDB.

use crate::address::AddressKey;
use crate::config::{IndexConfig, IndexKind};
use crate::key::{AddressHeightKey, AddressIndexKey, AddressIndexValue, TimestampIndexKey, TimestampIndexValue};
use crate::types::{HeightRange, IndexTip, TimestampEntry};
use crate::{cf, meta_keys, AddressIndexEntry, Error, Result, SpentOutputs};
use bitcoin::hashes::Hash;
use bitcoin::{Block, BlockHash, OutPoint, TxOut};
use parking_lot::RwLock;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, WriteBatch, DB};
use std::collections::HashMap;
use std::path::Path;

/// Read access to the confirmed indexes.
pub trait IndexReader: Send + Sync {
    /// Returns the entries of `address` within `range`, in address-first key order.
    fn read_address_entries(
        &self,
        address: &AddressKey,
        range: HeightRange,
    ) -> Result<Vec<AddressIndexEntry>>;

    /// Returns the blocks with `low <= time <= high`, ascending by time.
    ///
    /// An inverted range (`high < low`) yields no entries.
    fn read_timestamp_entries(&self, high: u32, low: u32) -> Result<Vec<TimestampEntry>>;
}

/// Address and timestamp indexes stored in RocksDB.
///
/// Written by the validation engine through [`Self::connect_block`] and
/// [`Self::disconnect_block`]; every block is applied in a single atomic batch.
pub struct IndexStore {
    /// RocksDB instance.
    db: DB,
    config: IndexConfig,
    /// Last connected block, `None` if nothing is indexed.
    tip: RwLock<Option<IndexTip>>,
}

impl IndexStore {
    /// Open or create the index database under `path`.
    ///
    /// Data is kept in a per-network subdirectory so that several networks can
    /// share one base path.
    pub fn open(path: &Path, config: &IndexConfig) -> Result<Self> {
        let db_path = path.join("indexes").join(config.network.to_core_arg());
        std::fs::create_dir_all(&db_path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(cf::ADDRESS_INDEX, Options::default()),
            ColumnFamilyDescriptor::new(cf::ADDRESS_HEIGHT, Options::default()),
            ColumnFamilyDescriptor::new(cf::TIMESTAMP, Options::default()),
            ColumnFamilyDescriptor::new(cf::BLOCK_LOGICAL_TIME, Options::default()),
            ColumnFamilyDescriptor::new(cf::META, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, &db_path, cf_descriptors)?;

        let tip = Self::load_tip(&db)?;

        tracing::info!(
            path = %db_path.display(),
            address_index = config.address_index,
            timestamp_index = config.timestamp_index,
            tip_height = ?tip.map(|tip| tip.height),
            "Opened index store"
        );

        Ok(Self {
            db,
            config: config.clone(),
            tip: RwLock::new(tip),
        })
    }

    fn load_tip(db: &DB) -> Result<Option<IndexTip>> {
        let cf_meta = db.cf_handle(cf::META).ok_or(Error::NotInitialized)?;
        match db.get_cf(cf_meta, meta_keys::TIP)? {
            Some(bytes) => IndexTip::decode(&bytes).map(Some).ok_or(Error::MalformedEntry {
                column: cf::META,
                len: bytes.len(),
            }),
            None => Ok(None),
        }
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or(Error::NotInitialized)
    }

    fn ensure_enabled(&self, kind: IndexKind) -> Result<()> {
        if self.config.is_enabled(kind) {
            Ok(())
        } else {
            Err(Error::IndexDisabled(kind))
        }
    }

    /// Index configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Last connected block.
    pub fn tip(&self) -> Option<IndexTip> {
        *self.tip.read()
    }

    /// Index the block connected at `height`.
    ///
    /// `spent` must contain the outputs spent by the block's inputs, except those
    /// created earlier in the same block. The block must extend the current tip,
    /// or be the genesis block of an empty index.
    pub fn connect_block(&self, block: &Block, height: u32, spent: &SpentOutputs) -> Result<()> {
        let mut tip = self.tip.write();

        match *tip {
            Some(current) if current.height.checked_add(1) != Some(height) => {
                return Err(Error::InvalidHeight(format!(
                    "block at height {height} does not extend index tip at height {}",
                    current.height
                )));
            }
            Some(current) if block.header.prev_blockhash != current.hash => {
                return Err(Error::InvalidHeight(format!(
                    "block at height {height} does not build on index tip {}",
                    current.hash
                )));
            }
            None if height != 0 => {
                return Err(Error::InvalidHeight(format!(
                    "empty index must start at genesis, got height {height}"
                )));
            }
            _ => {}
        }

        let block_hash = block.block_hash();
        let mut batch = WriteBatch::default();

        let address_entries = if self.config.address_index {
            let entries = Self::address_entries(block, height, spent)?;
            let cf_address = self.cf(cf::ADDRESS_INDEX)?;
            let cf_height = self.cf(cf::ADDRESS_HEIGHT)?;
            for (key, value) in &entries {
                let value = value.encode();
                batch.put_cf(cf_address, key.encode(), &value);
                batch.put_cf(cf_height, AddressHeightKey(*key).encode(), &value);
            }
            entries.len()
        } else {
            0
        };

        if self.config.timestamp_index {
            let time = block.header.time;
            let logical_time = match self.block_logical_time(&block.header.prev_blockhash)? {
                Some(prev_logical_time) => time.max(prev_logical_time.saturating_add(1)),
                None => time,
            };

            let key = TimestampIndexKey { time, block_hash };
            let value = TimestampIndexValue {
                height,
                logical_time,
            };
            batch.put_cf(self.cf(cf::TIMESTAMP)?, key.encode(), value.encode());
            batch.put_cf(
                self.cf(cf::BLOCK_LOGICAL_TIME)?,
                block_hash.as_byte_array(),
                logical_time.to_le_bytes(),
            );
        }

        let new_tip = IndexTip {
            height,
            hash: block_hash,
        };
        batch.put_cf(self.cf(cf::META)?, meta_keys::TIP, new_tip.encode());

        // Atomic write
        self.db.write(batch)?;

        *tip = Some(new_tip);

        tracing::debug!(height, %block_hash, address_entries, "Indexed block");

        Ok(())
    }

    /// Derives the address entries of `block`.
    fn address_entries(block: &Block, height: u32, spent: &SpentOutputs) -> Result<Vec<AddressIndexEntry>> {
        let mut entries = Vec::new();

        // Outputs created within this block, spendable by later transactions of the block.
        let mut in_block_outputs: HashMap<OutPoint, &TxOut> = HashMap::new();

        for (tx_index, tx) in block.txdata.iter().enumerate() {
            let txid = tx.compute_txid();
            let tx_index = tx_index as u32;

            if !tx.is_coinbase() {
                for (input_index, input) in tx.input.iter().enumerate() {
                    let prevout = input.previous_output;
                    let spent_output = in_block_outputs
                        .get(&prevout)
                        .copied()
                        .or_else(|| spent.get(&prevout))
                        .ok_or(Error::MissingPrevout(prevout))?;

                    if let Some(address) = AddressKey::from_script(&spent_output.script_pubkey) {
                        let key = AddressIndexKey {
                            address,
                            block_height: height,
                            tx_index,
                            txid,
                            index: input_index as u32,
                            spending: true,
                        };
                        let value = AddressIndexValue {
                            delta: -(spent_output.value.to_sat() as i64),
                            prevout: Some(prevout),
                        };
                        entries.push((key, value));
                    }
                }
            }

            for (vout, output) in tx.output.iter().enumerate() {
                in_block_outputs.insert(OutPoint::new(txid, vout as u32), output);

                if let Some(address) = AddressKey::from_script(&output.script_pubkey) {
                    let key = AddressIndexKey {
                        address,
                        block_height: height,
                        tx_index,
                        txid,
                        index: vout as u32,
                        spending: false,
                    };
                    let value = AddressIndexValue {
                        delta: output.value.to_sat() as i64,
                        prevout: None,
                    };
                    entries.push((key, value));
                }
            }
        }

        Ok(entries)
    }

    /// Remove the index entries of the tip block, connected at `height`.
    ///
    /// Address entries are deleted; timestamp entries are kept and filtered out
    /// at read time by the active chain.
    pub fn disconnect_block(&self, block: &Block, height: u32) -> Result<()> {
        let mut tip = self.tip.write();

        let block_hash = block.block_hash();
        match *tip {
            Some(current) if current.hash == block_hash && current.height == height => {}
            _ => return Err(Error::NotTip(block_hash)),
        }

        let mut batch = WriteBatch::default();

        let removed = if self.config.address_index {
            let entries = self.scan_height_entries(height, height)?;
            let cf_address = self.cf(cf::ADDRESS_INDEX)?;
            let cf_height = self.cf(cf::ADDRESS_HEIGHT)?;
            for (key, _) in &entries {
                batch.delete_cf(cf_address, key.encode());
                batch.delete_cf(cf_height, AddressHeightKey(*key).encode());
            }
            entries.len()
        } else {
            0
        };

        let new_tip = height.checked_sub(1).map(|height| IndexTip {
            height,
            hash: block.header.prev_blockhash,
        });
        let cf_meta = self.cf(cf::META)?;
        match new_tip {
            Some(new_tip) => batch.put_cf(cf_meta, meta_keys::TIP, new_tip.encode()),
            None => batch.delete_cf(cf_meta, meta_keys::TIP),
        }

        // Atomic write
        self.db.write(batch)?;

        *tip = new_tip;

        tracing::info!(height, %block_hash, removed, "Disconnected block from index");

        Ok(())
    }

    /// Returns the address entries of all blocks within `range`, in height-first order.
    pub fn read_height_entries(&self, range: HeightRange) -> Result<Vec<AddressIndexEntry>> {
        self.ensure_enabled(IndexKind::Address)?;
        let (start, end) = range.bounds().unwrap_or((0, u32::MAX));
        self.scan_height_entries(start, end)
    }

    fn scan_height_entries(&self, start: u32, end: u32) -> Result<Vec<AddressIndexEntry>> {
        let cf_height = self.cf(cf::ADDRESS_HEIGHT)?;

        let mut entries = Vec::new();
        let mut iter = self.db.raw_iterator_cf(cf_height);
        iter.seek(AddressHeightKey::height_prefix(start));

        while iter.valid() {
            if let (Some(key), Some(value)) = (iter.key(), iter.value()) {
                let AddressHeightKey(key) =
                    AddressHeightKey::decode(key).ok_or(Error::MalformedEntry {
                        column: cf::ADDRESS_HEIGHT,
                        len: key.len(),
                    })?;
                if key.block_height > end {
                    break;
                }
                entries.push((key, decode_address_value(cf::ADDRESS_HEIGHT, value)?));
            }
            iter.next();
        }
        iter.status()?;

        Ok(entries)
    }

    /// Logical time recorded for `block_hash`, if the block was indexed.
    pub fn block_logical_time(&self, block_hash: &BlockHash) -> Result<Option<u32>> {
        let cf_logical_time = self.cf(cf::BLOCK_LOGICAL_TIME)?;
        match self.db.get_cf(cf_logical_time, block_hash.as_byte_array())? {
            Some(bytes) => {
                let bytes: [u8; 4] = bytes.as_slice().try_into().map_err(|_| Error::MalformedEntry {
                    column: cf::BLOCK_LOGICAL_TIME,
                    len: bytes.len(),
                })?;
                Ok(Some(u32::from_le_bytes(bytes)))
            }
            None => Ok(None),
        }
    }
}

fn decode_address_value(column: &'static str, bytes: &[u8]) -> Result<AddressIndexValue> {
    AddressIndexValue::decode(bytes).ok_or(Error::MalformedEntry {
        column,
        len: bytes.len(),
    })
}

impl IndexReader for IndexStore {
    fn read_address_entries(
        &self,
        address: &AddressKey,
        range: HeightRange,
    ) -> Result<Vec<AddressIndexEntry>> {
        self.ensure_enabled(IndexKind::Address)?;

        let cf_address = self.cf(cf::ADDRESS_INDEX)?;
        let prefix = AddressIndexKey::address_prefix(address);

        let mut entries = Vec::new();
        let mut iter = self.db.raw_iterator_cf(cf_address);
        let end = match range.bounds() {
            Some((start, end)) => {
                iter.seek(AddressIndexKey::height_seek_key(address, start));
                end
            }
            None => {
                iter.seek(&prefix);
                u32::MAX
            }
        };

        while iter.valid() {
            if let (Some(key), Some(value)) = (iter.key(), iter.value()) {
                if !key.starts_with(&prefix) {
                    break;
                }
                let key = AddressIndexKey::decode(key).ok_or(Error::MalformedEntry {
                    column: cf::ADDRESS_INDEX,
                    len: key.len(),
                })?;
                if key.block_height > end {
                    break;
                }
                entries.push((key, decode_address_value(cf::ADDRESS_INDEX, value)?));
            }
            iter.next();
        }
        iter.status()?;

        tracing::trace!(?address, ?range, entries = entries.len(), "Read address entries");

        Ok(entries)
    }

    fn read_timestamp_entries(&self, high: u32, low: u32) -> Result<Vec<TimestampEntry>> {
        self.ensure_enabled(IndexKind::Timestamp)?;

        if high < low {
            return Ok(Vec::new());
        }

        let cf_timestamp = self.cf(cf::TIMESTAMP)?;

        let mut entries = Vec::new();
        let mut iter = self.db.raw_iterator_cf(cf_timestamp);
        iter.seek(low.to_be_bytes());

        while iter.valid() {
            if let (Some(key), Some(value)) = (iter.key(), iter.value()) {
                let key = TimestampIndexKey::decode(key).ok_or(Error::MalformedEntry {
                    column: cf::TIMESTAMP,
                    len: key.len(),
                })?;
                if key.time > high {
                    break;
                }
                let value = TimestampIndexValue::decode(value).ok_or(Error::MalformedEntry {
                    column: cf::TIMESTAMP,
                    len: value.len(),
                })?;
                entries.push(TimestampEntry {
                    time: key.time,
                    block_hash: key.block_hash,
                    height: value.height,
                    logical_time: value.logical_time,
                });
            }
            iter.next();
        }
        iter.status()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressType;
    use crate::test_utils::{funding_transaction, spending_transaction, test_block};
    use bitcoin::Network;
    use tempfile::TempDir;

    fn alice() -> AddressKey {
        AddressKey::new(AddressType::PubkeyHash, &[0xa1; 20])
    }

    fn bob() -> AddressKey {
        AddressKey::new(AddressType::WitnessV0ScriptHash, &[0xb0; 32])
    }

    fn open_store(config: IndexConfig) -> (TempDir, IndexStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(temp_dir.path(), &config).unwrap();
        (temp_dir, store)
    }

    fn genesis(time: u32) -> Block {
        test_block(
            BlockHash::all_zeros(),
            time,
            vec![funding_transaction(&[(alice(), 5_000_000_000)], 0)],
        )
    }

    #[test]
    fn test_connect_and_read_address_entries() {
        let (_dir, store) = open_store(IndexConfig::enabled(Network::Regtest));

        let block0 = genesis(1_000);
        store.connect_block(&block0, 0, &SpentOutputs::new()).unwrap();

        let coinbase_out = OutPoint::new(block0.txdata[0].compute_txid(), 0);
        let spend = spending_transaction(&[coinbase_out], &[(bob(), 3_000), (alice(), 1_000)]);
        let block1 = test_block(
            block0.block_hash(),
            1_600,
            vec![funding_transaction(&[(bob(), 50)], 1), spend.clone()],
        );
        let spent = SpentOutputs::from([(coinbase_out, block0.txdata[0].output[0].clone())]);
        store.connect_block(&block1, 1, &spent).unwrap();

        let entries = store.read_address_entries(&alice(), HeightRange::ALL).unwrap();
        let summary: Vec<_> = entries
            .iter()
            .map(|(key, value)| (key.block_height, key.tx_index, key.spending, value.delta))
            .collect();
        assert_eq!(
            summary,
            vec![(0, 0, false, 5_000_000_000), (1, 1, true, -5_000_000_000), (1, 1, false, 1_000)]
        );
        // The debit of input 0 sorts before the credit of output 1.
        assert_eq!(entries[1].1.prevout, Some(coinbase_out));
        assert_eq!(entries[1].0.txid, spend.compute_txid());

        let bob_entries = store.read_address_entries(&bob(), HeightRange::ALL).unwrap();
        assert_eq!(bob_entries.len(), 2);
        assert!(bob_entries.iter().all(|(key, _)| key.address == bob()));

        assert_eq!(
            store.tip(),
            Some(IndexTip {
                height: 1,
                hash: block1.block_hash()
            })
        );
    }

    #[test]
    fn test_in_block_spend_is_resolved() {
        let (_dir, store) = open_store(IndexConfig::enabled(Network::Regtest));

        let coinbase = funding_transaction(&[(alice(), 700)], 0);
        let spend = spending_transaction(&[OutPoint::new(coinbase.compute_txid(), 0)], &[(bob(), 700)]);
        let block = test_block(BlockHash::all_zeros(), 1, vec![coinbase, spend]);

        store.connect_block(&block, 0, &SpentOutputs::new()).unwrap();

        let entries = store.read_address_entries(&alice(), HeightRange::ALL).unwrap();
        let deltas: Vec<_> = entries.iter().map(|(_, value)| value.delta).collect();
        assert_eq!(deltas, vec![700, -700]);
    }

    #[test]
    fn test_missing_prevout_writes_nothing() {
        let (_dir, store) = open_store(IndexConfig::enabled(Network::Regtest));

        let prevout = OutPoint::new(bitcoin::Txid::from_byte_array([3; 32]), 1);
        let block = test_block(
            BlockHash::all_zeros(),
            1,
            vec![
                funding_transaction(&[(alice(), 1)], 0),
                spending_transaction(&[prevout], &[(bob(), 1)]),
            ],
        );

        let err = store.connect_block(&block, 0, &SpentOutputs::new()).unwrap_err();
        assert!(matches!(err, Error::MissingPrevout(p) if p == prevout));
        assert_eq!(store.tip(), None);
        assert!(store.read_address_entries(&alice(), HeightRange::ALL).unwrap().is_empty());
    }

    #[test]
    fn test_connect_must_extend_tip() {
        let (_dir, store) = open_store(IndexConfig::enabled(Network::Regtest));

        let block0 = genesis(1);
        assert!(matches!(
            store.connect_block(&block0, 5, &SpentOutputs::new()),
            Err(Error::InvalidHeight(_))
        ));
        store.connect_block(&block0, 0, &SpentOutputs::new()).unwrap();

        let block1 = test_block(block0.block_hash(), 2, vec![funding_transaction(&[], 1)]);
        assert!(matches!(
            store.connect_block(&block1, 2, &SpentOutputs::new()),
            Err(Error::InvalidHeight(_))
        ));

        let orphan = test_block(BlockHash::all_zeros(), 2, vec![funding_transaction(&[], 1)]);
        assert!(matches!(
            store.connect_block(&orphan, 1, &SpentOutputs::new()),
            Err(Error::InvalidHeight(_))
        ));
    }

    #[test]
    fn test_connect_on_top_of_max_height_tip_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::enabled(Network::Regtest);
        let tip_hash = BlockHash::from_byte_array([7; 32]);

        {
            let store = IndexStore::open(temp_dir.path(), &config).unwrap();
            let tip = IndexTip {
                height: u32::MAX,
                hash: tip_hash,
            };
            store
                .db
                .put_cf(store.cf(cf::META).unwrap(), meta_keys::TIP, tip.encode())
                .unwrap();
        }

        let store = IndexStore::open(temp_dir.path(), &config).unwrap();
        assert_eq!(store.tip().map(|tip| tip.height), Some(u32::MAX));

        let block = test_block(tip_hash, 1, vec![funding_transaction(&[(alice(), 1)], 0)]);
        for height in [0, u32::MAX] {
            assert!(matches!(
                store.connect_block(&block, height, &SpentOutputs::new()),
                Err(Error::InvalidHeight(_))
            ));
        }
        assert_eq!(store.tip().map(|tip| tip.height), Some(u32::MAX));
    }

    #[test]
    fn test_disconnect_removes_address_entries_keeps_timestamps() {
        let (_dir, store) = open_store(IndexConfig::enabled(Network::Regtest));

        let block0 = genesis(100);
        store.connect_block(&block0, 0, &SpentOutputs::new()).unwrap();
        let block1 = test_block(
            block0.block_hash(),
            200,
            vec![funding_transaction(&[(alice(), 10), (bob(), 20)], 1)],
        );
        store.connect_block(&block1, 1, &SpentOutputs::new()).unwrap();

        assert!(matches!(
            store.disconnect_block(&block0, 0),
            Err(Error::NotTip(hash)) if hash == block0.block_hash()
        ));

        store.disconnect_block(&block1, 1).unwrap();

        assert_eq!(store.read_address_entries(&alice(), HeightRange::ALL).unwrap().len(), 1);
        assert!(store.read_address_entries(&bob(), HeightRange::ALL).unwrap().is_empty());
        assert!(store.read_height_entries(HeightRange::new(1, 1)).unwrap().is_empty());
        assert_eq!(
            store.tip(),
            Some(IndexTip {
                height: 0,
                hash: block0.block_hash()
            })
        );

        // The timestamp entry of the disconnected block is retained.
        let timestamps = store.read_timestamp_entries(300, 0).unwrap();
        let hashes: Vec<_> = timestamps.iter().map(|entry| entry.block_hash).collect();
        assert_eq!(hashes, vec![block0.block_hash(), block1.block_hash()]);

        store.disconnect_block(&block0, 0).unwrap();
        assert_eq!(store.tip(), None);
    }

    #[test]
    fn test_height_range_reads() {
        let (_dir, store) = open_store(IndexConfig::enabled(Network::Regtest));

        let mut prev = BlockHash::all_zeros();
        for height in 0..5u32 {
            let block = test_block(prev, height, vec![funding_transaction(&[(alice(), 1 + height as u64)], height)]);
            store.connect_block(&block, height, &SpentOutputs::new()).unwrap();
            prev = block.block_hash();
        }

        let heights = |range| -> Vec<u32> {
            store
                .read_address_entries(&alice(), range)
                .unwrap()
                .iter()
                .map(|(key, _)| key.block_height)
                .collect()
        };
        assert_eq!(heights(HeightRange::ALL), vec![0, 1, 2, 3, 4]);
        assert_eq!(heights(HeightRange::new(1, 3)), vec![1, 2, 3]);
        // A single bound is ignored.
        assert_eq!(heights(HeightRange::new(2, 0)), vec![0, 1, 2, 3, 4]);
        assert_eq!(heights(HeightRange::new(0, 2)), vec![0, 1, 2, 3, 4]);
        assert!(heights(HeightRange::new(3, 1)).is_empty());

        let by_height: Vec<_> = store
            .read_height_entries(HeightRange::new(3, 4))
            .unwrap()
            .iter()
            .map(|(key, value)| (key.block_height, value.delta))
            .collect();
        assert_eq!(by_height, vec![(3, 4), (4, 5)]);
    }

    #[test]
    fn test_timestamp_range_and_logical_time() {
        let (_dir, store) = open_store(IndexConfig::enabled(Network::Regtest));

        // Block times 60, 90, 80: the third block's logical time is bumped past its parent.
        let mut prev = BlockHash::all_zeros();
        let mut hashes = Vec::new();
        for (height, time) in [60u32, 90, 80].into_iter().enumerate() {
            let block = test_block(prev, time, vec![funding_transaction(&[], height as u32)]);
            store.connect_block(&block, height as u32, &SpentOutputs::new()).unwrap();
            prev = block.block_hash();
            hashes.push(prev);
        }

        let entries = store.read_timestamp_entries(100, 50).unwrap();
        let summary: Vec<_> = entries
            .iter()
            .map(|entry| (entry.time, entry.height, entry.logical_time))
            .collect();
        assert_eq!(summary, vec![(60, 0, 60), (80, 2, 91), (90, 1, 90)]);
        assert_eq!(store.block_logical_time(&hashes[2]).unwrap(), Some(91));

        // Bounds are inclusive.
        let bounded = store.read_timestamp_entries(80, 60).unwrap();
        assert_eq!(bounded.len(), 2);

        // Inverted range.
        assert!(store.read_timestamp_entries(50, 100).unwrap().is_empty());
    }

    #[test]
    fn test_disabled_indexes() {
        let (_dir, store) = open_store(IndexConfig::default());

        store.connect_block(&genesis(1), 0, &SpentOutputs::new()).unwrap();

        assert!(matches!(
            store.read_address_entries(&alice(), HeightRange::ALL),
            Err(Error::IndexDisabled(IndexKind::Address))
        ));
        assert!(matches!(
            store.read_height_entries(HeightRange::ALL),
            Err(Error::IndexDisabled(IndexKind::Address))
        ));
        assert!(matches!(
            store.read_timestamp_entries(10, 0),
            Err(Error::IndexDisabled(IndexKind::Timestamp))
        ));
        assert_eq!(store.tip().map(|tip| tip.height), Some(0));
    }

    #[test]
    fn test_reopen_restores_tip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::enabled(Network::Regtest);
        let block0 = genesis(1);

        {
            let store = IndexStore::open(temp_dir.path(), &config).unwrap();
            store.connect_block(&block0, 0, &SpentOutputs::new()).unwrap();
        }

        let store = IndexStore::open(temp_dir.path(), &config).unwrap();
        assert_eq!(
            store.tip(),
            Some(IndexTip {
                height: 0,
                hash: block0.block_hash()
            })
        );
        assert_eq!(store.read_address_entries(&alice(), HeightRange::ALL).unwrap().len(), 1);
    }
}
