//! Queries over the confirmed indexes, the mempool overlay and the active chain.

use crate::address::AddressKey;
use crate::chain::{filter_active_only, ChainView};
use crate::config::{IndexConfig, IndexKind};
use crate::mempool::MempoolAddressIndex;
use crate::store::IndexReader;
use crate::types::{
    AddressBalance, AddressDelta, BlockHashesOptions, HeightRange, MempoolAddressEntry,
    TimestampEntry,
};
use crate::{AddressIndexEntry, Error, Result};
use bitcoin::Txid;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Answers address and timestamp queries.
///
/// Holds read-only handles to the store, the active chain and optionally the
/// mempool overlay. Cheap to share between request handlers.
pub struct IndexQuery<R, C> {
    reader: Arc<R>,
    chain: Arc<C>,
    mempool: Option<Arc<MempoolAddressIndex>>,
    config: IndexConfig,
}

impl<R, C> Clone for IndexQuery<R, C> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            chain: self.chain.clone(),
            mempool: self.mempool.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, C> IndexQuery<R, C>
where
    R: IndexReader,
    C: ChainView,
{
    /// Creates a new query engine.
    pub fn new(reader: Arc<R>, chain: Arc<C>, config: IndexConfig) -> Self {
        Self {
            reader,
            chain,
            mempool: None,
            config,
        }
    }

    /// Attaches the mempool overlay used by [`Self::address_mempool`].
    pub fn with_mempool(mut self, mempool: Arc<MempoolAddressIndex>) -> Self {
        self.mempool = Some(mempool);
        self
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Fails with [`Error::IndexDisabled`] unless `kind` is turned on.
    pub fn ensure_enabled(&self, kind: IndexKind) -> Result<()> {
        if self.config.is_enabled(kind) {
            Ok(())
        } else {
            Err(Error::IndexDisabled(kind))
        }
    }

    /// Decodes address strings for the configured network.
    pub fn decode_addresses<S: AsRef<str>>(&self, addresses: &[S]) -> Result<Vec<AddressKey>> {
        addresses
            .iter()
            .map(|address| AddressKey::decode(address.as_ref(), self.config.network))
            .collect()
    }

    /// Reads the entries of every address, failing as a whole if any read fails.
    fn fetch_address_entries(
        &self,
        addresses: &[AddressKey],
        range: HeightRange,
    ) -> Result<Vec<Vec<AddressIndexEntry>>> {
        addresses
            .iter()
            .map(|address| {
                self.reader
                    .read_address_entries(address, range)
                    .map_err(Error::unavailable)
            })
            .collect()
    }

    /// Runs `f` against one frozen view of the chain.
    ///
    /// If the live tip no longer matches the view once `f` returns, `f` runs
    /// again on a fresh view, up to `max_chain_retries` more times.
    fn with_consistent_tip<T>(&self, mut f: impl FnMut(&C::Snapshot) -> Result<T>) -> Result<T> {
        let attempts = self.config.max_chain_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let snapshot = self.chain.snapshot();
            let tip = snapshot.tip();
            let result = f(&snapshot)?;
            if self.chain.tip() == tip {
                return Ok(result);
            }
            tracing::debug!(attempt, ?tip, "Chain tip moved during query, retrying");
        }

        Err(Error::ChainInconsistent { attempts })
    }

    /// Balance of `addresses`, combined.
    pub fn address_balance(&self, addresses: &[AddressKey]) -> Result<AddressBalance> {
        self.ensure_enabled(IndexKind::Address)?;
        self.with_consistent_tip(|chain| {
            let entries = self.fetch_address_entries(addresses, HeightRange::ALL)?;
            Ok(AddressBalance::aggregate(
                entries.iter().flatten(),
                chain.tip().map(|tip| tip.height),
                self.config.coinbase_maturity,
            ))
        })
    }

    /// Distinct txids touching `addresses` within `range`, ascending by height.
    ///
    /// See [`collect_txids`] for the order within a height.
    pub fn address_txids(&self, addresses: &[AddressKey], range: HeightRange) -> Result<Vec<Txid>> {
        self.ensure_enabled(IndexKind::Address)?;
        let entries = self.fetch_address_entries(addresses, range)?;
        Ok(collect_txids(entries.iter().flatten(), addresses.len() > 1))
    }

    /// Every confirmed delta of `addresses` within `range`.
    ///
    /// Deltas of one address come in key order; several addresses are merged by
    /// height, keeping the request order within a height.
    pub fn address_deltas(&self, addresses: &[AddressKey], range: HeightRange) -> Result<Vec<AddressDelta>> {
        self.ensure_enabled(IndexKind::Address)?;
        let entries = self.fetch_address_entries(addresses, range)?;
        let mut deltas: Vec<AddressDelta> = entries.iter().flatten().map(AddressDelta::from).collect();
        if addresses.len() > 1 {
            deltas.sort_by_key(|delta| delta.block_height);
        }
        Ok(deltas)
    }

    /// Unconfirmed deltas of `addresses`, ascending by mempool entry time.
    pub fn address_mempool(&self, addresses: &[AddressKey]) -> Result<Vec<MempoolAddressEntry>> {
        self.ensure_enabled(IndexKind::Address)?;
        let Some(mempool) = &self.mempool else {
            return Ok(Vec::new());
        };
        let mut entries = mempool.address_deltas(addresses);
        entries.sort_by_key(|entry| entry.time);
        Ok(entries)
    }

    /// Blocks with `low <= time <= high`, ascending by time.
    ///
    /// With `no_orphans`, blocks no longer on the active chain are dropped; the
    /// whole filter pass is evaluated against one frozen view of the chain.
    pub fn block_hashes(&self, high: u32, low: u32, options: BlockHashesOptions) -> Result<Vec<TimestampEntry>> {
        self.ensure_enabled(IndexKind::Timestamp)?;
        let read = || {
            self.reader
                .read_timestamp_entries(high, low)
                .map_err(Error::unavailable)
        };

        if !options.no_orphans {
            return read();
        }

        self.with_consistent_tip(|chain| {
            let mut entries = read()?;
            filter_active_only(&mut entries, chain);
            Ok(entries)
        })
    }
}

/// Distinct txids of `entries`, ascending by height.
///
/// With a single address the scan order within a height is kept and a
/// `(height, txid)` pair is emitted the first time it is seen. With several
/// addresses all pairs are collected first and emitted ordered by height, then
/// by the txid's hex string.
pub fn collect_txids<'a>(
    entries: impl IntoIterator<Item = &'a AddressIndexEntry>,
    multiple_addresses: bool,
) -> Vec<Txid> {
    if multiple_addresses {
        let mut ordered = BTreeMap::new();
        for (key, _) in entries {
            ordered.insert((key.block_height, key.txid.to_string()), key.txid);
        }
        ordered.into_values().collect()
    } else {
        let mut seen = HashSet::new();
        entries
            .into_iter()
            .filter(|(key, _)| seen.insert((key.block_height, key.txid)))
            .map(|(key, _)| key.txid)
            .collect()
    }
}
