//! Address deltas of unconfirmed transactions.

use crate::address::AddressKey;
use crate::key::{MempoolAddressDelta, MempoolAddressDeltaKey};
use crate::types::MempoolAddressEntry;
use crate::{Error, Result, SpentOutputs};
use bitcoin::{Transaction, Txid};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
struct Inner {
    deltas: BTreeMap<MempoolAddressDeltaKey, MempoolAddressDelta>,
    /// Keys inserted per transaction, for removal.
    inserted: HashMap<Txid, Vec<MempoolAddressDeltaKey>>,
}

/// In-memory address index over the mempool.
///
/// Owned by the mempool manager, which calls [`Self::add_transaction`] on
/// acceptance and [`Self::remove_transaction`] when a transaction is confirmed
/// or evicted. Readers get a point-in-time copy of the matching entries.
#[derive(Debug, Default)]
pub struct MempoolAddressIndex {
    inner: RwLock<Inner>,
}

impl MempoolAddressIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes the address deltas of `tx`, accepted into the mempool at `time`.
    ///
    /// `spent` must contain the outputs spent by every input of `tx`. Re-adding
    /// a transaction replaces its previous entries. Returns the number of
    /// entries indexed.
    pub fn add_transaction(&self, tx: &Transaction, time: i64, spent: &SpentOutputs) -> Result<usize> {
        let txid = tx.compute_txid();
        let mut entries = Vec::new();

        if !tx.is_coinbase() {
            for (input_index, input) in tx.input.iter().enumerate() {
                let prevout = input.previous_output;
                let spent_output = spent.get(&prevout).ok_or(Error::MissingPrevout(prevout))?;
                if let Some(address) = AddressKey::from_script(&spent_output.script_pubkey) {
                    entries.push((
                        MempoolAddressDeltaKey {
                            address,
                            txid,
                            index: input_index as u32,
                            spending: true,
                        },
                        MempoolAddressDelta {
                            time,
                            amount: -(spent_output.value.to_sat() as i64),
                            prevout: Some(prevout),
                        },
                    ));
                }
            }
        }

        for (vout, output) in tx.output.iter().enumerate() {
            if let Some(address) = AddressKey::from_script(&output.script_pubkey) {
                entries.push((
                    MempoolAddressDeltaKey {
                        address,
                        txid,
                        index: vout as u32,
                        spending: false,
                    },
                    MempoolAddressDelta {
                        time,
                        amount: output.value.to_sat() as i64,
                        prevout: None,
                    },
                ));
            }
        }

        let count = entries.len();

        let mut inner = self.inner.write();
        Self::remove_locked(&mut inner, &txid);
        let keys = entries.iter().map(|(key, _)| *key).collect();
        inner.deltas.extend(entries);
        inner.inserted.insert(txid, keys);

        tracing::trace!(%txid, count, "Indexed mempool transaction");

        Ok(count)
    }

    /// Drops every entry of `txid`. Returns the number of entries removed.
    pub fn remove_transaction(&self, txid: &Txid) -> usize {
        let mut inner = self.inner.write();
        let removed = Self::remove_locked(&mut inner, txid);
        if removed > 0 {
            tracing::trace!(%txid, removed, "Removed mempool transaction from address index");
        }
        removed
    }

    fn remove_locked(inner: &mut Inner, txid: &Txid) -> usize {
        let Some(keys) = inner.inserted.remove(txid) else {
            return 0;
        };
        for key in &keys {
            inner.deltas.remove(key);
        }
        keys.len()
    }

    /// Returns the deltas of `addresses`, ordered by address then key.
    pub fn address_deltas(&self, addresses: &[AddressKey]) -> Vec<MempoolAddressEntry> {
        let inner = self.inner.read();

        let mut result = Vec::new();
        for address in addresses {
            let matching = inner
                .deltas
                .range(MempoolAddressDeltaKey::lowest(*address)..)
                .take_while(|(key, _)| key.address == *address)
                .map(|(key, delta)| MempoolAddressEntry {
                    address: key.address,
                    txid: key.txid,
                    index: key.index,
                    spending: key.spending,
                    satoshis: delta.amount,
                    time: delta.time,
                    prevout: delta.prevout,
                });
            result.extend(matching);
        }
        result
    }

    /// Returns `true` if `txid` has indexed entries.
    pub fn contains(&self, txid: &Txid) -> bool {
        self.inner.read().inserted.contains_key(txid)
    }

    /// Number of indexed deltas.
    pub fn len(&self) -> usize {
        self.inner.read().deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
