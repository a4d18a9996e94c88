//! Read access to the active chain.
//!
//! The validation engine owns and mutates the active chain; the index only asks
//! two questions of it: where the tip is and whether a block is on the chain.

use crate::types::TimestampEntry;
use bitcoin::BlockHash;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Height and hash of a chain tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTip {
    pub height: u32,
    pub hash: BlockHash,
}

/// Read-only view of the active chain.
pub trait ChainView: Send + Sync {
    /// A view that no longer follows chain updates.
    type Snapshot: ChainView;

    /// Current tip, `None` before genesis is connected.
    fn tip(&self) -> Option<ChainTip>;

    /// Returns `true` if `hash` is on the active chain.
    fn contains(&self, hash: &BlockHash) -> bool;

    /// Freezes the chain as it is now.
    ///
    /// Every answer of the returned view comes from the same chain tip.
    fn snapshot(&self) -> Self::Snapshot;
}

impl<T: ChainView + ?Sized> ChainView for Arc<T> {
    type Snapshot = T::Snapshot;

    fn tip(&self) -> Option<ChainTip> {
        (**self).tip()
    }

    fn contains(&self, hash: &BlockHash) -> bool {
        (**self).contains(hash)
    }

    fn snapshot(&self) -> Self::Snapshot {
        (**self).snapshot()
    }
}

#[derive(Debug, Clone, Default)]
struct ChainState {
    hashes: Vec<BlockHash>,
    heights: HashMap<BlockHash, u32>,
}

impl ChainState {
    fn tip(&self) -> Option<ChainTip> {
        let height = self.hashes.len().checked_sub(1)?;
        Some(ChainTip {
            height: height as u32,
            hash: self.hashes[height],
        })
    }
}

/// An in-memory active chain, genesis to tip.
///
/// Writers replace the state copy-on-write, so a [`ChainSnapshot`] taken before a
/// mutation keeps seeing the chain it was taken from.
#[derive(Debug, Default)]
pub struct ActiveChain {
    state: RwLock<Arc<ChainState>>,
}

impl ActiveChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block to the tip. Returns its height.
    pub fn push(&self, hash: BlockHash) -> u32 {
        let mut guard = self.state.write();
        let state = Arc::make_mut(&mut *guard);
        let height = state.hashes.len() as u32;
        state.hashes.push(hash);
        state.heights.insert(hash, height);
        height
    }

    /// Removes the tip block and returns it.
    pub fn pop(&self) -> Option<ChainTip> {
        let mut guard = self.state.write();
        let state = Arc::make_mut(&mut *guard);
        let tip = state.tip()?;
        state.hashes.pop();
        state.heights.remove(&tip.hash);
        Some(tip)
    }

    /// Height of `hash` if it is on the active chain.
    pub fn height_of(&self, hash: &BlockHash) -> Option<u32> {
        self.state.read().heights.get(hash).copied()
    }

    /// Hash of the active block at `height`.
    pub fn hash_at(&self, height: u32) -> Option<BlockHash> {
        self.state.read().hashes.get(height as usize).copied()
    }

}

impl ChainView for ActiveChain {
    type Snapshot = ChainSnapshot;

    fn tip(&self) -> Option<ChainTip> {
        self.state.read().tip()
    }

    fn contains(&self, hash: &BlockHash) -> bool {
        self.state.read().heights.contains_key(hash)
    }

    fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot(self.state.read().clone())
    }
}

/// A frozen view of the active chain at one instant.
#[derive(Debug, Clone)]
pub struct ChainSnapshot(Arc<ChainState>);

impl ChainView for ChainSnapshot {
    type Snapshot = Self;

    fn tip(&self) -> Option<ChainTip> {
        self.0.tip()
    }

    fn contains(&self, hash: &BlockHash) -> bool {
        self.0.heights.contains_key(hash)
    }

    fn snapshot(&self) -> Self {
        self.clone()
    }
}

/// Removes every entry whose block is not on the active chain of `chain`.
pub fn filter_active_only(entries: &mut Vec<TimestampEntry>, chain: &impl ChainView) {
    entries.retain(|entry| chain.contains(&entry.block_hash));
}
