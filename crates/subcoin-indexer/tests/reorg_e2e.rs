//! End-to-end tests for the indexes across a chain reorganization.
//!
//! A mock node drives the store, the active chain and the mempool overlay the
//! way the validation engine and mempool manager would, then checks what the
//! query engine reports before and after the reorg.

use bitcoin::blockdata::block::{Header, Version};
use bitcoin::blockdata::transaction::{Transaction, TxIn, TxOut, Version as TxVersion};
use bitcoin::hashes::Hash;
use bitcoin::{Amount, Block, BlockHash, CompactTarget, Network, OutPoint, ScriptBuf};
use std::sync::Arc;
use subcoin_indexer::{
    ActiveChain, AddressKey, BlockHashesOptions, ChainView, HeightRange, IndexConfig, IndexQuery,
    IndexStore, MempoolAddressIndex, SpentOutputs,
};

const ALICE: &str = "mh5CE8Nbj38iND267s4XnvhSmhDW7yWc6Q";
const BOB: &str = "bcrt1qxvenxvenxvenxvenxvenxvenxvenxvenztev8a";

fn address(address: &str) -> AddressKey {
    AddressKey::decode(address, Network::Regtest).unwrap()
}

fn coinbase(to: &AddressKey, value: u64, height: u32) -> Transaction {
    let mut coinbase_script = vec![0x03];
    coinbase_script.extend_from_slice(&height.to_le_bytes()[..3]);

    Transaction {
        version: TxVersion::TWO,
        lock_time: bitcoin::absolute::LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: ScriptBuf::from_bytes(coinbase_script),
            sequence: bitcoin::Sequence::MAX,
            witness: bitcoin::Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(value),
            script_pubkey: to.script_pubkey(),
        }],
    }
}

fn spend(prevout: OutPoint, to: &AddressKey, value: u64) -> Transaction {
    Transaction {
        version: TxVersion::TWO,
        lock_time: bitcoin::absolute::LockTime::ZERO,
        input: vec![TxIn {
            previous_output: prevout,
            script_sig: ScriptBuf::new(),
            sequence: bitcoin::Sequence::MAX,
            witness: bitcoin::Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(value),
            script_pubkey: to.script_pubkey(),
        }],
    }
}

fn block(prev_blockhash: BlockHash, time: u32, txdata: Vec<Transaction>) -> Block {
    let mut block = Block {
        header: Header {
            version: Version::TWO,
            prev_blockhash,
            merkle_root: bitcoin::TxMerkleNode::all_zeros(),
            time,
            bits: CompactTarget::from_consensus(0),
            nonce: 0,
        },
        txdata,
    };
    if let Some(merkle_root) = block.compute_merkle_root() {
        block.header.merkle_root = merkle_root;
    }
    block
}

/// Drives the index the way the validation engine does.
struct MockNode {
    store: Arc<IndexStore>,
    chain: Arc<ActiveChain>,
    mempool: Arc<MempoolAddressIndex>,
    blocks: Vec<Block>,
    /// Every output ever created, standing in for the UTXO set and undo data.
    outputs: SpentOutputs,
    _dir: tempfile::TempDir,
}

impl MockNode {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(dir.path(), &IndexConfig::enabled(Network::Regtest)).unwrap();
        Self {
            store: Arc::new(store),
            chain: Arc::new(ActiveChain::new()),
            mempool: Arc::new(MempoolAddressIndex::new()),
            blocks: Vec::new(),
            outputs: SpentOutputs::new(),
            _dir: dir,
        }
    }

    fn query(&self) -> IndexQuery<IndexStore, ActiveChain> {
        IndexQuery::new(self.store.clone(), self.chain.clone(), self.store.config().clone())
            .with_mempool(self.mempool.clone())
    }

    fn tip_hash(&self) -> BlockHash {
        self.chain
            .tip()
            .map(|tip| tip.hash)
            .unwrap_or_else(BlockHash::all_zeros)
    }

    fn connect(&mut self, time: u32, txdata: Vec<Transaction>) -> Block {
        let height = self.blocks.len() as u32;
        let block = block(self.tip_hash(), time, txdata);

        self.store.connect_block(&block, height, &self.outputs).unwrap();
        self.chain.push(block.block_hash());

        for tx in &block.txdata {
            let txid = tx.compute_txid();
            self.mempool.remove_transaction(&txid);
            for (vout, output) in tx.output.iter().enumerate() {
                self.outputs.insert(OutPoint::new(txid, vout as u32), output.clone());
            }
        }

        self.blocks.push(block.clone());
        block
    }

    fn disconnect(&mut self) -> Block {
        let block = self.blocks.pop().unwrap();
        let height = self.blocks.len() as u32;

        self.store.disconnect_block(&block, height).unwrap();
        self.chain.pop();

        // Non-coinbase transactions go back to the mempool.
        for tx in block.txdata.iter().skip(1) {
            self.mempool.add_transaction(tx, i64::from(block.header.time), &self.outputs).unwrap();
        }

        block
    }
}

fn hashes(entries: &[subcoin_indexer::TimestampEntry]) -> Vec<BlockHash> {
    entries.iter().map(|entry| entry.block_hash).collect()
}

#[test]
fn test_reorg_updates_address_index() {
    let alice = address(ALICE);
    let bob = address(BOB);
    let mut node = MockNode::new();

    let genesis = node.connect(1_000, vec![coinbase(&alice, 50_000, 0)]);
    let genesis_out = OutPoint::new(genesis.txdata[0].compute_txid(), 0);

    let payment = spend(genesis_out, &bob, 40_000);
    let payment_txid = payment.compute_txid();
    let block1 = node.connect(1_600, vec![coinbase(&alice, 50_000, 1), payment.clone()]);
    let block2 = node.connect(2_200, vec![coinbase(&bob, 50_000, 2)]);

    let query = node.query();

    let balance = query.address_balance(&[alice]).unwrap();
    assert_eq!(balance.received, 100_000);
    assert_eq!(balance.balance, 50_000);
    // Both coinbases of alice are below maturity, the spend of the first is not a coinbase entry.
    assert_eq!(balance.balance_immature, 100_000);
    assert_eq!(balance.balance_spendable, -50_000);

    let bob_txids = query.address_txids(&[bob], HeightRange::ALL).unwrap();
    assert_eq!(bob_txids, vec![payment_txid, block2.txdata[0].compute_txid()]);

    // Reorg out blocks 2 and 1, replace them by a single heavier branch.
    node.disconnect();
    node.disconnect();
    assert!(node.mempool.contains(&payment_txid));
    assert_eq!(node.query().address_mempool(&[bob]).unwrap()[0].satoshis, 40_000);

    let block1b = node.connect(1_500, vec![coinbase(&alice, 50_000, 11)]);
    let block2b = node.connect(2_100, vec![coinbase(&alice, 50_000, 12), payment.clone()]);
    assert!(!node.mempool.contains(&payment_txid));

    let query = node.query();

    // Bob only has the payment, now confirmed at height 2.
    let deltas = query.address_deltas(&[bob], HeightRange::ALL).unwrap();
    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas[0].block_height, 2);
    assert_eq!(deltas[0].txid, payment_txid);
    assert!(query.address_mempool(&[bob]).unwrap().is_empty());

    let balance = query.address_balance(&[alice, bob]).unwrap();
    assert_eq!(balance.received, 190_000);
    assert_eq!(balance.balance, 140_000);
    assert_eq!(
        balance.balance,
        balance.balance_spendable + balance.balance_immature
    );

    // Timestamp entries of the orphaned blocks are kept but filtered on request.
    let all = query
        .block_hashes(u32::MAX, 0, BlockHashesOptions::default())
        .unwrap();
    assert_eq!(
        hashes(&all),
        vec![
            genesis.block_hash(),
            block1b.block_hash(),
            block1.block_hash(),
            block2b.block_hash(),
            block2.block_hash()
        ]
    );

    let options = BlockHashesOptions {
        no_orphans: true,
        logical_times: true,
    };
    let active = query.block_hashes(u32::MAX, 0, options).unwrap();
    assert_eq!(
        hashes(&active),
        vec![genesis.block_hash(), block1b.block_hash(), block2b.block_hash()]
    );
    let heights: Vec<_> = active.iter().map(|entry| entry.height).collect();
    assert_eq!(heights, vec![0, 1, 2]);
}

#[test]
fn test_coinbase_matures_with_chain() {
    let alice = address(ALICE);
    let mut node = MockNode::new();

    node.connect(0, vec![coinbase(&alice, 5_000, 0)]);

    // Tip at height 99: one confirmation short.
    for height in 1..100u32 {
        node.connect(height, vec![coinbase(&address(BOB), 1, height)]);
    }
    let balance = node.query().address_balance(&[alice]).unwrap();
    assert_eq!(balance.balance_immature, 5_000);

    node.connect(100, vec![coinbase(&address(BOB), 1, 100)]);
    let balance = node.query().address_balance(&[alice]).unwrap();
    assert_eq!(balance.balance_immature, 0);
    assert_eq!(balance.balance_spendable, 5_000);
}

#[test]
fn test_invalid_and_foreign_addresses() {
    let mainnet = "12ZEw5Hcv1hTb6YUQJ69y1V7uhcoDz92PH";
    assert!(AddressKey::decode(mainnet, Network::Regtest).is_err());
    assert!(AddressKey::decode("bcrt1qinvalid", Network::Regtest).is_err());

    let node = MockNode::new();
    let err = node
        .query()
        .decode_addresses(&[ALICE, mainnet])
        .unwrap_err();
    assert!(err.to_string().contains(mainnet));

    // Unused addresses have no history.
    let unused = AddressKey::new(subcoin_indexer::AddressType::WitnessV1Taproot, &[7; 32]);
    assert!(node
        .query()
        .address_txids(&[unused], HeightRange::ALL)
        .unwrap()
        .is_empty());
}
