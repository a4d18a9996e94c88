//! Block and transaction builders shared by the unit tests.

use crate::address::AddressKey;
use bitcoin::blockdata::block::{Header, Version};
use bitcoin::blockdata::transaction::{Transaction, TxIn, TxOut, Version as TxVersion};
use bitcoin::hashes::Hash;
use bitcoin::{Amount, Block, BlockHash, CompactTarget, OutPoint, ScriptBuf};

fn outputs(outputs: &[(AddressKey, u64)]) -> Vec<TxOut> {
    outputs
        .iter()
        .map(|(address, value)| TxOut {
            value: Amount::from_sat(*value),
            script_pubkey: address.script_pubkey(),
        })
        .collect()
}

/// A coinbase transaction paying `outputs`. `salt` makes the txid unique.
pub fn funding_transaction(outputs_to: &[(AddressKey, u64)], salt: u32) -> Transaction {
    let mut coinbase_script = vec![0x04];
    coinbase_script.extend_from_slice(&salt.to_le_bytes());

    Transaction {
        version: TxVersion::TWO,
        lock_time: bitcoin::absolute::LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: ScriptBuf::from_bytes(coinbase_script),
            sequence: bitcoin::Sequence::MAX,
            witness: bitcoin::Witness::new(),
        }],
        output: outputs(outputs_to),
    }
}

/// A transaction spending `inputs` into `outputs`.
pub fn spending_transaction(inputs: &[OutPoint], outputs_to: &[(AddressKey, u64)]) -> Transaction {
    Transaction {
        version: TxVersion::TWO,
        lock_time: bitcoin::absolute::LockTime::ZERO,
        input: inputs
            .iter()
            .map(|op| TxIn {
                previous_output: *op,
                script_sig: ScriptBuf::new(),
                sequence: bitcoin::Sequence::MAX,
                witness: bitcoin::Witness::new(),
            })
            .collect(),
        output: outputs(outputs_to),
    }
}

/// A block on top of `prev_blockhash`. The first transaction should be a coinbase.
pub fn test_block(prev_blockhash: BlockHash, time: u32, txdata: Vec<Transaction>) -> Block {
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
