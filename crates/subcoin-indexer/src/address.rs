//! Decoding of addresses into the fixed-width keys used by the address index.

use crate::{Error, Result};
use bitcoin::{Address, Network, Script, ScriptBuf};
use std::str::FromStr;

/// Width of the hash field in every address index key.
///
/// 20-byte hashes are stored left-aligned and zero-padded.
pub const ADDRESS_HASH_LEN: usize = 32;

/// Address encoding variant, stored as the first byte of every address index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum AddressType {
    /// P2PKH, 20-byte key hash.
    PubkeyHash = 1,
    /// P2SH, 20-byte script hash.
    ScriptHash = 2,
    /// P2WPKH, 20-byte key hash.
    WitnessV0KeyHash = 3,
    /// P2WSH, 32-byte script hash.
    WitnessV0ScriptHash = 4,
    /// P2TR, 32-byte output key.
    WitnessV1Taproot = 5,
}

impl AddressType {
    /// Parses the on-disk discriminant.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::PubkeyHash),
            2 => Some(Self::ScriptHash),
            3 => Some(Self::WitnessV0KeyHash),
            4 => Some(Self::WitnessV0ScriptHash),
            5 => Some(Self::WitnessV1Taproot),
            _ => None,
        }
    }

    /// Length of the hash payload for this address type.
    pub fn hash_len(self) -> usize {
        match self {
            Self::PubkeyHash | Self::ScriptHash | Self::WitnessV0KeyHash => 20,
            Self::WitnessV0ScriptHash | Self::WitnessV1Taproot => 32,
        }
    }
}

/// The `(type, hash)` pair identifying an address in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressKey {
    pub address_type: AddressType,
    pub hash: [u8; ADDRESS_HASH_LEN],
}

impl AddressKey {
    /// Creates a key from a hash payload of the length `address_type` expects.
    ///
    /// Extra bytes beyond [`AddressType::hash_len`] are ignored.
    pub fn new(address_type: AddressType, payload: &[u8]) -> Self {
        let len = address_type.hash_len().min(payload.len());
        let mut hash = [0u8; ADDRESS_HASH_LEN];
        hash[..len].copy_from_slice(&payload[..len]);
        Self { address_type, hash }
    }

    /// Extracts the indexable address from a scriptPubKey.
    ///
    /// Returns `None` for scripts that do not pay to one of the five indexed
    /// address types (bare multisig, OP_RETURN, unknown witness versions, ...).
    pub fn from_script(script: &Script) -> Option<Self> {
        let bytes = script.as_bytes();
        if script.is_p2pkh() {
            Some(Self::new(AddressType::PubkeyHash, &bytes[3..23]))
        } else if script.is_p2sh() {
            Some(Self::new(AddressType::ScriptHash, &bytes[2..22]))
        } else if script.is_p2wpkh() {
            Some(Self::new(AddressType::WitnessV0KeyHash, &bytes[2..22]))
        } else if script.is_p2wsh() {
            Some(Self::new(AddressType::WitnessV0ScriptHash, &bytes[2..34]))
        } else if script.is_p2tr() {
            Some(Self::new(AddressType::WitnessV1Taproot, &bytes[2..34]))
        } else {
            None
        }
    }

    /// Decodes an address string for `network`.
    ///
    /// Fails with [`Error::InvalidAddress`] if the string is malformed, belongs to
    /// another network or is not one of the indexed address types.
    pub fn decode(address: &str, network: Network) -> Result<Self> {
        let invalid = || Error::InvalidAddress(address.to_string());

        let address = Address::from_str(address)
            .map_err(|_| invalid())?
            .require_network(network)
            .map_err(|_| invalid())?;

        Self::from_script(&address.script_pubkey()).ok_or_else(invalid)
    }

    /// The hash payload without padding.
    pub fn payload(&self) -> &[u8] {
        &self.hash[..self.address_type.hash_len()]
    }

    /// Rebuilds the scriptPubKey paying to this address.
    pub fn script_pubkey(&self) -> ScriptBuf {
        let payload = self.payload();
        let mut script = Vec::with_capacity(payload.len() + 5);
        match self.address_type {
            AddressType::PubkeyHash => {
                // OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
                script.extend_from_slice(&[0x76, 0xa9, 0x14]);
                script.extend_from_slice(payload);
                script.extend_from_slice(&[0x88, 0xac]);
            }
            AddressType::ScriptHash => {
                // OP_HASH160 <20> OP_EQUAL
                script.extend_from_slice(&[0xa9, 0x14]);
                script.extend_from_slice(payload);
                script.push(0x87);
            }
            AddressType::WitnessV0KeyHash | AddressType::WitnessV0ScriptHash => {
                script.extend_from_slice(&[0x00, payload.len() as u8]);
                script.extend_from_slice(payload);
            }
            AddressType::WitnessV1Taproot => {
                script.extend_from_slice(&[0x51, 0x20]);
                script.extend_from_slice(payload);
            }
        }
        ScriptBuf::from_bytes(script)
    }

    /// Encodes this key as an address string for `network`.
    pub fn to_address(&self, network: Network) -> Option<Address> {
        Address::from_script(&self.script_pubkey(), network).ok()
    }
}
