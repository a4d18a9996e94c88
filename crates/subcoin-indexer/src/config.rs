//! Index configuration.

use bitcoin::Network;

/// Number of confirmations before a coinbase output is spendable.
pub const COINBASE_MATURITY: u32 = 100;

/// How many times a query re-reads the chain tip before giving up.
pub const DEFAULT_MAX_CHAIN_RETRIES: u32 = 3;

/// The secondary indexes maintained by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Address deltas (`-addressindex`).
    Address,
    /// Block hashes by time (`-timestampindex`).
    Timestamp,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Address => write!(f, "Address index"),
            Self::Timestamp => write!(f, "Timestamp index"),
        }
    }
}

/// Configuration of the secondary indexes.
///
/// Passed explicitly to the store and the query engine; immutable after creation.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Whether the address index is maintained and queryable.
    pub address_index: bool,
    /// Whether the timestamp index is maintained and queryable.
    pub timestamp_index: bool,
    /// Confirmations required before a coinbase output counts as spendable.
    pub coinbase_maturity: u32,
    /// Re-reads of the chain tip allowed before a query fails with
    /// [`Error::ChainInconsistent`](crate::Error::ChainInconsistent).
    pub max_chain_retries: u32,
    /// Network used to decode and encode addresses.
    pub network: Network,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            address_index: false,
            timestamp_index: false,
            coinbase_maturity: COINBASE_MATURITY,
            max_chain_retries: DEFAULT_MAX_CHAIN_RETRIES,
            network: Network::Bitcoin,
        }
    }
}

impl IndexConfig {
    /// Configuration with both indexes enabled.
    pub fn enabled(network: Network) -> Self {
        Self {
            address_index: true,
            timestamp_index: true,
            network,
            ..Default::default()
        }
    }

    /// Returns whether the given index is turned on.
    pub fn is_enabled(&self, kind: IndexKind) -> bool {
        match kind {
            IndexKind::Address => self.address_index,
            IndexKind::Timestamp => self.timestamp_index,
        }
    }
}

/// Index CLI params.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Args)]
pub struct IndexParams {
    /// Maintain a full address index, used to query for the balance, txids and
    /// deltas of any address.
    #[arg(long)]
    pub addressindex: bool,

    /// Maintain a timestamp index for block hashes, used to query blocks hashes
    /// by a range of timestamps.
    #[arg(long)]
    pub timestampindex: bool,

    /// Confirmations before a coinbase output is reported as spendable.
    #[arg(long, default_value_t = COINBASE_MATURITY)]
    pub coinbase_maturity: u32,

    /// Maximum number of chain tip re-reads for queries that need a consistent tip.
    #[arg(long, default_value_t = DEFAULT_MAX_CHAIN_RETRIES)]
    pub max_chain_retries: u32,
}

#[cfg(feature = "cli")]
impl IndexParams {
    /// Converts the CLI params into an [`IndexConfig`] for the given network.
    pub fn index_config(&self, network: Network) -> IndexConfig {
        IndexConfig {
            address_index: self.addressindex,
            timestamp_index: self.timestampindex,
            coinbase_maturity: self.coinbase_maturity,
            max_chain_retries: self.max_chain_retries,
            network,
        }
    }
}
