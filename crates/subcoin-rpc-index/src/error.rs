use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::types::error::ErrorObject;
use subcoin_indexer::Error as IndexError;

/// Index RPC errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

// Bitcoin Core RPC error codes
// See: https://github.com/bitcoin/bitcoin/blob/master/src/rpc/protocol.h
mod rpc_error_code {
    /// Invalid address or key
    pub const RPC_INVALID_ADDRESS_OR_KEY: i32 = -5;
    /// Database error
    pub const RPC_DATABASE_ERROR: i32 = -20;
    /// General application-defined error
    pub const RPC_MISC_ERROR: i32 = -1;
}

impl From<Error> for ErrorObjectOwned {
    fn from(e: Error) -> ErrorObjectOwned {
        use rpc_error_code::*;

        tracing::debug!(error = %e, "Index RPC request failed");

        let code = match &e {
            Error::Index(IndexError::InvalidAddress(_) | IndexError::AddressIndexUnavailable(_)) => {
                RPC_INVALID_ADDRESS_OR_KEY
            }
            Error::Index(
                IndexError::Rocksdb(_)
                | IndexError::MalformedEntry { .. }
                | IndexError::NotInitialized
                | IndexError::Io(_),
            ) => RPC_DATABASE_ERROR,
            _ => RPC_MISC_ERROR,
        };

        ErrorObject::owned(code, e.to_string(), None::<()>)
    }
}
