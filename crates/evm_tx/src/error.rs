//! Errors raised while building or signing EVM transactions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvmTxError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("address must be 20 bytes, got {0}")]
    InvalidAddressLength(usize),

    #[error("invalid secp256k1 secret key")]
    InvalidSecretKey,

    #[error("return data must be 32 bytes, got {0}")]
    InvalidReturnData(usize),
}
