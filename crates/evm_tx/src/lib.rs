//! # evm_tx
//!
//! Pinned EVM primitives for the BEPE claim frame: addresses, RLP encoding,
//! EIP-155 legacy transaction signing and the ERC-721 call data the service
//! is allowed to produce. Only `transferFrom` and `balanceOf` are supported,
//! there is no arbitrary call forwarding.

pub mod address;
pub mod constants;
pub mod erc721;
pub mod error;
pub mod rlp;
pub mod transaction;

pub use address::{keccak256, Address};
pub use constants::*;
pub use error::EvmTxError;
pub use transaction::{parse_secret_key, LegacyTransaction, SignedTransaction};

pub use libsecp256k1::SecretKey;
pub use primitive_types::U256;
