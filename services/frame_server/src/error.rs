//! Failures raised by the external collaborators (Neynar, Moralis, EVM RPC).
//!
//! None of these reach the HTTP layer: the claim workflow maps every variant
//! onto a frame outcome.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("transaction {0} reverted")]
    Reverted(String),

    #[error("timeout waiting for confirmation of {0}")]
    Timeout(String),

    #[error("no tokens held by the service wallet")]
    NoTokens,
}

pub type ClientResult<T> = Result<T, ClientError>;
