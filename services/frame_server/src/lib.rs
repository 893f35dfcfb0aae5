//! BEPE NFT claim frame.
//!
//! Farcaster frame service that hands out one NFT per user once they follow
//! the owner account and like and repost the announcement cast. Tokens come
//! from the service wallet's own holdings and are sent with a locally signed
//! ERC-721 `transferFrom`.

pub mod chain;
pub mod claim;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod frame;
pub mod moralis;
pub mod neynar;
pub mod retry;
pub mod server;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
