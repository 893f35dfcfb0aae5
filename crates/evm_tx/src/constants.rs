//! Hardcoded ERC-721 selectors and transaction defaults.

/// `transferFrom(address,address,uint256)`
pub const TRANSFER_FROM_SELECTOR: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];

/// `balanceOf(address)`
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Base mainnet chain id.
pub const BASE_CHAIN_ID: u64 = 8453;

/// Gas estimate multiplier in percent, applied on top of `eth_estimateGas`.
pub const GAS_LIMIT_HEADROOM_PCT: u64 = 120;
