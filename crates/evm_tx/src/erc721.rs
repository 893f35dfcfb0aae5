//! ERC-721 call data builders.

use primitive_types::U256;

use crate::{Address, EvmTxError, BALANCE_OF_SELECTOR, TRANSFER_FROM_SELECTOR};

fn uint_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// `transferFrom(from, to, tokenId)`
pub fn encode_transfer_from(from: &Address, to: &Address, token_id: U256) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * 3);
    data.extend_from_slice(&TRANSFER_FROM_SELECTOR);
    data.extend_from_slice(&from.to_word());
    data.extend_from_slice(&to.to_word());
    data.extend_from_slice(&uint_word(token_id));
    data
}

/// `balanceOf(owner)`
pub fn encode_balance_of(owner: &Address) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&BALANCE_OF_SELECTOR);
    data.extend_from_slice(&owner.to_word());
    data
}

/// Decode a single `uint256` return value.
pub fn decode_uint(data: &[u8]) -> Result<U256, EvmTxError> {
    if data.len() != 32 {
        return Err(EvmTxError::InvalidReturnData(data.len()));
    }
    Ok(U256::from_big_endian(data))
}
