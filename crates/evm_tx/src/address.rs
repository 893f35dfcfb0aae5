//! 20-byte EVM account address.

use std::{fmt, str::FromStr};

use libsecp256k1::{PublicKey, SecretKey};
use sha3::{Digest, Keccak256};

use crate::error::EvmTxError;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut h = Keccak256::new();
    h.update(data);
    h.finalize().into()
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Derive the address controlled by `key`: the last 20 bytes of
    /// keccak256 over the uncompressed public key without its `0x04` tag.
    pub fn from_secret_key(key: &SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(key);
        let hash = keccak256(&public_key.serialize()[1..]);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Left-pad to a 32-byte ABI word.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl FromStr for Address {
    type Err = EvmTxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let stripped = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(stripped)?;
        let arr: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| EvmTxError::InvalidAddressLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_secret_key() {
        let mut raw = [0u8; 32];
        raw[31] = 1;
        let key = SecretKey::parse(&raw).unwrap();
        assert_eq!(
            Address::from_secret_key(&key).to_string(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_parse_accepts_checksummed_and_prefixless() {
        let a: Address = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".parse().unwrap();
        let b: Address = "7e5f4552091a69125d5dfcb7b8c2659029395bdf".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "0x1234".parse::<Address>(),
            Err(EvmTxError::InvalidAddressLength(2))
        ));
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(EvmTxError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_to_word_left_pads() {
        let a = Address([0xab; 20]);
        let word = a.to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &[0xab; 20]);
    }
}
