//! EIP-155 legacy transactions, signed locally with a secp256k1 key.

use libsecp256k1::{Message, SecretKey};
use primitive_types::U256;

use crate::{address::keccak256, rlp::RlpList, Address, EvmTxError};

/// Parse a hex private key, with or without `0x`.
pub fn parse_secret_key(s: &str) -> Result<SecretKey, EvmTxError> {
    let trimmed = s.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(stripped)?;
    SecretKey::parse_slice(&bytes).map_err(|_| EvmTxError::InvalidSecretKey)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

#[derive(Clone, Debug)]
pub struct SignedTransaction {
    pub raw: Vec<u8>,
    pub hash: [u8; 32],
}

impl SignedTransaction {
    /// `0x`-prefixed form expected by `eth_sendRawTransaction`.
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }
}

impl LegacyTransaction {
    fn base_fields(&self) -> RlpList {
        let mut list = RlpList::new();
        list.append_u64(self.nonce)
            .append_uint(self.gas_price)
            .append_u64(self.gas_limit)
            .append_bytes(self.to.as_bytes())
            .append_uint(self.value)
            .append_bytes(&self.data);
        list
    }

    /// RLP(nonce, gasPrice, gas, to, value, data, chainId, 0, 0)
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut list = self.base_fields();
        list.append_u64(self.chain_id).append_u64(0).append_u64(0);
        list.finish()
    }

    pub fn signing_hash(&self) -> [u8; 32] {
        keccak256(&self.signing_payload())
    }

    pub fn sign(&self, key: &SecretKey) -> SignedTransaction {
        let message = Message::parse(&self.signing_hash());
        let (signature, recovery_id) = libsecp256k1::sign(&message, key);
        let sig = signature.serialize();

        let v = u64::from(recovery_id.serialize()) + 35 + self.chain_id * 2;
        let r = U256::from_big_endian(&sig[..32]);
        let s = U256::from_big_endian(&sig[32..]);

        let mut list = self.base_fields();
        list.append_u64(v).append_uint(r).append_uint(s);
        let raw = list.finish();
        let hash = keccak256(&raw);
        SignedTransaction { raw, hash }
    }
}
