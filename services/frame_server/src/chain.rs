//! ERC-721 contract access over EVM JSON-RPC.
//!
//! Transactions are built and signed locally (see `evm_tx`) and submitted
//! with `eth_sendRawTransaction`; the node never holds the key.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use evm_tx::{
    erc721, parse_secret_key, Address, EvmTxError, LegacyTransaction, SecretKey, U256,
    GAS_LIMIT_HEADROOM_PCT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::FrameConfig,
    error::{ClientError, ClientResult},
};

/// Interval between `eth_getTransactionReceipt` polls.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a submitted, not yet confirmed transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTransfer {
    pub tx_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

#[async_trait]
pub trait NftContract: Send + Sync {
    /// Wallet that holds the claimable tokens and signs transfers.
    fn service_address(&self) -> Address;

    fn contract_address(&self) -> Address;

    async fn transfer_from(
        &self,
        from: &Address,
        to: &Address,
        token_id: U256,
    ) -> ClientResult<PendingTransfer>;

    /// Wait until the transfer is mined. A reverted transaction is an error.
    async fn confirm(&self, pending: &PendingTransfer) -> ClientResult<TransferReceipt>;

    async fn balance_of(&self, owner: &Address) -> ClientResult<U256>;
}

#[derive(Debug, Error)]
pub enum ContractInitError {
    #[error("PRIVATE_KEY is not set")]
    MissingPrivateKey,

    #[error("NFT_CONTRACT_ADDRESS is not set")]
    MissingContractAddress,

    #[error("invalid PRIVATE_KEY: {0}")]
    InvalidPrivateKey(EvmTxError),

    #[error("invalid NFT_CONTRACT_ADDRESS: {0}")]
    InvalidContractAddress(EvmTxError),

    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

// ── JSON-RPC helpers ────────────────────────────────────────────

#[derive(Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

fn parse_quantity_u64(value: &serde_json::Value) -> ClientResult<u64> {
    let s = value
        .as_str()
        .ok_or_else(|| ClientError::Decode(format!("expected hex quantity, got {value}")))?;
    u64::from_str_radix(strip_hex_prefix(s), 16)
        .map_err(|e| ClientError::Decode(format!("bad quantity {s:?}: {e}")))
}

fn parse_quantity_u256(value: &serde_json::Value) -> ClientResult<U256> {
    let s = value
        .as_str()
        .ok_or_else(|| ClientError::Decode(format!("expected hex quantity, got {value}")))?;
    U256::from_str_radix(strip_hex_prefix(s), 16)
        .map_err(|_| ClientError::Decode(format!("bad quantity {s:?}")))
}

fn parse_data(value: &serde_json::Value) -> ClientResult<Vec<u8>> {
    let s = value
        .as_str()
        .ok_or_else(|| ClientError::Decode(format!("expected hex data, got {value}")))?;
    hex::decode(strip_hex_prefix(s)).map_err(|e| ClientError::Decode(format!("bad hex data: {e}")))
}

/// `None` while the receipt is not available yet.
fn receipt_outcome(
    tx_hash: &str,
    receipt: &serde_json::Value,
) -> Option<ClientResult<TransferReceipt>> {
    if receipt.is_null() {
        return None;
    }
    let block_number = parse_quantity_u64(&receipt["blockNumber"]).ok();
    match receipt["status"].as_str() {
        Some("0x1") => Some(Ok(TransferReceipt {
            tx_hash: tx_hash.to_string(),
            block_number,
        })),
        Some(_) => Some(Err(ClientError::Reverted(tx_hash.to_string()))),
        None => Some(Err(ClientError::Decode(format!(
            "receipt for {tx_hash} has no status"
        )))),
    }
}

// ── Contract client ─────────────────────────────────────────────

pub struct EvmNftContract {
    client: reqwest::Client,
    rpc_url: String,
    signer: SecretKey,
    sender: Address,
    contract: Address,
    chain_id: u64,
    confirm_timeout: Duration,
}

impl EvmNftContract {
    pub fn from_config(config: &FrameConfig) -> Result<Self, ContractInitError> {
        let key = config
            .private_key
            .as_deref()
            .ok_or(ContractInitError::MissingPrivateKey)?;
        let signer = parse_secret_key(key).map_err(ContractInitError::InvalidPrivateKey)?;
        let contract = config
            .contract_address
            .as_deref()
            .ok_or(ContractInitError::MissingContractAddress)?
            .parse::<Address>()
            .map_err(ContractInitError::InvalidContractAddress)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
            sender: Address::from_secret_key(&signer),
            signer,
            contract,
            chain_id: config.chain_id,
            confirm_timeout: Duration::from_secs(config.confirm_timeout_secs),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn call(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> ClientResult<serde_json::Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let resp: RpcResponse = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = resp.error {
            return Err(ClientError::Rpc(format!("{method}: {err}")));
        }
        Ok(resp.result.unwrap_or_default())
    }

    /// Chain id reported by the node, for the startup sanity check.
    pub async fn node_chain_id(&self) -> ClientResult<u64> {
        let result = self.call("eth_chainId", serde_json::json!([])).await?;
        parse_quantity_u64(&result)
    }
}

#[async_trait]
impl NftContract for EvmNftContract {
    fn service_address(&self) -> Address {
        self.sender
    }

    fn contract_address(&self) -> Address {
        self.contract
    }

    async fn transfer_from(
        &self,
        from: &Address,
        to: &Address,
        token_id: U256,
    ) -> ClientResult<PendingTransfer> {
        let data = erc721::encode_transfer_from(from, to, token_id);
        let sender = self.sender.to_string();

        let nonce = parse_quantity_u64(
            &self
                .call("eth_getTransactionCount", serde_json::json!([&sender, "pending"]))
                .await?,
        )?;
        let gas_price =
            parse_quantity_u256(&self.call("eth_gasPrice", serde_json::json!([])).await?)?;
        let estimate = parse_quantity_u64(
            &self
                .call(
                    "eth_estimateGas",
                    serde_json::json!([{
                        "from": &sender,
                        "to": self.contract.to_string(),
                        "data": format!("0x{}", hex::encode(&data)),
                    }]),
                )
                .await?,
        )?;
        let gas_limit = estimate.saturating_mul(GAS_LIMIT_HEADROOM_PCT) / 100;

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to: self.contract,
            value: U256::zero(),
            data,
            chain_id: self.chain_id,
        };
        let signed = tx.sign(&self.signer);
        debug!(
            "Signed transferFrom nonce={} gas_limit={} hash={}",
            nonce,
            gas_limit,
            signed.hash_hex()
        );

        let result = self
            .call("eth_sendRawTransaction", serde_json::json!([signed.raw_hex()]))
            .await?;
        let tx_hash = result
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| signed.hash_hex());
        info!("transferFrom token {} -> {} submitted: {}", token_id, to, tx_hash);
        Ok(PendingTransfer { tx_hash })
    }

    async fn confirm(&self, pending: &PendingTransfer) -> ClientResult<TransferReceipt> {
        let start = Instant::now();
        loop {
            let receipt = self
                .call(
                    "eth_getTransactionReceipt",
                    serde_json::json!([pending.tx_hash]),
                )
                .await?;
            if let Some(outcome) = receipt_outcome(&pending.tx_hash, &receipt) {
                return outcome;
            }

            if start.elapsed() > self.confirm_timeout {
                return Err(ClientError::Timeout(pending.tx_hash.clone()));
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }

    async fn balance_of(&self, owner: &Address) -> ClientResult<U256> {
        let data = erc721::encode_balance_of(owner);
        let result = self
            .call(
                "eth_call",
                serde_json::json!([
                    {
                        "to": self.contract.to_string(),
                        "data": format!("0x{}", hex::encode(&data)),
                    },
                    "latest"
                ]),
            )
            .await?;
        erc721::decode_uint(&parse_data(&result)?)
            .map_err(|e| ClientError::Decode(format!("balanceOf: {e}")))
    }
}
