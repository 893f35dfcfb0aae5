//! Moralis NFT index: tokens of one contract held by a wallet.

use std::time::Duration;

use async_trait::async_trait;
use evm_tx::{Address, U256};
use serde::Deserialize;
use tracing::warn;

use crate::error::{ClientError, ClientResult};

#[async_trait]
pub trait TokenIndex: Send + Sync {
    async fn wallet_tokens(
        &self,
        chain: &str,
        wallet: &Address,
        contract: &Address,
    ) -> ClientResult<Vec<U256>>;
}

#[derive(Debug, Deserialize)]
struct WalletNftsResponse {
    #[serde(default)]
    result: Vec<WalletNft>,
}

#[derive(Debug, Deserialize)]
struct WalletNft {
    token_id: String,
}

fn parse_token_ids(resp: WalletNftsResponse) -> Vec<U256> {
    resp.result
        .into_iter()
        .filter_map(|nft| match U256::from_dec_str(&nft.token_id) {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("Skipping token with non-decimal id {:?}", nft.token_id);
                None
            }
        })
        .collect()
}

pub struct MoralisClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MoralisClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl TokenIndex for MoralisClient {
    async fn wallet_tokens(
        &self,
        chain: &str,
        wallet: &Address,
        contract: &Address,
    ) -> ClientResult<Vec<U256>> {
        let resp = self
            .client
            .get(format!("{}/{}/nft", self.base_url, wallet))
            .header("accept", "application/json")
            .header("X-API-Key", &self.api_key)
            .query(&[
                ("chain", chain.to_string()),
                ("format", "decimal".to_string()),
                ("token_addresses[0]", contract.to_string()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status {
                service: "moralis",
                status: resp.status().as_u16(),
            });
        }
        let body: WalletNftsResponse = resp.json().await?;
        Ok(parse_token_ids(body))
    }
}
