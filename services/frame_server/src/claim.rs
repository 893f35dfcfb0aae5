//! The claim workflow: one straight line of guard clauses per request.
//!
//! ```text
//! contract ready? → fid present? → not claimed yet? → eligible?
//!   → token in stock (3 tries)? → recipient wallet? → transfer confirmed?
//!   → record claim
//! ```
//!
//! Every collaborator failure is absorbed here and turned into a
//! [`ClaimOutcome`]; nothing propagates to the HTTP layer.

use std::sync::Arc;

use evm_tx::{Address, U256};
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::{
    chain::NftContract,
    eligibility::{check_eligibility, EligibilityRule},
    error::{ClientError, ClientResult},
    frame::ClaimOutcome,
    moralis::TokenIndex,
    neynar::{IdentityResolver, SocialGraph},
    retry::RetryPolicy,
    store::ClaimStore,
};

/// Untrusted claim input taken from a frame action POST.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimRequest {
    pub fid: Option<u64>,
    /// Address supplied by the client. Logged only; the recipient always
    /// comes from the identity lookup.
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameActionBody {
    untrusted_data: Option<UntrustedData>,
}

#[derive(Debug, Default, Deserialize)]
struct UntrustedData {
    fid: Option<serde_json::Value>,
    address: Option<String>,
}

fn parse_fid(value: &serde_json::Value) -> Option<u64> {
    let fid = match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    // fid 0 is not a real account
    fid.filter(|f| *f != 0)
}

impl ClaimRequest {
    /// Never fails: anything unreadable is a request without a user id.
    pub fn from_body(body: &[u8]) -> Self {
        let parsed: FrameActionBody = match serde_json::from_slice(body) {
            Ok(b) => b,
            Err(e) => {
                debug!("Unreadable frame action body: {}", e);
                return Self::default();
            }
        };
        let data = parsed.untrusted_data.unwrap_or_default();
        Self {
            fid: data.fid.as_ref().and_then(parse_fid),
            address: data.address,
        }
    }
}

pub struct Collaborators {
    /// `None` when the contract handle could not be built at startup.
    pub contract: Option<Arc<dyn NftContract>>,
    pub social: Arc<dyn SocialGraph>,
    pub identity: Arc<dyn IdentityResolver>,
    pub tokens: Arc<dyn TokenIndex>,
}

pub struct ClaimWorkflow {
    contract: Option<Arc<dyn NftContract>>,
    social: Arc<dyn SocialGraph>,
    identity: Arc<dyn IdentityResolver>,
    tokens: Arc<dyn TokenIndex>,
    claims: Arc<dyn ClaimStore>,
    eligibility: EligibilityRule,
    token_retry: RetryPolicy,
    chain: String,
}

impl ClaimWorkflow {
    pub fn new(
        collaborators: Collaborators,
        claims: Arc<dyn ClaimStore>,
        eligibility: EligibilityRule,
        token_retry: RetryPolicy,
        chain: impl Into<String>,
    ) -> Self {
        Self {
            contract: collaborators.contract,
            social: collaborators.social,
            identity: collaborators.identity,
            tokens: collaborators.tokens,
            claims,
            eligibility,
            token_retry,
            chain: chain.into(),
        }
    }

    pub async fn claim(&self, request: &ClaimRequest) -> ClaimOutcome {
        let Some(contract) = self.contract.as_deref() else {
            error!("Claim rejected: NFT contract is not configured");
            return ClaimOutcome::ServerError;
        };

        let Some(fid) = request.fid else {
            info!("Claim rejected: no fid in frame payload");
            return ClaimOutcome::NoUserId;
        };
        if let Some(address) = &request.address {
            debug!(fid, address = %address, "client-supplied address ignored");
        }

        if self.claims.has_claimed(fid) {
            info!(fid, "Already claimed");
            return ClaimOutcome::AlreadyClaimed;
        }

        match check_eligibility(&*self.social, fid, &self.eligibility).await {
            Ok(result) => {
                let missing = result.missing();
                if !missing.is_empty() {
                    info!(fid, ?missing, "Not eligible yet");
                    return ClaimOutcome::try_again(missing);
                }
            }
            Err(e) => {
                warn!(fid, "Eligibility check failed: {}", e);
                return ClaimOutcome::TransferFailed;
            }
        }

        let service_wallet = contract.service_address();
        let token_ids = match self.lookup_tokens(&service_wallet, &contract.contract_address()).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(fid, "Token lookup gave up: {}", e);
                return ClaimOutcome::OutOfStock;
            }
        };
        let Some(token_id) = pick_token(&token_ids) else {
            return ClaimOutcome::OutOfStock;
        };

        let recipient = match self.resolve_recipient(fid).await {
            Some(r) => r,
            None => return ClaimOutcome::TransferFailed,
        };

        let pending = match contract
            .transfer_from(&service_wallet, &recipient, token_id)
            .await
        {
            Ok(p) => p,
            Err(e) => {
                warn!(fid, token = %token_id, "transferFrom failed: {}", e);
                return ClaimOutcome::TransferFailed;
            }
        };
        let receipt = match contract.confirm(&pending).await {
            Ok(r) => r,
            Err(e) => {
                warn!(fid, tx = %pending.tx_hash, "Transfer not confirmed: {}", e);
                return ClaimOutcome::TransferFailed;
            }
        };

        self.claims.record_claim(fid);
        info!(
            fid,
            token = %token_id,
            recipient = %recipient,
            tx = %receipt.tx_hash,
            "Claimed"
        );
        ClaimOutcome::Claimed
    }

    /// Tokens the service wallet still holds. An empty wallet counts as a
    /// failed attempt, so it is retried like an API error.
    async fn lookup_tokens(
        &self,
        wallet: &Address,
        contract: &Address,
    ) -> ClientResult<Vec<U256>> {
        self.token_retry
            .run("token lookup", |_| async move {
                let ids = self.tokens.wallet_tokens(&self.chain, wallet, contract).await?;
                if ids.is_empty() {
                    return Err(ClientError::NoTokens);
                }
                Ok(ids)
            })
            .await
    }

    async fn resolve_recipient(&self, fid: u64) -> Option<Address> {
        match self.identity.user_addresses(fid).await {
            Ok(Some(addresses)) => {
                let preferred = addresses.preferred();
                if preferred.is_none() {
                    warn!(fid, "User has no custody or verified address");
                }
                preferred
            }
            Ok(None) => {
                warn!(fid, "User not found");
                None
            }
            Err(e) => {
                warn!(fid, "User lookup failed: {}", e);
                None
            }
        }
    }
}

/// Uniform choice among the held tokens.
fn pick_token(token_ids: &[U256]) -> Option<U256> {
    token_ids.choose(&mut rand::thread_rng()).copied()
}
