//! Hand-written collaborator mocks shared by the unit tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use evm_tx::{Address, U256};

use crate::{
    chain::{NftContract, PendingTransfer, TransferReceipt},
    claim::{ClaimWorkflow, Collaborators},
    eligibility::EligibilityRule,
    error::{ClientError, ClientResult},
    moralis::TokenIndex,
    neynar::{FollowingPage, IdentityResolver, ReactionKind, SocialGraph, UserAddresses},
    retry::RetryPolicy,
    store::InMemoryClaimStore,
};

pub const OWNER_FID: u64 = 99;
pub const CAST_HASH: &str = "0xcafe";
pub const SERVICE_WALLET: Address = Address([0x5e; 20]);
pub const RECIPIENT: Address = Address([0xaa; 20]);

pub fn rule() -> EligibilityRule {
    EligibilityRule {
        owner_fid: OWNER_FID,
        cast_hash: CAST_HASH.to_string(),
        require_follow: true,
        require_like: true,
        require_repost: true,
        max_following_pages: 5,
        reaction_limit: 100,
    }
}

// ── Social graph ────────────────────────────────────────────────

pub struct MockSocial {
    following_pages: Vec<Vec<u64>>,
    likes: Vec<String>,
    recasts: Vec<String>,
    fail: bool,
    following_calls: AtomicUsize,
    reaction_calls: AtomicUsize,
}

impl MockSocial {
    /// Follows `owner_fid`, liked and reposted `cast_hash`.
    pub fn engaged(owner_fid: u64, cast_hash: &str) -> Self {
        Self {
            following_pages: vec![vec![owner_fid]],
            likes: vec![cast_hash.to_string()],
            recasts: vec![cast_hash.to_string()],
            fail: false,
            following_calls: AtomicUsize::new(0),
            reaction_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_following_pages(mut self, pages: Vec<Vec<u64>>) -> Self {
        self.following_pages = pages;
        self
    }

    pub fn with_likes(mut self, likes: Vec<String>) -> Self {
        self.likes = likes;
        self
    }

    pub fn with_recasts(mut self, recasts: Vec<String>) -> Self {
        self.recasts = recasts;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn following_calls(&self) -> usize {
        self.following_calls.load(Ordering::SeqCst)
    }

    pub fn reaction_calls(&self) -> usize {
        self.reaction_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SocialGraph for MockSocial {
    async fn following_page(&self, _fid: u64, cursor: Option<&str>) -> ClientResult<FollowingPage> {
        self.following_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClientError::Status {
                service: "neynar",
                status: 500,
            });
        }
        let idx: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let next_cursor = (idx + 1 < self.following_pages.len()).then(|| (idx + 1).to_string());
        Ok(FollowingPage {
            fids: self.following_pages.get(idx).cloned().unwrap_or_default(),
            next_cursor,
        })
    }

    async fn reactions(&self, _fid: u64, kind: ReactionKind, _limit: u32) -> ClientResult<Vec<String>> {
        self.reaction_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClientError::Status {
                service: "neynar",
                status: 500,
            });
        }
        Ok(match kind {
            ReactionKind::Like => self.likes.clone(),
            ReactionKind::Recast => self.recasts.clone(),
        })
    }
}

// ── Identity ────────────────────────────────────────────────────

pub struct MockIdentity {
    addresses: Option<UserAddresses>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockIdentity {
    pub fn primary(address: Address) -> Self {
        Self::with(Some(UserAddresses {
            custody_address: Some(Address([0x01; 20])),
            verified_primary_address: Some(address),
        }))
    }

    pub fn with(addresses: Option<UserAddresses>) -> Self {
        Self {
            addresses,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            addresses: None,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for MockIdentity {
    async fn user_addresses(&self, _fid: u64) -> ClientResult<Option<UserAddresses>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClientError::Rpc("identity down".to_string()));
        }
        Ok(self.addresses.clone())
    }
}

// ── Token index ─────────────────────────────────────────────────

pub struct MockTokens {
    responses: Mutex<VecDeque<Result<Vec<U256>, String>>>,
    fallback: Vec<U256>,
    calls: AtomicUsize,
}

impl MockTokens {
    pub fn always(ids: Vec<U256>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: ids,
            calls: AtomicUsize::new(0),
        }
    }

    /// Scripted responses, then an empty wallet.
    pub fn sequence(responses: Vec<Result<Vec<U256>, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenIndex for MockTokens {
    async fn wallet_tokens(
        &self,
        _chain: &str,
        _wallet: &Address,
        _contract: &Address,
    ) -> ClientResult<Vec<U256>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(ids)) => Ok(ids),
            Some(Err(e)) => Err(ClientError::Rpc(e)),
            None => Ok(self.fallback.clone()),
        }
    }
}

// ── Contract ────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferBehavior {
    Confirm,
    FailSubmit,
    Revert,
}

pub struct MockContract {
    behavior: TransferBehavior,
    transfers: Mutex<Vec<(Address, Address, U256)>>,
    calls: AtomicUsize,
}

impl MockContract {
    pub fn new(behavior: TransferBehavior) -> Self {
        Self {
            behavior,
            transfers: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn transfers(&self) -> Vec<(Address, Address, U256)> {
        self.transfers.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NftContract for MockContract {
    fn service_address(&self) -> Address {
        SERVICE_WALLET
    }

    fn contract_address(&self) -> Address {
        Address([0xc0; 20])
    }

    async fn transfer_from(
        &self,
        from: &Address,
        to: &Address,
        token_id: U256,
    ) -> ClientResult<PendingTransfer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.behavior == TransferBehavior::FailSubmit {
            return Err(ClientError::Rpc("insufficient funds for gas".to_string()));
        }
        self.transfers.lock().unwrap().push((*from, *to, token_id));
        Ok(PendingTransfer {
            tx_hash: format!("0x{:064x}", token_id),
        })
    }

    async fn confirm(&self, pending: &PendingTransfer) -> ClientResult<TransferReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            TransferBehavior::Revert => Err(ClientError::Reverted(pending.tx_hash.clone())),
            _ => Ok(TransferReceipt {
                tx_hash: pending.tx_hash.clone(),
                block_number: Some(1),
            }),
        }
    }

    async fn balance_of(&self, _owner: &Address) -> ClientResult<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(U256::from(self.transfers.lock().unwrap().len()))
    }
}

// ── Harness ─────────────────────────────────────────────────────

pub struct Harness {
    pub social: Arc<MockSocial>,
    pub identity: Arc<MockIdentity>,
    pub tokens: Arc<MockTokens>,
    pub contract: Arc<MockContract>,
    pub claims: Arc<InMemoryClaimStore>,
}

impl Harness {
    pub fn new(
        social: MockSocial,
        identity: MockIdentity,
        tokens: MockTokens,
        contract: MockContract,
    ) -> Self {
        Self {
            social: Arc::new(social),
            identity: Arc::new(identity),
            tokens: Arc::new(tokens),
            contract: Arc::new(contract),
            claims: Arc::new(InMemoryClaimStore::new()),
        }
    }

    /// Eligible user, three tokens in stock, resolvable recipient.
    pub fn happy() -> Self {
        Self::new(
            MockSocial::engaged(OWNER_FID, CAST_HASH),
            MockIdentity::primary(RECIPIENT),
            MockTokens::always(vec![U256::from(1u64), U256::from(2u64), U256::from(3u64)]),
            MockContract::new(TransferBehavior::Confirm),
        )
    }

    fn collaborators(&self, with_contract: bool) -> Collaborators {
        Collaborators {
            contract: with_contract.then(|| self.contract.clone() as Arc<dyn NftContract>),
            social: self.social.clone(),
            identity: self.identity.clone(),
            tokens: self.tokens.clone(),
        }
    }

    pub fn workflow(&self) -> ClaimWorkflow {
        ClaimWorkflow::new(
            self.collaborators(true),
            self.claims.clone(),
            rule(),
            RetryPolicy::linear(3, Duration::from_secs(1)),
            "base",
        )
    }

    pub fn workflow_without_contract(&self) -> ClaimWorkflow {
        ClaimWorkflow::new(
            self.collaborators(false),
            self.claims.clone(),
            rule(),
            RetryPolicy::linear(3, Duration::from_secs(1)),
            "base",
        )
    }

    pub fn external_calls(&self) -> usize {
        self.social.following_calls()
            + self.social.reaction_calls()
            + self.identity.calls()
            + self.tokens.calls()
            + self.contract.calls()
    }
}
