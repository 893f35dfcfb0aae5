//! Record of user ids that already received their NFT.

use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};

/// Claim bookkeeping injected into the workflow. The in-memory store is the
/// only implementation; a persistent one can replace it behind this trait.
pub trait ClaimStore: Send + Sync {
    fn has_claimed(&self, fid: u64) -> bool;

    /// Returns `false` if `fid` was already recorded.
    fn record_claim(&self, fid: u64) -> bool;

    fn claimed_count(&self) -> usize;
}

/// Process-local set, empty at start and lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryClaimStore {
    claimed: Mutex<HashSet<u64>>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClaimStore for InMemoryClaimStore {
    fn has_claimed(&self, fid: u64) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&fid)
    }

    fn record_claim(&self, fid: u64) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fid)
    }

    fn claimed_count(&self) -> usize {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
