//! Engagement checks gating a claim: follow the owner, like and repost the
//! announcement cast.

use tracing::debug;

use crate::{
    config::FrameConfig,
    error::ClientResult,
    frame::Requirement,
    neynar::{ReactionKind, SocialGraph},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EligibilityRule {
    pub owner_fid: u64,
    pub cast_hash: String,
    pub require_follow: bool,
    pub require_like: bool,
    pub require_repost: bool,
    /// Upper bound on following pages walked per check.
    pub max_following_pages: u32,
    pub reaction_limit: u32,
}

impl From<&FrameConfig> for EligibilityRule {
    fn from(config: &FrameConfig) -> Self {
        Self {
            owner_fid: config.owner_fid,
            cast_hash: config.required_cast_hash.clone(),
            require_follow: config.require_follow,
            require_like: config.require_like,
            require_repost: config.require_repost,
            max_following_pages: config.max_following_pages,
            reaction_limit: config.reaction_limit,
        }
    }
}

/// Conditions that are not required are never queried and count as met.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EligibilityResult {
    pub is_following: bool,
    pub has_liked: bool,
    pub has_reposted: bool,
}

impl EligibilityResult {
    pub fn is_met(&self, requirement: Requirement) -> bool {
        match requirement {
            Requirement::Follow => self.is_following,
            Requirement::Like => self.has_liked,
            Requirement::Repost => self.has_reposted,
        }
    }

    /// Unmet conditions in follow, like, repost order.
    pub fn missing(&self) -> Vec<Requirement> {
        Requirement::ALL
            .into_iter()
            .filter(|r| !self.is_met(*r))
            .collect()
    }
}

async fn is_following(
    graph: &dyn SocialGraph,
    fid: u64,
    owner_fid: u64,
    max_pages: u32,
) -> ClientResult<bool> {
    let mut cursor: Option<String> = None;
    for page_no in 0..max_pages.max(1) {
        let page = graph.following_page(fid, cursor.as_deref()).await?;
        if page.fids.contains(&owner_fid) {
            return Ok(true);
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Ok(false),
        }
        debug!(fid, page = page_no + 1, "following list continues");
    }
    debug!(fid, max_pages, "following page limit reached");
    Ok(false)
}

async fn has_reacted(
    graph: &dyn SocialGraph,
    fid: u64,
    kind: ReactionKind,
    cast_hash: &str,
    limit: u32,
) -> ClientResult<bool> {
    let hashes = graph.reactions(fid, kind, limit).await?;
    Ok(hashes.iter().any(|h| h.eq_ignore_ascii_case(cast_hash)))
}

/// Runs the required checks concurrently; every one completes before the
/// result is returned. The first API failure wins.
pub async fn check_eligibility(
    graph: &dyn SocialGraph,
    fid: u64,
    rule: &EligibilityRule,
) -> ClientResult<EligibilityResult> {
    let follow = async {
        if !rule.require_follow {
            return Ok(true);
        }
        is_following(graph, fid, rule.owner_fid, rule.max_following_pages).await
    };
    let like = async {
        if !rule.require_like {
            return Ok(true);
        }
        has_reacted(graph, fid, ReactionKind::Like, &rule.cast_hash, rule.reaction_limit).await
    };
    let repost = async {
        if !rule.require_repost {
            return Ok(true);
        }
        has_reacted(graph, fid, ReactionKind::Recast, &rule.cast_hash, rule.reaction_limit).await
    };

    let (follow, like, repost) = tokio::join!(follow, like, repost);
    Ok(EligibilityResult {
        is_following: follow?,
        has_liked: like?,
        has_reposted: repost?,
    })
}
