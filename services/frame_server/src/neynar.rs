//! Neynar (Farcaster) API: social graph, reactions and wallet identity.

use std::time::Duration;

use async_trait::async_trait;
use evm_tx::Address;
use serde::Deserialize;
use tracing::warn;

use crate::error::{ClientError, ClientResult};

const FOLLOWING_PAGE_LIMIT: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionKind {
    Like,
    Recast,
}

impl ReactionKind {
    fn as_query(self) -> &'static str {
        match self {
            ReactionKind::Like => "likes",
            ReactionKind::Recast => "recasts",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FollowingPage {
    pub fids: Vec<u64>,
    pub next_cursor: Option<String>,
}

/// Wallets attached to a Farcaster account.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UserAddresses {
    pub custody_address: Option<Address>,
    pub verified_primary_address: Option<Address>,
}

impl UserAddresses {
    /// Verified primary wallet first, custody wallet otherwise.
    pub fn preferred(&self) -> Option<Address> {
        self.verified_primary_address.or(self.custody_address)
    }
}

#[async_trait]
pub trait SocialGraph: Send + Sync {
    async fn following_page(&self, fid: u64, cursor: Option<&str>) -> ClientResult<FollowingPage>;

    /// Hashes of the casts `fid` reacted to, most recent first.
    async fn reactions(&self, fid: u64, kind: ReactionKind, limit: u32) -> ClientResult<Vec<String>>;
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `None` when the user is unknown.
    async fn user_addresses(&self, fid: u64) -> ClientResult<Option<UserAddresses>>;
}

// ── Wire types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BulkUsersResponse {
    #[serde(default)]
    users: Vec<NeynarUser>,
}

#[derive(Debug, Deserialize)]
struct NeynarUser {
    custody_address: Option<String>,
    #[serde(default)]
    verified_addresses: VerifiedAddresses,
}

#[derive(Debug, Default, Deserialize)]
struct VerifiedAddresses {
    primary: Option<PrimaryAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct PrimaryAddress {
    eth_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FollowingResponse {
    #[serde(default)]
    users: Vec<FollowEntry>,
    next: Option<NextCursor>,
}

#[derive(Debug, Deserialize)]
struct FollowEntry {
    user: FollowedUser,
}

#[derive(Debug, Deserialize)]
struct FollowedUser {
    fid: u64,
}

#[derive(Debug, Deserialize)]
struct NextCursor {
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReactionsResponse {
    #[serde(default)]
    reactions: Vec<Reaction>,
}

#[derive(Debug, Deserialize)]
struct Reaction {
    cast: ReactedCast,
}

#[derive(Debug, Deserialize)]
struct ReactedCast {
    hash: String,
}

fn parse_wallet(raw: Option<String>, kind: &str) -> Option<Address> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    match raw.parse::<Address>() {
        Ok(a) => Some(a),
        Err(e) => {
            warn!("Ignoring malformed {} address {:?}: {}", kind, raw, e);
            None
        }
    }
}

impl From<NeynarUser> for UserAddresses {
    fn from(user: NeynarUser) -> Self {
        let primary = user
            .verified_addresses
            .primary
            .and_then(|p| p.eth_address);
        Self {
            custody_address: parse_wallet(user.custody_address, "custody"),
            verified_primary_address: parse_wallet(primary, "primary"),
        }
    }
}

impl From<FollowingResponse> for FollowingPage {
    fn from(resp: FollowingResponse) -> Self {
        Self {
            fids: resp.users.into_iter().map(|u| u.user.fid).collect(),
            next_cursor: resp
                .next
                .and_then(|n| n.cursor)
                .filter(|c| !c.is_empty()),
        }
    }
}

// ── HTTP client ─────────────────────────────────────────────────

pub struct NeynarClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NeynarClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("accept", "application/json")
            .header("x-api-key", &self.api_key)
            .query(query)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status {
                service: "neynar",
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl SocialGraph for NeynarClient {
    async fn following_page(&self, fid: u64, cursor: Option<&str>) -> ClientResult<FollowingPage> {
        let mut query = vec![
            ("fid", fid.to_string()),
            ("limit", FOLLOWING_PAGE_LIMIT.to_string()),
        ];
        if let Some(c) = cursor {
            query.push(("cursor", c.to_string()));
        }
        let resp: FollowingResponse = self.get("/v2/farcaster/following", &query).await?;
        Ok(resp.into())
    }

    async fn reactions(&self, fid: u64, kind: ReactionKind, limit: u32) -> ClientResult<Vec<String>> {
        let query = [
            ("fid", fid.to_string()),
            ("type", kind.as_query().to_string()),
            ("limit", limit.to_string()),
        ];
        let resp: ReactionsResponse = self.get("/v2/farcaster/reactions/user", &query).await?;
        Ok(resp.reactions.into_iter().map(|r| r.cast.hash).collect())
    }
}

#[async_trait]
impl IdentityResolver for NeynarClient {
    async fn user_addresses(&self, fid: u64) -> ClientResult<Option<UserAddresses>> {
        let resp: BulkUsersResponse = self
            .get("/v2/farcaster/user/bulk", &[("fids", fid.to_string())])
            .await?;
        Ok(resp.users.into_iter().next().map(UserAddresses::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTODY: &str = "0x1111111111111111111111111111111111111111";
    const PRIMARY: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_user_prefers_verified_primary() {
        let body = format!(
            r#"{{ "users": [{{
                "fid": 3,
                "custody_address": "{CUSTODY}",
                "verified_addresses": {{
                    "eth_addresses": ["{PRIMARY}"],
                    "primary": {{ "eth_address": "{PRIMARY}", "sol_address": null }}
                }}
            }}] }}"#
        );
        let resp: BulkUsersResponse = serde_json::from_str(&body).unwrap();
        let addrs = UserAddresses::from(resp.users.into_iter().next().unwrap());
        assert_eq!(addrs.preferred(), Some(PRIMARY.parse().unwrap()));
    }

    #[test]
    fn test_user_falls_back_to_custody() {
        let body = format!(
            r#"{{ "users": [{{
                "fid": 3,
                "custody_address": "{CUSTODY}",
                "verified_addresses": {{ "eth_addresses": [], "primary": {{ "eth_address": null }} }}
            }}] }}"#
        );
        let resp: BulkUsersResponse = serde_json::from_str(&body).unwrap();
        let addrs = UserAddresses::from(resp.users.into_iter().next().unwrap());
        assert_eq!(addrs.verified_primary_address, None);
        assert_eq!(addrs.preferred(), Some(CUSTODY.parse().unwrap()));
    }

    #[test]
    fn test_user_without_wallets() {
        let resp: BulkUsersResponse =
            serde_json::from_str(r#"{ "users": [{ "fid": 3, "custody_address": "garbage" }] }"#)
                .unwrap();
        let addrs = UserAddresses::from(resp.users.into_iter().next().unwrap());
        assert_eq!(addrs.preferred(), None);
    }

    #[test]
    fn test_following_page_cursor() {
        let resp: FollowingResponse = serde_json::from_str(
            r#"{ "users": [
                    { "object": "follow", "user": { "fid": 10, "username": "a" } },
                    { "object": "follow", "user": { "fid": 11 } }
                ],
                "next": { "cursor": "abc" } }"#,
        )
        .unwrap();
        let page = FollowingPage::from(resp);
        assert_eq!(page.fids, vec![10, 11]);
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));

        let last: FollowingResponse =
            serde_json::from_str(r#"{ "users": [], "next": { "cursor": null } }"#).unwrap();
        assert_eq!(FollowingPage::from(last).next_cursor, None);
    }

    #[test]
    fn test_reactions_decode() {
        let resp: ReactionsResponse = serde_json::from_str(
            r#"{ "reactions": [
                    { "reaction_type": "like", "cast": { "hash": "0xaaa" } },
                    { "reaction_type": "like", "cast": { "hash": "0xbbb", "fid": 2 } }
                ],
                "next": { "cursor": null } }"#,
        )
        .unwrap();
        let hashes: Vec<String> = resp.reactions.into_iter().map(|r| r.cast.hash).collect();
        assert_eq!(hashes, vec!["0xaaa", "0xbbb"]);
    }
}
