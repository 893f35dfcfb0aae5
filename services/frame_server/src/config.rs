//! Service configuration.
//!
//! Defaults, optionally replaced by the JSON file named in `FRAME_CONFIG`,
//! then overlaid field by field from the environment.

use std::{collections::HashMap, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default entry image.
pub const ENTRY_IMAGE: &str = "https://blush-hidden-mongoose-258.mypinata.cloud/ipfs/bafybeifmntnodfu4zcfcbhrtmweobaqrxljlgp6f7u3hwfmg632aopgtpa";

/// Default image shown after a successful claim.
pub const CLAIMED_IMAGE: &str = "https://blush-hidden-mongoose-258.mypinata.cloud/ipfs/bafybeiazfcqzxodyvukl444pdno5lav2wimp4dhp4cpupohwznywjlizue";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub bind_addr: String,
    /// Absolute base URL the frame is served from. When unset, post targets
    /// are relative paths.
    pub public_url: Option<String>,

    pub rpc_url: String,
    /// Hex secp256k1 key of the service wallet that holds the NFTs.
    pub private_key: Option<String>,
    pub chain_id: u64,
    /// Chain name as understood by the indexing API.
    pub chain: String,
    pub contract_address: Option<String>,
    pub confirm_timeout_secs: u64,

    pub moralis_api_key: String,
    pub moralis_base_url: String,
    pub neynar_api_key: String,
    pub neynar_base_url: String,
    pub http_timeout_secs: u64,

    /// User whose followers are eligible.
    pub owner_fid: u64,
    /// Cast that must be liked and reposted.
    pub required_cast_hash: String,
    pub require_follow: bool,
    pub require_like: bool,
    pub require_repost: bool,
    pub max_following_pages: u32,
    pub reaction_limit: u32,

    pub token_lookup_attempts: u32,
    pub token_lookup_backoff_secs: u64,

    pub images: FrameImages,
}

/// Image per frame; every result frame differs from the others only by its
/// image and button label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameImages {
    pub entry: String,
    pub claimed: String,
    pub already_claimed: String,
    pub try_again: String,
    pub out_of_stock: String,
    pub transfer_failed: String,
    pub no_user_id: String,
    pub server_error: String,
}

impl Default for FrameImages {
    fn default() -> Self {
        Self {
            entry: ENTRY_IMAGE.to_string(),
            claimed: CLAIMED_IMAGE.to_string(),
            already_claimed: CLAIMED_IMAGE.to_string(),
            try_again: ENTRY_IMAGE.to_string(),
            out_of_stock: ENTRY_IMAGE.to_string(),
            transfer_failed: ENTRY_IMAGE.to_string(),
            no_user_id: ENTRY_IMAGE.to_string(),
            server_error: ENTRY_IMAGE.to_string(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            public_url: None,
            rpc_url: "https://mainnet.base.org".to_string(),
            private_key: None,
            chain_id: evm_tx::BASE_CHAIN_ID,
            chain: "base".to_string(),
            contract_address: None,
            confirm_timeout_secs: 120,
            moralis_api_key: String::new(),
            moralis_base_url: "https://deep-index.moralis.io/api/v2.2".to_string(),
            neynar_api_key: String::new(),
            neynar_base_url: "https://api.neynar.com".to_string(),
            http_timeout_secs: 15,
            owner_fid: 0,
            required_cast_hash: String::new(),
            require_follow: true,
            require_like: true,
            require_repost: true,
            max_following_pages: 50,
            reaction_limit: 100,
            token_lookup_attempts: 3,
            token_lookup_backoff_secs: 1,
            images: FrameImages::default(),
        }
    }
}

impl FrameConfig {
    /// Overlay values from an environment snapshot. Unparseable numbers are
    /// reported and ignored.
    pub fn apply_env(&mut self, env: &HashMap<String, String>) {
        let get = |key: &str| env_value(env, key);

        if let Some(v) = get("BIND_ADDR") {
            self.bind_addr = v.to_string();
        }
        if let Some(v) = get("PUBLIC_URL") {
            self.public_url = Some(v.trim_end_matches('/').to_string());
        }
        if let Some(v) = get("RPC_URL") {
            self.rpc_url = v.to_string();
        }
        if let Some(v) = get("PRIVATE_KEY") {
            self.private_key = Some(v.to_string());
        }
        if let Some(v) = get("MORALIS_CHAIN") {
            self.chain = v.to_string();
        }
        if let Some(v) = get("NFT_CONTRACT_ADDRESS") {
            self.contract_address = Some(v.to_string());
        }
        if let Some(v) = get("MORALIS_API_KEY") {
            self.moralis_api_key = v.to_string();
        }
        if let Some(v) = get("NEYNAR_API_KEY") {
            self.neynar_api_key = v.to_string();
        }
        if let Some(v) = get("REQUIRED_CAST_HASH") {
            self.required_cast_hash = v.to_string();
        }
        parse_into(get("CHAIN_ID"), "CHAIN_ID", &mut self.chain_id);
        parse_into(get("OWNER_FID"), "OWNER_FID", &mut self.owner_fid);
    }

    /// Where frame buttons post to.
    pub fn claim_url(&self) -> String {
        match &self.public_url {
            Some(base) => format!("{}/claim", base.trim_end_matches('/')),
            None => "/claim".to_string(),
        }
    }
}

fn env_value<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_into<T: FromStr>(value: Option<&str>, key: &str, slot: &mut T) {
    if let Some(raw) = value {
        match raw.parse::<T>() {
            Ok(v) => *slot = v,
            Err(_) => warn!("Ignoring {}={:?}: not a valid number", key, raw),
        }
    }
}

pub fn load_config() -> FrameConfig {
    let mut config = load_config_file();
    let env: HashMap<String, String> = std::env::vars().collect();
    config.apply_env(&env);
    config
}

fn load_config_file() -> FrameConfig {
    let path = std::env::var("FRAME_CONFIG").unwrap_or_default();
    if !path.is_empty() {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            if let Ok(config) = serde_json::from_str::<FrameConfig>(&contents) {
                return config;
            }
        }
        warn!("Failed to load config from {}, using defaults", path);
    }
    FrameConfig::default()
}
