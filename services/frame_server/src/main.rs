//! BEPE claim frame server.
//!
//! # Running
//!
//! ```bash
//! PRIVATE_KEY=0x... NFT_CONTRACT_ADDRESS=0x... \
//! NEYNAR_API_KEY=... MORALIS_API_KEY=... \
//! OWNER_FID=... REQUIRED_CAST_HASH=0x... \
//! RUST_LOG=info cargo run -p frame_server
//! ```

use std::{sync::Arc, time::Duration};

use frame_server::{
    chain::{EvmNftContract, NftContract},
    claim::{ClaimWorkflow, Collaborators},
    config::{load_config, FrameConfig},
    eligibility::EligibilityRule,
    moralis::MoralisClient,
    neynar::NeynarClient,
    retry::RetryPolicy,
    server::{router, AppState},
    store::InMemoryClaimStore,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("BEPE claim frame starting...");

    let config = load_config();
    info!(
        "RPC={}, chain={} ({}), owner_fid={}, follow/like/repost required={}/{}/{}",
        config.rpc_url,
        config.chain,
        config.chain_id,
        config.owner_fid,
        config.require_follow,
        config.require_like,
        config.require_repost
    );
    if config.required_cast_hash.is_empty() && (config.require_like || config.require_repost) {
        warn!("REQUIRED_CAST_HASH is empty; like/repost checks can never pass");
    }

    let http_timeout = Duration::from_secs(config.http_timeout_secs);
    let neynar = match NeynarClient::new(&config.neynar_base_url, &config.neynar_api_key, http_timeout) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Failed to build Neynar client: {}", e);
            std::process::exit(1);
        }
    };
    let moralis = match MoralisClient::new(&config.moralis_base_url, &config.moralis_api_key, http_timeout) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Failed to build Moralis client: {}", e);
            std::process::exit(1);
        }
    };

    let contract: Option<Arc<dyn NftContract>> = match EvmNftContract::from_config(&config) {
        Ok(c) => {
            check_rpc(&c).await;
            Some(Arc::new(c) as Arc<dyn NftContract>)
        }
        Err(e) => {
            error!("NFT contract unavailable, every claim will answer with a server error: {}", e);
            None
        }
    };

    let workflow = ClaimWorkflow::new(
        Collaborators {
            contract,
            social: neynar.clone(),
            identity: neynar,
            tokens: moralis,
        },
        Arc::new(InMemoryClaimStore::new()),
        EligibilityRule::from(&config),
        RetryPolicy::linear(
            config.token_lookup_attempts,
            Duration::from_secs(config.token_lookup_backoff_secs),
        ),
        config.chain.clone(),
    );

    serve(&config, AppState::new(workflow, &config)).await;
}

async fn serve(config: &FrameConfig, state: AppState) {
    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };
    info!("Listening on {} (post_url={})", config.bind_addr, config.claim_url());

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
    info!("Shut down");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Startup sanity check; failures are logged, claims still go through the
/// workflow and fail there if the node stays unreachable.
async fn check_rpc(contract: &EvmNftContract) {
    match contract.node_chain_id().await {
        Ok(id) if id == contract.chain_id() => info!("Connected to chain {}", id),
        Ok(id) => warn!(
            "RPC reports chain {} but CHAIN_ID is {}; transfers will be rejected",
            id,
            contract.chain_id()
        ),
        Err(e) => warn!("RPC connectivity check failed: {}", e),
    }

    let wallet = contract.service_address();
    info!("Service wallet: {}", wallet);
    info!("NFT contract: {}", contract.contract_address());
    match contract.balance_of(&wallet).await {
        Ok(balance) => info!("Service wallet holds {} token(s)", balance),
        Err(e) => warn!("balanceOf failed: {}", e),
    }
}
