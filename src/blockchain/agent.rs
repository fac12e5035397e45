//! Read-mostly actors bound to one wallet identity, and the bounded cache
//! that shares them across requests.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lru::LruCache;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::blockchain::{
    client::SolanaRpcClient, registry::OperationRegistry, services, wallet::WalletIdentity,
};

/// Everything the relay needs to act for one wallet. Never signs.
#[derive(Debug)]
pub struct SolanaAgent {
    wallet: WalletIdentity,
    registry: Arc<OperationRegistry>,
    created_at: DateTime<Utc>,
}

impl SolanaAgent {
    pub fn new(wallet: WalletIdentity, rpc_url: &str) -> Self {
        let rpc = SolanaRpcClient::new(rpc_url);
        let registry = Arc::new(services::solana_registry(&wallet, &rpc));
        Self {
            wallet,
            registry,
            created_at: Utc::now(),
        }
    }

    pub fn wallet(&self) -> &WalletIdentity {
        &self.wallet
    }

    pub fn registry(&self) -> Arc<OperationRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Capacity-bounded cache of agents keyed by wallet address.
/// The least recently used agent is evicted when full.
#[derive(Debug)]
pub struct AgentCache {
    rpc_url: String,
    agents: Mutex<LruCache<String, Arc<SolanaAgent>>>,
}

impl AgentCache {
    pub fn new(rpc_url: impl Into<String>, capacity: NonZeroUsize) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            agents: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the cached agent for `wallet`, building one on a miss.
    pub async fn get_or_create(&self, wallet: &WalletIdentity) -> Arc<SolanaAgent> {
        let mut agents = self.agents.lock().await;
        if let Some(agent) = agents.get(wallet.as_str()) {
            debug!(
                "Reusing agent for {} created at {}",
                wallet.preview(),
                agent.created_at().to_rfc3339()
            );
            return Arc::clone(agent);
        }

        let agent = Arc::new(SolanaAgent::new(wallet.clone(), &self.rpc_url));
        if let Some((evicted, _)) = agents.push(wallet.as_str().to_string(), Arc::clone(&agent)) {
            if evicted != wallet.as_str() {
                debug!("Evicted agent for {}", crate::utils::address_preview(&evicted));
            }
        }
        info!("Created agent for {}", wallet.preview());
        agent
    }

    pub async fn len(&self) -> usize {
        self.agents.lock().await.len()
    }

    pub async fn contains(&self, wallet: &WalletIdentity) -> bool {
        self.agents.lock().await.contains(wallet.as_str())
    }
}
