// src/lib.rs

use std::sync::Arc;

// Re-export modules
pub mod api;
pub mod blockchain;
pub mod completion;
pub mod config;
pub mod relay;
pub mod utils;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Per-wallet agents, bounded and shared across requests
    pub agent_cache: Arc<blockchain::agent::AgentCache>,
    /// Maps model-emitted tool names onto registered operations
    pub resolver: Arc<relay::resolver::NameResolver>,
    /// Upstream chat-completion client
    pub completion: completion::client::CompletionClient,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let agent_cache = blockchain::agent::AgentCache::new(
            config.solana_rpc_url.clone(),
            config.agent_cache_capacity,
        );
        let completion = completion::client::CompletionClient::from_config(&config);
        Self {
            config,
            agent_cache: Arc::new(agent_cache),
            resolver: Arc::new(relay::resolver::NameResolver::new()),
            completion,
        }
    }
}
