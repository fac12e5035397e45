// src/config.rs

use std::env;
use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::relay::{accumulator::CompletionStrategy, engine::EngineOptions};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_AGENT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(capacity) => capacity,
    None => panic!("agent cache capacity must be non-zero"),
};

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    // Completion provider
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,

    // Blockchain settings
    pub solana_rpc_url: String,

    // Dispatch settings
    pub prose_emit_interval: Duration,
    pub agent_cache_capacity: NonZeroUsize,
    pub argument_completion: CompletionStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            solana_rpc_url: DEFAULT_SOLANA_RPC_URL.to_string(),
            prose_emit_interval: Duration::from_millis(100),
            agent_cache_capacity: DEFAULT_AGENT_CACHE_CAPACITY,
            argument_completion: CompletionStrategy::default(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("OPENAI_API_KEY must be set")?;

        let solana_rpc_url = lookup("SOLANA_RPC_URL").unwrap_or(defaults.solana_rpc_url);
        Url::parse(&solana_rpc_url).context("SOLANA_RPC_URL must be a valid URL")?;

        let openai_base_url = lookup("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url);
        Url::parse(&openai_base_url).context("OPENAI_BASE_URL must be a valid URL")?;

        let port = match lookup("PORT") {
            Some(port) => port.parse().context("PORT must be a valid number")?,
            None => defaults.port,
        };

        let prose_emit_interval = match lookup("PROSE_EMIT_INTERVAL_MS") {
            Some(ms) => Duration::from_millis(
                ms.parse()
                    .context("PROSE_EMIT_INTERVAL_MS must be a number of milliseconds")?,
            ),
            None => defaults.prose_emit_interval,
        };

        let agent_cache_capacity = match lookup("AGENT_CACHE_CAPACITY") {
            Some(capacity) => {
                let capacity: usize = capacity
                    .parse()
                    .context("AGENT_CACHE_CAPACITY must be a valid number")?;
                NonZeroUsize::new(capacity)
                    .ok_or_else(|| anyhow!("AGENT_CACHE_CAPACITY must be greater than zero"))?
            }
            None => defaults.agent_cache_capacity,
        };

        let argument_completion = match lookup("ARGUMENT_COMPLETION") {
            Some(strategy) => strategy
                .parse::<CompletionStrategy>()
                .map_err(|e| anyhow!(e))?,
            None => defaults.argument_completion,
        };

        Ok(Config {
            port,
            openai_api_key,
            openai_base_url,
            openai_model: lookup("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            solana_rpc_url,
            prose_emit_interval,
            agent_cache_capacity,
            argument_completion,
        })
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            emit_interval: self.prose_emit_interval,
            completion: self.argument_completion,
        }
    }
}
