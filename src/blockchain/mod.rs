// src/blockchain/mod.rs

pub mod agent;
pub use agent::{AgentCache, SolanaAgent};

pub mod client;
pub use client::SolanaRpcClient;

pub mod models;
pub mod registry;
pub mod services;
pub mod wallet;

// Re-export commonly used types
pub use registry::{ArgumentSpec, Operation, OperationError, OperationRegistry};
pub use wallet::{WalletError, WalletIdentity};
