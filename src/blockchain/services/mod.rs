// src/blockchain/services/mod.rs

use std::sync::Arc;

use crate::blockchain::{client::SolanaRpcClient, registry::OperationRegistry, wallet::WalletIdentity};

pub mod balance;
pub mod trade;
pub mod transfer;
pub mod wallet;

/// Canonical names of the operations `solana_registry` builds, in registry order.
pub const OPERATION_NAMES: &[&str] = &["get_balance", "get_wallet_address", "transfer", "trade", "swap"];

/// Operations exposed for one wallet, in the order they are offered to the model.
pub fn solana_registry(wallet: &WalletIdentity, rpc: &SolanaRpcClient) -> OperationRegistry {
    OperationRegistry::new()
        .with(Arc::new(balance::GetBalance::new(wallet.clone(), rpc.clone())))
        .with(Arc::new(wallet::GetWalletAddress::new(wallet.clone())))
        .with(Arc::new(transfer::Transfer::new(wallet.clone())))
        .with(Arc::new(trade::Trade::trade(wallet.clone())))
        .with(Arc::new(trade::Trade::swap(wallet.clone())))
}
