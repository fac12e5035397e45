// src/blockchain/models.rs
use serde::{Deserialize, Serialize};

// --- Balance Models ---

/// Result of the `get_balance` operation.
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResult {
    /// Balance in SOL
    pub balance: f64,
    pub lamports: u64,
    pub response: String,
}

// --- Wallet Models ---

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletAddressResult {
    pub response: String,
    pub data: String,
}

// --- Intent Models ---

/// An unsigned action handed back to the connected wallet for signing.
#[derive(Debug, Serialize, Deserialize)]
pub struct IntentResult<T> {
    pub response: String,
    pub data: T,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferIntent {
    pub action: String,
    pub wallet: String,
    pub to: String,
    pub amount: f64,
    /// SPL mint; absent for native SOL transfers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
    pub requires_client_signature: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeIntent {
    pub action: String,
    pub wallet: String,
    pub output_mint: String,
    pub input_mint: String,
    pub input_amount: f64,
    pub slippage_bps: u64,
    pub requires_client_signature: bool,
}
