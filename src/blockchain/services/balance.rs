use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use crate::blockchain::{
    client::{SolanaRpcClient, LAMPORTS_PER_SOL},
    models::BalanceResult,
    registry::{Operation, OperationError},
    wallet::WalletIdentity,
};

/// `get_balance`: native SOL balance of the connected wallet.
pub struct GetBalance {
    wallet: WalletIdentity,
    rpc: SolanaRpcClient,
}

impl GetBalance {
    pub fn new(wallet: WalletIdentity, rpc: SolanaRpcClient) -> Self {
        Self { wallet, rpc }
    }
}

pub fn balance_result(lamports: u64) -> BalanceResult {
    let balance = lamports as f64 / LAMPORTS_PER_SOL;
    BalanceResult {
        balance,
        lamports,
        response: format!("Your SOL balance is: {:.6} SOL", balance),
    }
}

#[async_trait]
impl Operation for GetBalance {
    fn name(&self) -> &str {
        "get_balance"
    }

    async fn invoke(&self, _args: Map<String, Value>) -> Result<Value, OperationError> {
        let lamports = self.rpc.get_balance(self.wallet.as_str()).await?;
        info!("Fetched balance for {}: {} lamports", self.wallet.preview(), lamports);
        serde_json::to_value(balance_result(lamports))
            .map_err(|e| OperationError::Failed(e.to_string()))
    }
}
