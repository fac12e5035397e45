use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::blockchain::{
    models::WalletAddressResult,
    registry::{Operation, OperationError},
    wallet::WalletIdentity,
};

/// `get_wallet_address`: echoes the connected wallet.
pub struct GetWalletAddress {
    wallet: WalletIdentity,
}

impl GetWalletAddress {
    pub fn new(wallet: WalletIdentity) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl Operation for GetWalletAddress {
    fn name(&self) -> &str {
        "get_wallet_address"
    }

    async fn invoke(&self, _args: Map<String, Value>) -> Result<Value, OperationError> {
        let result = WalletAddressResult {
            response: format!("Your wallet address is: {}", self.wallet),
            data: self.wallet.to_string(),
        };
        serde_json::to_value(result).map_err(|e| OperationError::Failed(e.to_string()))
    }
}
