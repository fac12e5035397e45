use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    blockchain::{
        models::{IntentResult, TransferIntent},
        registry::{ArgumentSpec, Operation, OperationError},
        wallet::WalletIdentity,
    },
    utils,
};

/// `transfer`: prepares a SOL or SPL transfer for the wallet to sign.
pub struct Transfer {
    wallet: WalletIdentity,
}

impl Transfer {
    pub fn new(wallet: WalletIdentity) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl Operation for Transfer {
    fn name(&self) -> &str {
        "transfer"
    }

    fn arguments(&self) -> ArgumentSpec {
        ArgumentSpec::none()
            .text("to", "Recipient Solana address")
            .positive_number("amount", "Amount to send, in SOL or token units")
    }

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, OperationError> {
        let to = utils::optional_str(&args, "to")
            .ok_or_else(|| OperationError::Failed("Transfer requires a recipient".into()))?;
        let amount = args
            .get("amount")
            .and_then(Value::as_f64)
            .ok_or_else(|| OperationError::Failed("Transfer requires a numeric amount".into()))?;
        let mint = utils::optional_str(&args, "mint").map(str::to_string);

        let unit = if mint.is_some() { "tokens" } else { "SOL" };
        info!("Prepared transfer of {} {} from {}", amount, unit, self.wallet.preview());

        let result = IntentResult {
            response: format!(
                "Prepared a transfer of {} {} to {}. Approve it in your wallet to send.",
                amount, unit, to
            ),
            data: TransferIntent {
                action: "transfer".to_string(),
                wallet: self.wallet.to_string(),
                to: to.to_string(),
                amount,
                mint,
                requires_client_signature: true,
            },
        };
        serde_json::to_value(result).map_err(|e| OperationError::Failed(e.to_string()))
    }
}
