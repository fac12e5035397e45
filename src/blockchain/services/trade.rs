use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    blockchain::{
        models::{IntentResult, TradeIntent},
        registry::{ArgumentSpec, Operation, OperationError},
        wallet::WalletIdentity,
    },
    utils,
};

/// Wrapped SOL mint, the default input side of a trade.
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const DEFAULT_SLIPPAGE_BPS: u64 = 300;

/// `trade` and `swap`: prepares a token swap for the wallet to sign.
pub struct Trade {
    name: &'static str,
    wallet: WalletIdentity,
}

impl Trade {
    pub fn trade(wallet: WalletIdentity) -> Self {
        Self { name: "trade", wallet }
    }

    pub fn swap(wallet: WalletIdentity) -> Self {
        Self { name: "swap", wallet }
    }
}

#[async_trait]
impl Operation for Trade {
    fn name(&self) -> &str {
        self.name
    }

    fn arguments(&self) -> ArgumentSpec {
        ArgumentSpec::none()
            .text("outputMint", "Mint address of the token to receive")
            .positive_number("inputAmount", "Amount of the input token to spend")
    }

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, OperationError> {
        let output_mint = utils::optional_str(&args, "outputMint")
            .ok_or_else(|| OperationError::Failed("Trade requires an output mint".into()))?;
        let input_amount = args
            .get("inputAmount")
            .and_then(Value::as_f64)
            .ok_or_else(|| OperationError::Failed("Trade requires a numeric input amount".into()))?;
        let input_mint = utils::optional_str(&args, "inputMint").unwrap_or(SOL_MINT);
        let slippage_bps = args
            .get("slippageBps")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_SLIPPAGE_BPS);

        let input_label = if input_mint == SOL_MINT { "SOL" } else { input_mint };
        info!(
            "Prepared {} of {} {} for {} ({})",
            self.name,
            input_amount,
            input_label,
            output_mint,
            self.wallet.preview()
        );

        let result = IntentResult {
            response: format!(
                "Prepared a {} of {} {} for {}. Approve it in your wallet to execute.",
                self.name, input_amount, input_label, output_mint
            ),
            data: TradeIntent {
                action: self.name.to_string(),
                wallet: self.wallet.to_string(),
                output_mint: output_mint.to_string(),
                input_mint: input_mint.to_string(),
                input_amount,
                slippage_bps,
                requires_client_signature: true,
            },
        };
        serde_json::to_value(result).map_err(|e| OperationError::Failed(e.to_string()))
    }
}
