//! JSON-RPC client for a Solana cluster.
//!
//! Only read-only calls live here. Anything that needs a signature is handed
//! back to the connected wallet on the client side.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::blockchain::registry::OperationError;

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

#[derive(Clone, Debug)]
pub struct SolanaRpcClient {
    http: Client,
    rpc_url: String,
}

impl SolanaRpcClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            rpc_url: rpc_url.into(),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Sends one JSON-RPC request and returns its `result` member.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, OperationError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        debug!("RPC {} -> {}", method, self.rpc_url);

        let res: Value = self
            .http
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;
        parse_rpc_response(res)
    }

    /// Native balance of `address` in lamports.
    pub async fn get_balance(&self, address: &str) -> Result<u64, OperationError> {
        let result = self
            .call("getBalance", json!([address, { "commitment": "confirmed" }]))
            .await?;
        result["value"].as_u64().ok_or_else(|| {
            OperationError::UnexpectedResponse(format!("getBalance result missing 'value': {}", result))
        })
    }
}

fn parse_rpc_response(mut res: Value) -> Result<Value, OperationError> {
    if let Some(err) = res.get("error").filter(|e| !e.is_null()) {
        return Err(OperationError::Rpc {
            code: err["code"].as_i64().unwrap_or_default(),
            message: err["message"].as_str().unwrap_or("unknown error").to_string(),
        });
    }
    match res.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(OperationError::UnexpectedResponse(format!(
            "RPC response missing 'result' field: {}",
            res
        ))),
    }
}
