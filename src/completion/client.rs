// src/completion/client.rs

use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::{
    blockchain::registry::OperationRegistry,
    completion::{chunk::parse_chunk, prompt::SYSTEM_PROMPT, sse},
    config::Config,
    relay::{error::RelayError, protocol::StreamDelta},
};

/// One turn of the conversation as sent by the chat client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Streaming client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone, Debug)]
pub struct CompletionClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl CompletionClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.openai_api_key, &config.openai_base_url, &config.openai_model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request body for one streamed completion over `messages`.
    pub fn request_body(&self, messages: &[ChatMessage], registry: &OperationRegistry) -> Value {
        let mut conversation = vec![json!({ "role": "system", "content": SYSTEM_PROMPT })];
        conversation.extend(
            messages
                .iter()
                .map(|m| json!({ "role": m.role, "content": m.content })),
        );

        json!({
            "model": self.model,
            "stream": true,
            "messages": conversation,
            "tools": tool_declarations(registry),
        })
    }

    /// Starts a streamed completion and returns its decoded deltas.
    pub async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        registry: &OperationRegistry,
    ) -> Result<impl Stream<Item = Result<StreamDelta, RelayError>> + Send + 'static, RelayError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = self.request_body(messages, registry);
        info!(
            "Requesting completion from {} with {} messages and {} tools",
            self.model,
            messages.len(),
            registry.len()
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Completion API returned {}: {}", status, body);
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }
        debug!("Completion stream opened");

        let deltas = sse::event_payloads(response.bytes_stream()).filter_map(|item| async move {
            match item {
                Ok(data) => parse_chunk(&data).map(Ok),
                Err(e) => Some(Err(e)),
            }
        });
        Ok(deltas)
    }
}

/// One function tool per registered operation, named in upper case.
pub fn tool_declarations(registry: &OperationRegistry) -> Vec<Value> {
    registry
        .iter()
        .map(|op| {
            json!({
                "type": "function",
                "function": {
                    "name": op.name().to_uppercase(),
                    "description": format!("Execute {} operation", op.name()),
                    "parameters": op.arguments().json_schema(),
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{client::SolanaRpcClient, services, wallet::WalletIdentity};

    fn registry() -> OperationRegistry {
        let wallet = WalletIdentity::parse("7EcDhSYGxXyscszYEp35KHN8vvw3svAuLKTzXwCFLtV").unwrap();
        services::solana_registry(&wallet, &SolanaRpcClient::new("http://localhost:8899"))
    }

    #[test]
    fn tools_are_upper_cased_with_schemas() {
        let tools = tool_declarations(&registry());
        assert_eq!(tools.len(), 5);
        assert_eq!(tools[0]["function"]["name"], "GET_BALANCE");
        assert_eq!(tools[2]["function"]["name"], "TRANSFER");
        assert_eq!(tools[2]["function"]["description"], "Execute transfer operation");
        assert_eq!(tools[2]["function"]["parameters"]["required"], json!(["to", "amount"]));
    }

    #[test]
    fn request_body_prepends_system_prompt() {
        let client = CompletionClient::new("key", "https://api.example.com/v1", "test-model");
        let messages = vec![ChatMessage {
            role: "user".into(),
            content: "what is my balance?".into(),
        }];
        let body = client.request_body(&messages, &registry());

        assert_eq!(body["model"], "test-model");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "what is my balance?");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
    }
}
