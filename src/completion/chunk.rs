//! Chat-completions stream chunks and their mapping onto [`StreamDelta`].

use serde::Deserialize;
use tracing::warn;

use crate::relay::protocol::StreamDelta;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallChunk>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallChunk {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<FunctionChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionChunk {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

impl ChatCompletionChunk {
    /// The single delta this chunk contributes, if any.
    ///
    /// Prose takes precedence over tool-call data in the same chunk, and only
    /// the first tool call of a chunk is considered.
    pub fn into_delta(self) -> Option<StreamDelta> {
        let delta = self.choices.into_iter().next()?.delta;

        if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
            return Some(StreamDelta::Text(content));
        }

        let call = delta.tool_calls?.into_iter().next()?;
        let function = call.function.unwrap_or_default();
        match call.id.filter(|id| !id.is_empty()) {
            Some(id) => Some(StreamDelta::ToolCallStart {
                id,
                name: function.name.unwrap_or_default(),
                arguments: function.arguments.unwrap_or_default(),
            }),
            None => function
                .arguments
                .filter(|a| !a.is_empty())
                .map(StreamDelta::ToolCallArguments),
        }
    }
}

/// Decodes one SSE payload; undecodable payloads are logged and dropped.
pub fn parse_chunk(data: &str) -> Option<StreamDelta> {
    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk.into_delta(),
        Err(e) => {
            warn!(
                error = %e,
                data_preview = %data.chars().take(100).collect::<String>(),
                "Failed to parse completion chunk"
            );
            None
        }
    }
}
