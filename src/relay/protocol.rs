// src/relay/protocol.rs

use serde::{Deserialize, Serialize};

/// Literal payload of the frame that closes every outward stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One unit of the inbound model stream after provider-specific decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamDelta {
    /// A fragment of assistant prose.
    Text(String),
    /// The model started a tool call. `arguments` may already hold the first fragment.
    ToolCallStart {
        id: String,
        name: String,
        arguments: String,
    },
    /// A continuation fragment of the current tool call's argument payload.
    ToolCallArguments(String),
}

impl StreamDelta {
    pub fn text(fragment: impl Into<String>) -> Self {
        StreamDelta::Text(fragment.into())
    }

    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        StreamDelta::ToolCallStart {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn arguments(fragment: impl Into<String>) -> Self {
        StreamDelta::ToolCallArguments(fragment.into())
    }
}

/// The assistant-visible unit re-emitted on every material change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub id: String,
    pub role: String,
    pub content: String,
}

impl AssistantMessage {
    /// Starts a fresh unit with a random identifier and empty content.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: "assistant".to_string(),
            content: String::new(),
        }
    }
}

impl Default for AssistantMessage {
    fn default() -> Self {
        Self::new()
    }
}

/// One discrete event of the outward stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Message(AssistantMessage),
    Done,
}

impl Frame {
    /// Payload carried in the `data:` field of the event.
    pub fn data(&self) -> String {
        match self {
            Frame::Message(message) => serde_json::to_string(message).unwrap_or_default(),
            Frame::Done => DONE_SENTINEL.to_string(),
        }
    }

    /// Full `text/event-stream` encoding of the frame.
    pub fn encode(&self) -> String {
        format!("data: {}\n\n", self.data())
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Frame::Done)
    }

    pub fn message(&self) -> Option<&AssistantMessage> {
        match self {
            Frame::Message(message) => Some(message),
            Frame::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_frame_encodes_as_single_data_event() {
        let frame = Frame::Message(AssistantMessage {
            id: "abc".to_string(),
            role: "assistant".to_string(),
            content: "hi there".to_string(),
        });

        assert_eq!(
            frame.encode(),
            "data: {\"id\":\"abc\",\"role\":\"assistant\",\"content\":\"hi there\"}\n\n"
        );
    }

    #[test]
    fn done_frame_is_literal_sentinel() {
        assert_eq!(Frame::Done.encode(), "data: [DONE]\n\n");
        assert!(Frame::Done.is_done());
        assert!(Frame::Done.message().is_none());
    }

    #[test]
    fn new_messages_get_distinct_ids() {
        let a = AssistantMessage::new();
        let b = AssistantMessage::new();
        assert_ne!(a.id, b.id);
        assert_eq!(a.role, "assistant");
        assert!(a.content.is_empty());
    }
}
