// src/completion/mod.rs

// Upstream model-completion source
pub mod chunk;
pub mod client;
pub mod prompt;
pub mod sse;

pub use client::{ChatMessage, CompletionClient};
