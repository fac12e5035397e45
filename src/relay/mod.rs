// src/relay/mod.rs

// Streaming tool-call resolution and dispatch
pub mod accumulator;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod resolver;

pub use accumulator::{ArgumentAccumulator, CompletionStrategy};
pub use emitter::FrameEmitter;
pub use engine::{DispatchEngine, DispatchSummary, EngineOptions, EngineState};
pub use error::{DispatchError, RelayError};
pub use protocol::{AssistantMessage, Frame, StreamDelta};
pub use resolver::NameResolver;
