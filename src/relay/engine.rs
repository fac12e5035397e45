//! # Dispatch Engine
//!
//! Drives one streamed model response. Prose deltas are forwarded as
//! throttled assistant units; tool-call deltas are accumulated, resolved
//! against the operation registry, validated, executed exactly once and
//! reported back as a unit of their own.
//!
//! A failing tool call never ends the stream: it becomes an error unit and the
//! engine moves on to the next delta. The end-of-stream sentinel is always sent,
//! also when the upstream source fails.

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use serde_json::{Map, Value};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::blockchain::registry::OperationRegistry;
use crate::relay::{
    accumulator::{ArgumentAccumulator, CompletedCall, CompletionStrategy},
    emitter::{EmitterClosed, FrameEmitter},
    error::{DispatchError, RelayError},
    protocol::{AssistantMessage, StreamDelta},
    resolver::NameResolver,
};

pub const DEFAULT_EMIT_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Longest a prose unit may go without re-emission while deltas keep arriving.
    pub emit_interval: Duration,
    pub completion: CompletionStrategy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            emit_interval: DEFAULT_EMIT_INTERVAL,
            completion: CompletionStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    StreamingProse,
    CollectingArgs,
    Terminated,
}

/// Counters reported when a stream has been fully processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Distinct assistant units created.
    pub units: usize,
    /// Message frames sent, excluding the sentinel.
    pub frames: usize,
    /// Operation handlers actually called.
    pub invocations: usize,
    /// Tool calls that ended in an error unit.
    pub failed_calls: usize,
    /// Tool calls dropped before their arguments were complete.
    pub discarded_calls: usize,
}

struct ProseRun {
    message: AssistantMessage,
    last_emit: Instant,
    pending: bool,
}

pub struct DispatchEngine {
    registry: Arc<OperationRegistry>,
    resolver: Arc<NameResolver>,
    accumulator: ArgumentAccumulator,
    emitter: FrameEmitter,
    options: EngineOptions,
    state: EngineState,
    prose: Option<ProseRun>,
    tool_unit: Option<AssistantMessage>,
    summary: DispatchSummary,
}

impl DispatchEngine {
    pub fn new(
        registry: Arc<OperationRegistry>,
        resolver: Arc<NameResolver>,
        emitter: FrameEmitter,
        options: EngineOptions,
    ) -> Self {
        Self {
            registry,
            resolver,
            accumulator: ArgumentAccumulator::new(options.completion),
            emitter,
            options,
            state: EngineState::Idle,
            prose: None,
            tool_unit: None,
            summary: DispatchSummary::default(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Consumes `stream` to the end and closes the outward stream with the sentinel.
    ///
    /// Returns the upstream failure, if any, after the sentinel has been sent.
    pub async fn run<S, E>(mut self, stream: S) -> Result<DispatchSummary, RelayError>
    where
        S: Stream<Item = Result<StreamDelta, E>>,
        E: Into<RelayError>,
    {
        futures::pin_mut!(stream);
        let mut upstream_error = None;

        while let Some(item) = stream.next().await {
            match item {
                Ok(delta) => {
                    if self.handle(delta).await.is_err() {
                        warn!("Client went away, stopping dispatch");
                        break;
                    }
                }
                Err(e) => {
                    let e = e.into();
                    error!("Upstream stream failed: {}", e);
                    upstream_error = Some(e);
                    break;
                }
            }
        }

        self.terminate().await;
        info!(
            units = self.summary.units,
            invocations = self.summary.invocations,
            failed = self.summary.failed_calls,
            discarded = self.summary.discarded_calls,
            "Dispatch finished"
        );

        match upstream_error {
            Some(e) => Err(e),
            None => Ok(self.summary),
        }
    }

    /// Applies one inbound delta.
    pub async fn handle(&mut self, delta: StreamDelta) -> Result<(), EmitterClosed> {
        if self.state == EngineState::Terminated {
            return Ok(());
        }
        match delta {
            StreamDelta::Text(fragment) => self.on_text(fragment).await,
            StreamDelta::ToolCallStart {
                id,
                name,
                arguments,
            } => self.on_tool_call_start(id, name, arguments).await,
            StreamDelta::ToolCallArguments(fragment) => {
                if !self.accumulator.on_delta(&fragment) {
                    debug!("Ignoring argument fragment with no tool call in flight");
                    return Ok(());
                }
                self.try_complete().await
            }
        }
    }

    async fn on_text(&mut self, fragment: String) -> Result<(), EmitterClosed> {
        if fragment.is_empty() {
            return Ok(());
        }

        let now = Instant::now();
        if self.prose.is_none() {
            self.summary.units += 1;
            self.prose = Some(ProseRun {
                message: AssistantMessage::new(),
                last_emit: now,
                pending: false,
            });
        }
        if !self.accumulator.is_active() {
            self.state = EngineState::StreamingProse;
        }
        let Some(run) = self.prose.as_mut() else {
            return Ok(());
        };

        run.message.content.push_str(&fragment);
        let at_boundary = run
            .message
            .content
            .ends_with(|c: char| matches!(c, ' ' | '.' | '?' | '!'));
        if at_boundary || now.duration_since(run.last_emit) > self.options.emit_interval {
            run.last_emit = now;
            run.pending = false;
            self.emitter.emit(&run.message).await?;
            self.summary.frames += 1;
        } else {
            run.pending = true;
        }
        Ok(())
    }

    async fn on_tool_call_start(
        &mut self,
        id: String,
        name: String,
        arguments: String,
    ) -> Result<(), EmitterClosed> {
        self.flush_prose().await?;
        self.prose = None;

        if let Some(previous) = self.accumulator.on_call_start(id.clone(), name.clone()) {
            warn!(
                tool_call_id = %previous.id,
                raw_name = %previous.raw_name,
                "Discarding unfinished tool call superseded by a new one"
            );
            self.summary.discarded_calls += 1;
        }
        info!(tool_call_id = %id, raw_name = %name, "Tool call started");

        self.tool_unit = Some(AssistantMessage::new());
        self.summary.units += 1;
        self.state = EngineState::CollectingArgs;

        if !arguments.is_empty() {
            self.accumulator.on_delta(&arguments);
        }
        self.try_complete().await
    }

    async fn try_complete(&mut self) -> Result<(), EmitterClosed> {
        let Some(call) = self.accumulator.consume() else {
            return Ok(());
        };
        debug!(tool_call_id = %call.id, arguments = %call.arguments, "Tool call arguments complete");

        let mut unit = self.tool_unit.take().unwrap_or_default();
        unit.content = match self.execute(&call).await {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    tool_call_id = %call.id,
                    raw_name = %call.raw_name,
                    kind = e.kind(),
                    "Tool call failed: {}",
                    e
                );
                self.summary.failed_calls += 1;
                format!("❌ Error: {}", e)
            }
        };

        self.state = EngineState::Idle;
        self.emitter.emit(&unit).await?;
        self.summary.frames += 1;
        Ok(())
    }

    /// Parse, resolve, validate and invoke one completed call.
    async fn execute(&mut self, call: &CompletedCall) -> Result<String, DispatchError> {
        let args = parse_arguments(call)?;

        let names = self.registry.names();
        let canonical = self
            .resolver
            .resolve(&call.raw_name, &names)
            .ok_or_else(|| DispatchError::UnknownOperation {
                raw_name: call.raw_name.clone(),
                known: names.clone(),
            })?;
        let spec = self
            .registry
            .lookup(&canonical)
            .map(|operation| operation.arguments())
            .ok_or_else(|| DispatchError::UnknownOperation {
                raw_name: call.raw_name.clone(),
                known: names,
            })?;

        spec
            .validate(&args)
            .map_err(|violation| DispatchError::InvalidArguments {
                operation: canonical.clone(),
                field: violation.field,
                reason: violation.reason,
            })?;

        info!(tool_call_id = %call.id, operation = %canonical, "Executing operation");
        self.summary.invocations += 1;
        let result = self
            .registry
            .invoke(&canonical, args)
            .await
            .map_err(|source| DispatchError::OperationExecution {
                operation: canonical.clone(),
                source,
            })?;

        Ok(describe_result(&canonical, &result))
    }

    async fn flush_prose(&mut self) -> Result<(), EmitterClosed> {
        if let Some(run) = self.prose.as_mut() {
            if run.pending {
                run.pending = false;
                run.last_emit = Instant::now();
                self.emitter.emit(&run.message).await?;
                self.summary.frames += 1;
            }
        }
        Ok(())
    }

    async fn terminate(&mut self) {
        // Best effort: the receiver may already be gone.
        let _ = self.flush_prose().await;

        if let Some(partial) = self.accumulator.discard() {
            warn!(
                tool_call_id = %partial.id,
                raw_name = %partial.raw_name,
                "Stream ended before tool call arguments completed; discarding"
            );
            self.summary.discarded_calls += 1;
        }
        self.tool_unit = None;
        self.prose = None;

        if self.emitter.finish().await.is_err() {
            debug!("Sentinel not delivered, receiver already closed");
        }
        self.state = EngineState::Terminated;
    }
}

fn parse_arguments(call: &CompletedCall) -> Result<Map<String, Value>, DispatchError> {
    match serde_json::from_str::<Value>(&call.arguments) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DispatchError::MalformedArguments {
            raw_name: call.raw_name.clone(),
            reason: format!("expected a JSON object, got {}", other),
        }),
        Err(e) => Err(DispatchError::MalformedArguments {
            raw_name: call.raw_name.clone(),
            reason: e.to_string(),
        }),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Outward content for a successful operation result.
///
/// Precedence: `response`, then numeric `balance` (SOL, six decimals), then
/// `data`, then a generic acknowledgement naming the operation.
pub fn describe_result(operation: &str, result: &Value) -> String {
    if let Some(response) = result.get("response").filter(|v| is_truthy(v)) {
        return as_text(response);
    }
    if let Some(balance) = result.get("balance").and_then(Value::as_f64) {
        return format!("Your SOL balance is: {:.6} SOL", balance);
    }
    if let Some(data) = result.get("data").filter(|v| is_truthy(v)) {
        return as_text(data);
    }
    format!("✅ {} executed successfully", operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_field_wins() {
        let result = json!({"response": "done", "balance": 1.0, "data": "x"});
        assert_eq!(describe_result("get_balance", &result), "done");
    }

    #[test]
    fn test_structured_response_is_serialized() {
        let result = json!({"response": {"sig": "abc"}});
        assert_eq!(describe_result("transfer", &result), "{\"sig\":\"abc\"}");
    }

    #[test]
    fn test_balance_fallback_uses_fixed_formatting() {
        let result = json!({"balance": 1.5});
        assert_eq!(
            describe_result("get_balance", &result),
            "Your SOL balance is: 1.500000 SOL"
        );
    }

    #[test]
    fn test_empty_response_falls_through_to_data() {
        let result = json!({"response": "", "data": {"mint": "abc"}});
        assert_eq!(describe_result("trade", &result), "{\"mint\":\"abc\"}");
    }

    #[test]
    fn test_generic_acknowledgement() {
        assert_eq!(
            describe_result("trade", &json!({})),
            "✅ trade executed successfully"
        );
        assert_eq!(
            describe_result("trade", &json!(null)),
            "✅ trade executed successfully"
        );
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        let call = CompletedCall {
            id: "c".into(),
            raw_name: "X".into(),
            arguments: "[1]".into(),
        };
        assert!(matches!(
            parse_arguments(&call),
            Err(DispatchError::MalformedArguments { .. })
        ));
    }
}
