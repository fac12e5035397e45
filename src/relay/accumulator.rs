//! Argument accumulation for one streamed tool call at a time.

use std::str::FromStr;

/// How the accumulator decides that a streamed argument payload is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionStrategy {
    /// Complete once the buffer ends with `}` and a `{` has been seen.
    /// Misfires on nested objects whose inner `}` lands at a chunk boundary.
    #[default]
    TrailingBrace,
    /// Complete once unmatched braces outside string literals return to zero.
    Balanced,
}

impl FromStr for CompletionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trailing-brace" | "trailing_brace" | "trailing" => Ok(CompletionStrategy::TrailingBrace),
            "balanced" => Ok(CompletionStrategy::Balanced),
            other => Err(format!(
                "unknown argument completion strategy '{}' (expected 'trailing-brace' or 'balanced')",
                other
            )),
        }
    }
}

/// Brace depth tracked outside string literals.
#[derive(Debug, Clone, Default)]
struct DepthTracker {
    depth: usize,
    opened: bool,
    closed: bool,
    in_string: bool,
    escaped: bool,
}

impl DepthTracker {
    fn feed(&mut self, fragment: &str) {
        for c in fragment.chars() {
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.in_string = false;
                }
                continue;
            }
            match c {
                '"' => self.in_string = true,
                '{' => {
                    self.opened = true;
                    self.depth += 1;
                }
                '}' if self.depth > 0 => {
                    self.depth -= 1;
                    if self.depth == 0 && self.opened {
                        self.closed = true;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Accumulation state of the tool call currently in flight.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub id: String,
    pub raw_name: String,
    buffer: String,
    tracker: DepthTracker,
}

impl PendingCall {
    fn new(id: String, raw_name: String) -> Self {
        Self {
            id,
            raw_name,
            buffer: String::new(),
            tracker: DepthTracker::default(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

/// A tool call whose argument payload is judged complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCall {
    pub id: String,
    pub raw_name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Default)]
pub struct ArgumentAccumulator {
    strategy: CompletionStrategy,
    call: Option<PendingCall>,
}

impl ArgumentAccumulator {
    pub fn new(strategy: CompletionStrategy) -> Self {
        Self { strategy, call: None }
    }

    pub fn strategy(&self) -> CompletionStrategy {
        self.strategy
    }

    /// Begins a new call, returning the previous one if it was still collecting.
    pub fn on_call_start(&mut self, id: impl Into<String>, raw_name: impl Into<String>) -> Option<PendingCall> {
        self.call.replace(PendingCall::new(id.into(), raw_name.into()))
    }

    /// Appends a fragment. Returns `false` when no call is active and the fragment was dropped.
    pub fn on_delta(&mut self, fragment: &str) -> bool {
        match self.call.as_mut() {
            Some(call) => {
                call.buffer.push_str(fragment);
                if self.strategy == CompletionStrategy::Balanced {
                    call.tracker.feed(fragment);
                }
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.call.is_some()
    }

    pub fn pending(&self) -> Option<&PendingCall> {
        self.call.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        let Some(call) = self.call.as_ref() else {
            return false;
        };
        match self.strategy {
            CompletionStrategy::TrailingBrace => {
                call.buffer.contains('{') && call.buffer.trim_end().ends_with('}')
            }
            CompletionStrategy::Balanced => call.tracker.closed,
        }
    }

    /// Takes the completed call out, leaving the accumulator idle.
    /// Returns `None` while the payload is still incomplete.
    pub fn consume(&mut self) -> Option<CompletedCall> {
        if !self.is_complete() {
            return None;
        }
        self.call.take().map(|call| CompletedCall {
            id: call.id,
            raw_name: call.raw_name,
            arguments: call.buffer,
        })
    }

    /// Drops whatever is being collected without completing it.
    pub fn discard(&mut self) -> Option<PendingCall> {
        self.call.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_completes_after_closing_fragment() {
        let mut acc = ArgumentAccumulator::default();
        assert!(acc.on_call_start("call_1", "TRANSFER").is_none());

        acc.on_delta(r#"{"to":"abc""#);
        assert!(!acc.is_complete());
        acc.on_delta(r#","amount":1}"#);
        assert!(acc.is_complete());

        let call = acc.consume().unwrap();
        assert_eq!(call.id, "call_1");
        assert_eq!(call.raw_name, "TRANSFER");
        let value: Value = serde_json::from_str(&call.arguments).unwrap();
        assert_eq!(value, json!({"to": "abc", "amount": 1}));
        assert!(!acc.is_active());
    }

    #[test]
    fn test_closing_brace_without_opening_is_not_complete() {
        let mut acc = ArgumentAccumulator::default();
        acc.on_call_start("c", "X");
        acc.on_delta("}");
        assert!(!acc.is_complete());
        assert!(acc.consume().is_none());
        assert!(acc.is_active());
    }

    #[test]
    fn test_fragments_without_active_call_are_dropped() {
        let mut acc = ArgumentAccumulator::default();
        assert!(!acc.on_delta("{}"));
        assert!(!acc.is_complete());
    }

    #[test]
    fn test_new_start_discards_previous_call() {
        let mut acc = ArgumentAccumulator::default();
        acc.on_call_start("first", "A");
        acc.on_delta(r#"{"x":"#);
        let previous = acc.on_call_start("second", "B").unwrap();
        assert_eq!(previous.id, "first");
        assert_eq!(previous.buffer(), r#"{"x":"#);
        assert_eq!(acc.pending().unwrap().buffer(), "");
    }

    #[test]
    fn test_trailing_brace_misfires_on_nested_object() {
        let mut acc = ArgumentAccumulator::new(CompletionStrategy::TrailingBrace);
        acc.on_call_start("c", "TRADE");
        acc.on_delta(r#"{"route":{"hop":1}"#);
        assert!(acc.is_complete());
        let call = acc.consume().unwrap();
        assert!(serde_json::from_str::<Value>(&call.arguments).is_err());
    }

    #[test]
    fn test_balanced_waits_for_outer_object() {
        let mut acc = ArgumentAccumulator::new(CompletionStrategy::Balanced);
        acc.on_call_start("c", "TRADE");
        acc.on_delta(r#"{"route":{"hop":1}"#);
        assert!(!acc.is_complete());
        acc.on_delta(r#","memo":"a } in text"}"#);
        assert!(acc.is_complete());
        let call = acc.consume().unwrap();
        let value: Value = serde_json::from_str(&call.arguments).unwrap();
        assert_eq!(value["memo"], "a } in text");
    }

    #[test]
    fn test_balanced_honours_escaped_quotes() {
        let mut acc = ArgumentAccumulator::new(CompletionStrategy::Balanced);
        acc.on_call_start("c", "X");
        acc.on_delta(r#"{"note":"say \"}\" now""#);
        assert!(!acc.is_complete());
        acc.on_delta("}");
        assert!(acc.is_complete());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("balanced".parse::<CompletionStrategy>().unwrap(), CompletionStrategy::Balanced);
        assert_eq!(
            "Trailing-Brace".parse::<CompletionStrategy>().unwrap(),
            CompletionStrategy::TrailingBrace
        );
        assert!("greedy".parse::<CompletionStrategy>().is_err());
    }
}
