//! Operation registry: the fixed set of backend actions a model may request.
//!
//! Each [`Operation`] declares the arguments it requires through an
//! [`ArgumentSpec`], so callers can validate a payload once the canonical name
//! is known instead of pattern-matching on whatever name the model emitted.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Failure raised by an operation handler.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("RPC request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Unexpected RPC response: {0}")]
    UnexpectedResponse(String),

    #[error("{0}")]
    Failed(String),
}

/// Primitive shape a required argument must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A non-empty string.
    Text,
    /// A JSON number strictly greater than zero.
    PositiveNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

/// A required field that is missing or has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentViolation {
    pub field: String,
    pub reason: String,
}

/// Required fields of one operation, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSpec {
    fields: Vec<FieldSpec>,
}

impl ArgumentSpec {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &'static str, description: &'static str) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind: FieldKind::Text,
            description,
        });
        self
    }

    pub fn positive_number(mut self, name: &'static str, description: &'static str) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind: FieldKind::PositiveNumber,
            description,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Checks every required field, reporting the first violation in declaration order.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<(), ArgumentViolation> {
        for field in &self.fields {
            let value = match args.get(field.name) {
                None | Some(Value::Null) => {
                    return Err(ArgumentViolation {
                        field: field.name.to_string(),
                        reason: format!("is required. Received: {}", Value::Object(args.clone())),
                    })
                }
                Some(value) => value,
            };

            match field.kind {
                FieldKind::Text => match value.as_str() {
                    Some(s) if !s.trim().is_empty() => {}
                    _ => {
                        return Err(ArgumentViolation {
                            field: field.name.to_string(),
                            reason: format!("must be a non-empty string. Received: {}", value),
                        })
                    }
                },
                FieldKind::PositiveNumber => match value.as_f64() {
                    Some(n) if n > 0.0 => {}
                    _ => {
                        return Err(ArgumentViolation {
                            field: field.name.to_string(),
                            reason: format!("must be a positive number. Received: {}", value),
                        })
                    }
                },
            }
        }
        Ok(())
    }

    /// JSON schema used when declaring the operation to the model.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let ty = match field.kind {
                FieldKind::Text => "string",
                FieldKind::PositiveNumber => "number",
            };
            properties.insert(
                field.name.to_string(),
                json!({ "type": ty, "description": field.description }),
            );
        }
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A single-shot backend action. Handlers are never retried by the caller.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Canonical name, unique within a registry.
    fn name(&self) -> &str;

    fn arguments(&self) -> ArgumentSpec {
        ArgumentSpec::none()
    }

    async fn invoke(&self, args: Map<String, Value>) -> Result<Value, OperationError>;
}

/// Immutable, ordered mapping from canonical name to operation.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: Vec<Arc<dyn Operation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation. A later registration under an existing name replaces it in place.
    pub fn with(mut self, operation: Arc<dyn Operation>) -> Self {
        match self
            .operations
            .iter()
            .position(|existing| existing.name() == operation.name())
        {
            Some(idx) => self.operations[idx] = operation,
            None => self.operations.push(operation),
        }
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn Operation>> {
        self.operations.iter().find(|op| op.name() == name)
    }

    /// Canonical names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.operations.iter().map(|op| op.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Operation>> {
        self.operations.iter()
    }

    pub async fn invoke(&self, name: &str, args: Map<String, Value>) -> Result<Value, OperationError> {
        let operation = self
            .lookup(name)
            .ok_or_else(|| OperationError::Failed(format!("Operation '{}' is not registered", name)))?;
        operation.invoke(args).await
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.names())
            .finish()
    }
}
