// src/relay/error.rs

use thiserror::Error;

use crate::blockchain::registry::OperationError;

/// Failures of a single tool call. All of them are recovered by the engine.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Malformed arguments for {raw_name}: {reason}")]
    MalformedArguments { raw_name: String, reason: String },

    #[error("Unknown function: {raw_name}. Available functions: {}", .known.join(", "))]
    UnknownOperation { raw_name: String, known: Vec<String> },

    #[error("Invalid arguments for {operation}: '{field}' {reason}")]
    InvalidArguments {
        operation: String,
        field: String,
        reason: String,
    },

    #[error("{operation} failed: {source}")]
    OperationExecution {
        operation: String,
        #[source]
        source: OperationError,
    },
}

impl DispatchError {
    /// Short machine-friendly tag used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::MalformedArguments { .. } => "malformed_arguments",
            DispatchError::UnknownOperation { .. } => "unknown_operation",
            DispatchError::InvalidArguments { .. } => "invalid_arguments",
            DispatchError::OperationExecution { .. } => "operation_execution",
        }
    }
}

/// Failures of the upstream completion source or the outward transport.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion API returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("upstream stream failed: {0}")]
    Stream(String),
}
