use axum::{response::IntoResponse, Json};
use serde::Serialize;

use crate::blockchain::services::OPERATION_NAMES;

#[derive(Debug, Serialize)]
pub struct OperationsOutput {
    pub operations: &'static [&'static str],
}

// The handler function for the GET /operations endpoint.
pub async fn list_operations_handler() -> impl IntoResponse {
    Json(OperationsOutput {
        operations: OPERATION_NAMES,
    })
}
