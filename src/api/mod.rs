//! # API Module
//!
//! HTTP handlers for the chat relay.
//!
//! ## Available Endpoints
//! - `POST /chat` - Stream an assistant turn as server-sent events
//! - `GET /operations` - List the operations a wallet agent exposes
//! - `GET /health` - Liveness probe

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::AppState;

pub mod chat;
pub mod health;
pub mod operations;

/// Routes served under `/api`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/operations", get(operations::list_operations_handler))
        .route("/chat", post(chat::chat_handler))
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}
