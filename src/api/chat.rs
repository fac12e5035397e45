use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};

use crate::{
    api::error_response,
    blockchain::wallet::WalletIdentity,
    completion::client::ChatMessage,
    relay::{emitter::FrameEmitter, engine::DispatchEngine},
    utils::address_preview,
    AppState,
};

// Frames buffered between the engine and a slow client.
const FRAME_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
pub struct WalletInfo {
    #[serde(default)]
    pub address: Option<String>,
}

// Request body of POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub wallet: Option<WalletInfo>,
}

// The handler function for the POST /chat endpoint.
pub async fn chat_handler(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    let address = match req
        .wallet
        .and_then(|wallet| wallet.address)
        .filter(|address| !address.trim().is_empty())
    {
        Some(address) => address,
        None => return error_response(StatusCode::BAD_REQUEST, "Wallet not connected"),
    };

    let wallet = match WalletIdentity::parse(&address) {
        Ok(wallet) => wallet,
        Err(e) => {
            warn!("Rejected wallet {}: {}", address_preview(&address), e.kind());
            return error_response(StatusCode::BAD_REQUEST, format!("Failed to create agent: {}", e));
        }
    };

    let agent = state.agent_cache.get_or_create(&wallet).await;
    let registry = agent.registry();
    info!(
        "Chat request from {} with {} messages",
        wallet.preview(),
        req.messages.len()
    );

    let deltas = match state.completion.stream_chat(&req.messages, &registry).await {
        Ok(deltas) => deltas,
        Err(e) => {
            error!("Failed to start completion for {}: {}", wallet.preview(), e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let (emitter, rx) = FrameEmitter::channel(FRAME_BUFFER);
    let engine = DispatchEngine::new(
        registry,
        state.resolver.clone(),
        emitter,
        state.config.engine_options(),
    );
    let preview = wallet.preview();
    tokio::spawn(async move {
        match engine.run(deltas).await {
            Ok(summary) => info!(
                "Turn for {} finished: {} units, {} frames, {} invocations, {} failed",
                preview, summary.units, summary.frames, summary.invocations, summary.failed_calls
            ),
            Err(e) => error!("Turn for {} ended on upstream error: {}", preview, e),
        }
    });

    let events = ReceiverStream::new(rx).map(|frame| Ok::<_, Infallible>(Event::default().data(frame.data())));
    Sse::new(events).into_response()
}
