//! HTTP route tests driven against the router with `oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use sol_chat_relay::{api, config::Config, AppState};

const WALLET: &str = "7EcDhSYGxXyscszYEp35KHN8vvw3svAuLKTzXwCFLtV";

fn create_test_app(openai_base_url: &str) -> Router {
    let config = Config {
        openai_api_key: "sk-test".to_string(),
        openai_base_url: openai_base_url.to_string(),
        solana_rpc_url: "http://127.0.0.1:1".to_string(),
        ..Config::default()
    };
    Router::new()
        .nest("/api", api::create_router())
        .with_state(AppState::new(config))
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Serves a canned completion stream on an ephemeral port and returns its base URL.
async fn spawn_upstream(stream_body: &'static str) -> String {
    let upstream = Router::new().route(
        "/chat/completions",
        post(move || async move { ([(header::CONTENT_TYPE, "text/event-stream")], stream_body).into_response() }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_health() {
    let response = create_test_app("http://127.0.0.1:1")
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_operations_are_listed_in_registry_order() {
    let response = create_test_app("http://127.0.0.1:1")
        .oneshot(Request::builder().uri("/api/operations").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["operations"],
        json!(["get_balance", "get_wallet_address", "transfer", "trade", "swap"])
    );
}

#[tokio::test]
async fn test_missing_wallet_is_rejected() {
    let app = create_test_app("http://127.0.0.1:1");

    let response = app
        .clone()
        .oneshot(chat_request(json!({"messages": [{"role": "user", "content": "hi"}]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "Wallet not connected"}));

    let response = app
        .oneshot(chat_request(json!({"messages": [], "wallet": {"address": ""}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_evm_wallet_is_rejected() {
    let response = create_test_app("http://127.0.0.1:1")
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "wallet": {"address": "0x742d35Cc6634C0532925a3b844Bc454e4438f44e"}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to create agent: "));
}

#[tokio::test]
async fn test_base58_string_that_is_not_a_key_is_rejected() {
    let response = create_test_app("http://127.0.0.1:1")
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "wallet": {"address": "z".repeat(44)}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to create agent: Invalid Solana address format"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_a_server_error() {
    let response = create_test_app("http://127.0.0.1:1")
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "wallet": {"address": WALLET}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_chat_streams_prose_and_tool_result() {
    let base_url = spawn_upstream(concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"Checking now.\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",",
        "\"function\":{\"name\":\"GET_WALLET_ADDRESS\",\"arguments\":\"\"}}]}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"{}\"}}]}}]}\n\n",
        "data: [DONE]\n\n",
    ))
    .await;

    let response = create_test_app(&base_url)
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "what is my address?"}],
            "wallet": {"address": WALLET}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    let frames: Vec<&str> = text
        .split("\n\n")
        .filter_map(|event| event.strip_prefix("data: "))
        .collect();

    assert_eq!(frames.last(), Some(&"[DONE]"));
    assert_eq!(frames.iter().filter(|f| **f == "[DONE]").count(), 1);

    let messages: Vec<Value> = frames[..frames.len() - 1]
        .iter()
        .map(|f| serde_json::from_str(f).unwrap())
        .collect();
    assert_eq!(messages[0]["content"], "Checking now.");
    assert_eq!(messages[0]["role"], "assistant");

    let result = messages.last().unwrap();
    assert_eq!(result["content"], format!("Your wallet address is: {}", WALLET));
    assert_ne!(result["id"], messages[0]["id"]);
}
