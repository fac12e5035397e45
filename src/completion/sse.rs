//! # SSE Decoding
//!
//! Turns the byte stream of a streaming completion response into the `data`
//! payloads of its events. Event framing is left to `eventsource-stream`;
//! this layer only drops empty payloads and the `[DONE]` marker and stops at
//! the first read error.

use eventsource_stream::Eventsource;
use futures::{future, Stream, StreamExt};
use tracing::warn;

use crate::relay::{error::RelayError, protocol::DONE_SENTINEL};

/// Yields the payload of every data-carrying event, in order.
///
/// A read error is yielded once as `Err` and ends the stream.
pub fn event_payloads<S, B, E>(byte_stream: S) -> impl Stream<Item = Result<String, RelayError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    byte_stream
        .eventsource()
        .scan(false, |failed, item| {
            let next = if *failed {
                None
            } else {
                match item {
                    Ok(event) => Some(event_data(event.data)),
                    Err(e) => {
                        warn!("SSE stream read error: {}", e);
                        *failed = true;
                        Some(Some(Err(RelayError::Stream(e.to_string()))))
                    }
                }
            };
            future::ready(next)
        })
        .filter_map(future::ready)
}

/// Payload worth forwarding; `None` for empty data or `[DONE]`.
fn event_data(data: String) -> Option<Result<String, RelayError>> {
    let trimmed = data.trim();
    if trimmed.is_empty() || trimmed == DONE_SENTINEL {
        return None;
    }
    Some(Ok(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(chunks: Vec<Result<&'static str, String>>) -> Vec<Result<String, String>> {
        event_payloads(futures::stream::iter(chunks))
            .map(|item| item.map_err(|e| e.to_string()))
            .collect()
            .await
    }

    #[tokio::test]
    async fn events_split_across_chunks() {
        let results = collect(vec![
            Ok("data: {\"par"),
            Ok("tial\":true}\n\ndata:{\"b\":2}\r\n\r\n"),
        ])
        .await;
        assert_eq!(
            results,
            vec![Ok("{\"partial\":true}".to_string()), Ok("{\"b\":2}".to_string())]
        );
    }

    #[tokio::test]
    async fn done_marker_and_comments_are_filtered() {
        let results = collect(vec![Ok(
            ": keep-alive\n\ndata: {\"ok\":true}\n\ndata: \n\ndata: [DONE]\n\n",
        )])
        .await;
        assert_eq!(results, vec![Ok("{\"ok\":true}".to_string())]);
    }

    #[tokio::test]
    async fn read_error_is_yielded_then_stream_ends() {
        let results = collect(vec![
            Ok("data: {\"a\":1}\n\n"),
            Err("connection reset".to_string()),
            Ok("data: {\"b\":2}\n\n"),
        ])
        .await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Ok("{\"a\":1}".to_string()));
        assert!(results[1].as_ref().unwrap_err().contains("connection reset"));
    }

    #[tokio::test]
    async fn empty_stream_yields_nothing() {
        assert!(collect(vec![]).await.is_empty());
    }
}
