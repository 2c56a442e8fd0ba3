use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use bproxy_protocol::claude::types::StreamEvent;
use bproxy_protocol::error::{ERROR_GENERIC, ErrorEnvelope};
use bproxy_protocol::sse;

/// Error envelopes ride on a 200 so envelope-parsing clients never have to
/// branch on transport status.
pub fn error_response(kind: &str, message: impl Into<String>) -> Response {
    envelope_response(StatusCode::OK, kind, message)
}

pub fn not_found_response() -> Response {
    envelope_response(StatusCode::NOT_FOUND, ERROR_GENERIC, "not found")
}

fn envelope_response(status: StatusCode, kind: &str, message: impl Into<String>) -> Response {
    let envelope = ErrorEnvelope::new(kind, message);
    let body = serde_json::to_vec(&envelope).unwrap_or_default();
    let mut resp = Response::new(Body::from(body));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

pub fn json_response<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut resp = Response::new(Body::from(body));
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            resp
        }
        Err(err) => error_response(
            bproxy_protocol::error::ERROR_INVALID_REQUEST,
            err.to_string(),
        ),
    }
}

/// Streams relay events to the client as `text/event-stream`, one frame per
/// event in relay order, echoing each event's raw upstream bytes. The
/// response body owns the sole receiver; dropping it (client disconnect)
/// is what unwinds the relay.
pub fn sse_response<E>(events: mpsc::Receiver<E>) -> Response
where
    E: StreamEvent + Send + 'static,
{
    let frames = ReceiverStream::new(events)
        .map(|event| Ok::<Bytes, Infallible>(sse::frame(event.event_type(), event.raw())));
    let mut resp = Response::new(Body::from_stream(frames));
    let headers = resp.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use bproxy_protocol::claude::messages::MessageStreamEvent;
    use bproxy_protocol::error::ERROR_INVALID_REQUEST;

    #[test]
    fn error_rides_on_ok_status() {
        let resp = error_response(ERROR_INVALID_REQUEST, "boom");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn not_found_keeps_the_envelope() {
        let resp = not_found_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sse_frames_follow_relay_order() {
        let payloads: Vec<&[u8]> = vec![
            br#"{"type":"message_start","message":{"id":"msg_1","role":"assistant","content":[]}}"#,
            br#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#,
            br#"{"type":"message_stop"}"#,
        ];
        let (tx, rx) = mpsc::channel::<MessageStreamEvent>(10);
        for payload in &payloads {
            let mut event: MessageStreamEvent = serde_json::from_slice(payload).unwrap();
            event.raw = Bytes::copy_from_slice(payload);
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let resp = sse_response(rx);
        assert_eq!(
            resp.headers().get(CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = std::str::from_utf8(&body).unwrap();

        let frames: Vec<&str> = text
            .split("\n\n")
            .filter(|frame| !frame.is_empty())
            .collect();
        assert_eq!(frames.len(), 3);
        for (frame, expected) in frames
            .iter()
            .zip(["message_start", "content_block_delta", "message_stop"])
        {
            let event_line = frame.lines().next().unwrap();
            assert_eq!(event_line, format!("event: {expected}"));
        }
        // data lines echo the upstream payload verbatim
        assert!(frames[2].ends_with(r#"data: {"type":"message_stop"}"#));
    }
}
