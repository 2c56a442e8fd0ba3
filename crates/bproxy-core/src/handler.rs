use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use bytes::Bytes;
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use tracing::debug;

use bproxy_bedrock::{BedrockClient, Completion};
use bproxy_protocol::claude::messages::MessageCompletionRequest;
use bproxy_protocol::claude::text::TextCompletionRequest;
use bproxy_protocol::error::ERROR_INVALID_REQUEST;

use crate::auth::ApiKeyAuth;
use crate::response::{error_response, json_response, sse_response};

pub struct AppState {
    pub auth: ApiKeyAuth,
    pub client: BedrockClient,
}

pub async fn handle_complete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_json(&headers) {
        return error_response(ERROR_INVALID_REQUEST, "invalid content type");
    }
    let mut req: TextCompletionRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(err) => return error_response(ERROR_INVALID_REQUEST, err.to_string()),
    };
    debug!(stream = req.stream, "text completion request");

    match state.client.complete_text(&mut req).await {
        Ok(Completion::Complete(response)) => json_response(&response),
        Ok(Completion::Stream(events)) => sse_response(events),
        Err(err) => error_response(ERROR_INVALID_REQUEST, err.to_string()),
    }
}

pub async fn handle_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_json(&headers) {
        return error_response(ERROR_INVALID_REQUEST, "invalid content type");
    }
    let mut req: MessageCompletionRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(err) => return error_response(ERROR_INVALID_REQUEST, err.to_string()),
    };
    req.normalize();
    apply_header_overrides(&mut req, &headers);
    debug!(stream = req.stream, "message completion request");

    match state.client.complete_message(&mut req).await {
        Ok(Completion::Complete(response)) => json_response(&response),
        Ok(Completion::Stream(events)) => sse_response(events),
        Err(err) => error_response(ERROR_INVALID_REQUEST, err.to_string()),
    }
}

pub async fn method_not_allowed() -> Response {
    error_response(ERROR_INVALID_REQUEST, "method not allowed")
}

/// Header values override their body-level counterparts outright; this is
/// an override, not a merge.
fn apply_header_overrides(req: &mut MessageCompletionRequest, headers: &HeaderMap) {
    if let Some(version) = headers
        .get("anthropic-version")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        req.anthropic_version = version.to_string();
    }
    let betas: Vec<String> = headers
        .get_all("anthropic-beta")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .collect();
    if !betas.is_empty() {
        req.anthropic_beta = betas;
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "application/json")
}
