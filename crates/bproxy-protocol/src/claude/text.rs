use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::claude::types::{StreamEvent, is_zero_f64, is_zero_i64, is_zero_u32};

/// Legacy text-completion request. `stream` and `model` are transport-level
/// fields: decoded from the client body, never serialized into the upstream
/// invocation body. Zero-valued sampling fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextCompletionRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub max_tokens_to_sample: u32,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub top_p: f64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub top_k: i64,
    #[serde(default, skip_serializing)]
    pub stream: bool,
    #[serde(default, skip_serializing)]
    pub model: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextCompletionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// One decoded chunk of a streamed text completion. `raw` carries the
/// upstream payload bytes so the SSE writer can echo the chunk verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextCompletionStreamEvent {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
    #[serde(skip)]
    pub raw: Bytes,
}

impl StreamEvent for TextCompletionStreamEvent {
    fn event_type(&self) -> &str {
        &self.r#type
    }

    fn raw(&self) -> &Bytes {
        &self.raw
    }

    fn delta_text(&self) -> &str {
        self.completion.as_deref().unwrap_or_default()
    }

    fn attach_raw(&mut self, raw: Bytes) {
        self.raw = raw;
    }
}
