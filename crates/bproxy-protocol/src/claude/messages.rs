use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::claude::types::{JsonValue, StopInfo, StreamEvent, Usage, is_zero_f64, is_zero_i64, is_zero_u32};

/// Message content is either plain text or an ordered list of typed blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub r#type: String,
    pub media_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        source: ImageSource,
    },
    ToolUse {
        id: String,
        name: String,
        input: JsonValue,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<JsonValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    pub content: MessageContent,
}

/// Tool declarations are forwarded structurally; input schemas are opaque
/// JSON. The display fields describe the virtual screen for computer-use
/// tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub display_width_px: u32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub display_height_px: u32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub display_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Messages-dialect request. `stream` and `model` are transport-level and
/// never reach the upstream body; `metadata` is accepted from clients but
/// not forwarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageCompletionRequest {
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<MessageContent>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub anthropic_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anthropic_beta: Vec<String>,
    #[serde(default, skip_serializing_if = "tools_unset")]
    pub tools: Option<Vec<Tool>>,
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
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl MessageCompletionRequest {
    /// Post-parse normalization, run unconditionally after structural
    /// decoding: clamps negative sampling fields and materializes an absent
    /// tool list so downstream encoding never sees null.
    pub fn normalize(&mut self) {
        if self.top_k < 0 {
            self.top_k = 0;
        }
        if self.top_p < 0.0 {
            self.top_p = 0.0;
        }
        if self.tools.is_none() {
            self.tools = Some(Vec::new());
        }
    }
}

fn tools_unset(tools: &Option<Vec<Tool>>) -> bool {
    tools.as_ref().map_or(true, Vec::is_empty)
}

/// Response-side content block, kept loose: the upstream decides the tag
/// set and we re-encode what it sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputBlock {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageCompletionResponse {
    #[serde(flatten)]
    pub stop: StopInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<OutputBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// The message object carried by `message_start` events. Content entries
/// stay raw JSON; the stream writer echoes original bytes anyway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamMessageInfo {
    #[serde(flatten)]
    pub stop: StopInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageDelta {
    #[serde(flatten)]
    pub stop: StopInfo,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_json: Option<String>,
}

/// One decoded chunk of a streamed message completion. The `type` tag is
/// passed through verbatim as the SSE event name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageStreamEvent {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<StreamMessageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_block: Option<OutputBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<MessageDelta>,
    #[serde(skip)]
    pub raw: Bytes,
}

impl StreamEvent for MessageStreamEvent {
    fn event_type(&self) -> &str {
        &self.r#type
    }

    fn raw(&self) -> &Bytes {
        &self.raw
    }

    fn delta_text(&self) -> &str {
        self.delta
            .as_ref()
            .and_then(|delta| delta.text.as_deref())
            .or(self.completion.as_deref())
            .unwrap_or_default()
    }

    fn attach_raw(&mut self, raw: Bytes) {
        self.raw = raw;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_null_tools_to_empty() {
        let mut req: MessageCompletionRequest = serde_json::from_str(
            r#"{"max_tokens":100,"messages":[{"role":"user","content":"hi"}]}"#,
        )
        .unwrap();
        assert!(req.tools.is_none());
        req.normalize();
        assert_eq!(req.tools, Some(Vec::new()));
    }

    #[test]
    fn normalize_clamps_negative_sampling_params() {
        let mut req: MessageCompletionRequest =
            serde_json::from_str(r#"{"top_k":-1,"top_p":-0.5}"#).unwrap();
        req.normalize();
        assert_eq!(req.top_k, 0);
        assert_eq!(req.top_p, 0.0);
    }

    #[test]
    fn content_union_accepts_text_and_blocks() {
        let req: MessageCompletionRequest = serde_json::from_str(
            r#"{
                "messages": [
                    {"role": "user", "content": "plain"},
                    {"role": "user", "content": [
                        {"type": "text", "text": "look at this"},
                        {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "aGk="}},
                        {"type": "tool_use", "id": "t1", "name": "calculator", "input": {"a": 1}},
                        {"type": "tool_result", "tool_use_id": "t1", "content": "2"}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            req.messages[0].content,
            MessageContent::Text("plain".to_string())
        );
        let MessageContent::Blocks(blocks) = &req.messages[1].content else {
            panic!("expected block content");
        };
        assert_eq!(blocks.len(), 4);
        assert!(matches!(blocks[2], ContentBlock::ToolUse { .. }));
    }

    #[test]
    fn serialization_excludes_transport_fields_and_metadata() {
        let mut req: MessageCompletionRequest = serde_json::from_str(
            r#"{
                "model": "claude-x",
                "stream": true,
                "max_tokens": 10,
                "messages": [{"role": "user", "content": "hi"}],
                "metadata": {"user_id": "u-1"}
            }"#,
        )
        .unwrap();
        req.normalize();
        assert!(req.stream);
        assert_eq!(req.model, "claude-x");
        assert_eq!(
            req.metadata,
            Some(Metadata {
                user_id: Some("u-1".to_string())
            })
        );

        let body = serde_json::to_value(&req).unwrap();
        let object = body.as_object().unwrap();
        assert!(!object.contains_key("stream"));
        assert!(!object.contains_key("model"));
        assert!(!object.contains_key("metadata"));
        // a normalized-empty tool list also stays off the wire
        assert!(!object.contains_key("tools"));
    }

    #[test]
    fn stream_event_decodes_delta_and_stop_info() {
        let payload = br#"{
            "type": "content_block_delta",
            "index": 0,
            "delta": {"type": "text_delta", "text": "Hello"}
        }"#;
        let mut event: MessageStreamEvent = serde_json::from_slice(payload).unwrap();
        event.attach_raw(Bytes::copy_from_slice(payload.as_slice()));
        assert_eq!(event.event_type(), "content_block_delta");
        assert_eq!(event.delta_text(), "Hello");

        let stop_payload = br#"{
            "type": "message_delta",
            "delta": {"stop_reason": "end_turn", "stop_sequence": null},
            "usage": {"output_tokens": 12}
        }"#;
        let event: MessageStreamEvent = serde_json::from_slice(stop_payload).unwrap();
        assert_eq!(
            event.delta.as_ref().unwrap().stop.stop_reason.as_deref(),
            Some("end_turn")
        );
        assert_eq!(event.usage.as_ref().unwrap().output_tokens, Some(12));
    }

    #[test]
    fn response_flattens_stop_info() {
        let response: MessageCompletionResponse = serde_json::from_str(
            r#"{
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "model": "claude-x",
                "content": [{"type": "text", "text": "hi"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 3, "output_tokens": 5}
            }"#,
        )
        .unwrap();
        assert_eq!(response.stop.stop_reason.as_deref(), Some("end_turn"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["stop_reason"], "end_turn");
        assert!(json.get("stop_sequence").is_none());
    }
}
