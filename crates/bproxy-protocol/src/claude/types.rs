use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type JsonValue = Value;

/// One decoded upstream stream chunk, viewed uniformly across the two
/// dialects. The bridge and the SSE writer only ever need the event tag,
/// the original payload bytes, and the incremental text.
pub trait StreamEvent {
    fn event_type(&self) -> &str;
    fn raw(&self) -> &Bytes;
    fn delta_text(&self) -> &str;
    fn attach_raw(&mut self, raw: Bytes);
}

/// Stop fields shared by full responses and stream deltas; embedded by
/// value (`#[serde(flatten)]`) wherever they appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequence: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
}

pub(crate) fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

pub(crate) fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

pub(crate) fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}
