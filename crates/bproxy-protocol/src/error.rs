use serde::{Deserialize, Serialize};

/// invalid body, unserializable request, upstream invocation failure
pub const ERROR_INVALID_REQUEST: &str = "invalid_request_error";
/// generic envelope kind used for routing-level failures
pub const ERROR_GENERIC: &str = "error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub r#type: String,
    pub message: String,
}

/// The fixed client-facing error shape. Every failure surfaced to a client
/// uses this envelope regardless of the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "type")]
    pub r#type: String,
    pub error: ErrorDetail,
}

impl ErrorEnvelope {
    pub fn new(kind: &str, message: impl Into<String>) -> Self {
        Self {
            r#type: "error".to_string(),
            error: ErrorDetail {
                r#type: kind.to_string(),
                message: message.into(),
            },
        }
    }
}
