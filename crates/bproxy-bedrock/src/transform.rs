use bytes::Bytes;

use bproxy_common::config::BedrockConfig;
use bproxy_common::mapping::resolve;
use bproxy_protocol::claude::messages::MessageCompletionRequest;
use bproxy_protocol::claude::text::TextCompletionRequest;

use crate::error::BedrockError;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Prompts must end with the assistant turn delimiter before transmission.
const TURN_DELIMITER: &str = "Assistant:";

/// One upstream invocation: the serialized body plus routing metadata.
/// Built fresh per request — resolved model ids can differ between calls.
#[derive(Debug, Clone)]
pub struct InvocationEnvelope {
    pub body: Bytes,
    pub model_id: String,
    pub content_type: &'static str,
}

/// Transforms a legacy text-completion request into its invocation
/// envelope. Rewraps the prompt with human/assistant framing when the turn
/// delimiter is absent (a no-op for already-framed prompts) and resolves
/// the upstream model id.
pub fn text_envelope(
    req: &mut TextCompletionRequest,
    config: &BedrockConfig,
) -> Result<InvocationEnvelope, BedrockError> {
    let model_id = resolve(
        &req.model,
        &config.model_mappings,
        &config.anthropic_default_model,
    )
    .to_string();

    if !req.prompt.ends_with(TURN_DELIMITER) {
        req.prompt = format!("\n\nHuman: {}\n\nAssistant:", req.prompt);
    }

    let body = serde_json::to_vec(req).map_err(BedrockError::Serialize)?;
    Ok(InvocationEnvelope {
        body: Bytes::from(body),
        model_id,
        content_type: CONTENT_TYPE_JSON,
    })
}

/// Transforms a messages-dialect request into its invocation envelope.
/// Resolves the upstream model id and rewrites `anthropic_version` through
/// the version table before serialization.
pub fn message_envelope(
    req: &mut MessageCompletionRequest,
    config: &BedrockConfig,
) -> Result<InvocationEnvelope, BedrockError> {
    let model_id = resolve(
        &req.model,
        &config.model_mappings,
        &config.anthropic_default_model,
    )
    .to_string();

    req.anthropic_version = resolve(
        &req.anthropic_version,
        &config.anthropic_version_mappings,
        &config.anthropic_default_version,
    )
    .to_string();

    let body = serde_json::to_vec(req).map_err(BedrockError::Serialize)?;
    Ok(InvocationEnvelope {
        body: Bytes::from(body),
        model_id,
        content_type: CONTENT_TYPE_JSON,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bproxy_common::mapping::parse_mappings;

    fn config() -> BedrockConfig {
        BedrockConfig {
            model_mappings: parse_mappings("claude-legacy=backend.v1"),
            anthropic_version_mappings: parse_mappings("2023-06-01=bedrock-2023-05-31"),
            anthropic_default_model: "anthropic.claude-v2".to_string(),
            anthropic_default_version: "bedrock-2023-05-31".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn mapped_model_reaches_envelope() {
        let mut req = TextCompletionRequest {
            prompt: "hello".to_string(),
            model: "claude-legacy".to_string(),
            ..Default::default()
        };
        let envelope = text_envelope(&mut req, &config()).unwrap();
        assert_eq!(envelope.model_id, "backend.v1");
        assert_eq!(envelope.content_type, "application/json");
    }

    #[test]
    fn absent_model_uses_default_and_unknown_passes_through() {
        let mut req = TextCompletionRequest::default();
        let envelope = text_envelope(&mut req, &config()).unwrap();
        assert_eq!(envelope.model_id, "anthropic.claude-v2");

        let mut req = TextCompletionRequest {
            model: "claude-next".to_string(),
            ..Default::default()
        };
        let envelope = text_envelope(&mut req, &config()).unwrap();
        assert_eq!(envelope.model_id, "claude-next");
    }

    #[test]
    fn prompt_wrapping_is_idempotent() {
        let mut req = TextCompletionRequest {
            prompt: "what is up?".to_string(),
            ..Default::default()
        };
        text_envelope(&mut req, &config()).unwrap();
        assert_eq!(req.prompt, "\n\nHuman: what is up?\n\nAssistant:");

        let wrapped = req.prompt.clone();
        text_envelope(&mut req, &config()).unwrap();
        assert_eq!(req.prompt, wrapped);
    }

    #[test]
    fn envelope_body_excludes_transport_fields() {
        let mut req = TextCompletionRequest {
            prompt: "hi".to_string(),
            model: "claude-legacy".to_string(),
            stream: true,
            ..Default::default()
        };
        let envelope = text_envelope(&mut req, &config()).unwrap();
        let body: serde_json::Value = serde_json::from_slice(&envelope.body).unwrap();
        assert!(body.get("model").is_none());
        assert!(body.get("stream").is_none());
        assert!(
            body["prompt"]
                .as_str()
                .unwrap()
                .ends_with("\n\nAssistant:")
        );
    }

    #[test]
    fn message_envelope_resolves_version() {
        let mut req = MessageCompletionRequest {
            model: "claude-legacy".to_string(),
            anthropic_version: "2023-06-01".to_string(),
            max_tokens: 10,
            ..Default::default()
        };
        req.normalize();
        let envelope = message_envelope(&mut req, &config()).unwrap();
        assert_eq!(envelope.model_id, "backend.v1");
        assert_eq!(req.anthropic_version, "bedrock-2023-05-31");

        let mut req = MessageCompletionRequest::default();
        message_envelope(&mut req, &config()).unwrap();
        assert_eq!(req.anthropic_version, "bedrock-2023-05-31");
    }

    #[test]
    fn message_envelope_body_keeps_resolved_version() {
        let mut req = MessageCompletionRequest {
            anthropic_version: "2023-06-01".to_string(),
            max_tokens: 5,
            ..Default::default()
        };
        let envelope = message_envelope(&mut req, &config()).unwrap();
        let body: serde_json::Value = serde_json::from_slice(&envelope.body).unwrap();
        assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
        assert!(body.get("model").is_none());
        assert!(body.get("stream").is_none());
    }
}
