use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::ResponseStream;
use aws_smithy_types::error::display::DisplayErrorContext;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use bproxy_common::config::BedrockConfig;
use bproxy_protocol::claude::messages::{MessageCompletionRequest, MessageCompletionResponse, MessageStreamEvent};
use bproxy_protocol::claude::text::{TextCompletionRequest, TextCompletionResponse, TextCompletionStreamEvent};
use bproxy_protocol::claude::types::StreamEvent;

use crate::error::BedrockError;
use crate::stream::{RELAY_CAPACITY, forward_chunk};
use crate::transform::{InvocationEnvelope, message_envelope, text_envelope};

const ROLE_SESSION_NAME: &str = "bedrockruntime-session";

/// Outcome of one completion call: exactly one variant, fixed at
/// construction. The stream variant hands over the sole consumer side of
/// the relay; channel closure is the end-of-stream signal.
#[derive(Debug)]
pub enum Completion<R, E> {
    Complete(R),
    Stream(mpsc::Receiver<E>),
}

/// Owns the authenticated Bedrock runtime client. The handle is shared
/// read-only across requests; per-request state lives in the envelopes.
#[derive(Debug, Clone)]
pub struct BedrockClient {
    config: BedrockConfig,
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockClient {
    /// Builds the runtime client from static credentials, exchanging them
    /// for temporary role credentials first when a role ARN is configured.
    /// Any failure here is fatal — there is no degraded mode.
    pub async fn connect(config: BedrockConfig) -> Result<Self, BedrockError> {
        let base = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "bproxy-static",
            ))
            .load()
            .await;

        if config.role_arn.is_empty() {
            let client = aws_sdk_bedrockruntime::Client::new(&base);
            return Ok(Self { config, client });
        }

        let sts = aws_sdk_sts::Client::new(&base);
        let assumed = sts
            .assume_role()
            .role_arn(&config.role_arn)
            .role_session_name(ROLE_SESSION_NAME)
            .send()
            .await
            .map_err(|err| BedrockError::Credentials(DisplayErrorContext(&err).to_string()))?;
        let creds = assumed.credentials.ok_or_else(|| {
            BedrockError::Credentials("assume-role response carried no credentials".to_string())
        })?;

        let role_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.role_region.clone()))
            .credentials_provider(Credentials::new(
                creds.access_key_id,
                creds.secret_access_key,
                Some(creds.session_token),
                None,
                "bproxy-assumed-role",
            ))
            .load()
            .await;
        let client = aws_sdk_bedrockruntime::Client::new(&role_config);
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BedrockConfig {
        &self.config
    }

    /// Legacy dialect entry point: transform, then invoke in the mode the
    /// request asked for.
    pub async fn complete_text(
        &self,
        req: &mut TextCompletionRequest,
    ) -> Result<Completion<TextCompletionResponse, TextCompletionStreamEvent>, BedrockError> {
        let envelope = text_envelope(req, &self.config)?;
        if req.stream {
            let events = self.invoke_stream(&envelope).await?;
            return Ok(Completion::Stream(events));
        }
        let body = self.invoke(&envelope).await?;
        let response = serde_json::from_slice(&body).map_err(BedrockError::Decode)?;
        Ok(Completion::Complete(response))
    }

    /// Messages dialect entry point. Header-level overrides must already be
    /// applied to `req` by the caller.
    pub async fn complete_message(
        &self,
        req: &mut MessageCompletionRequest,
    ) -> Result<Completion<MessageCompletionResponse, MessageStreamEvent>, BedrockError> {
        let envelope = message_envelope(req, &self.config)?;
        debug!(
            model_id = %envelope.model_id,
            body = %String::from_utf8_lossy(&envelope.body),
            "bedrock request"
        );
        if req.stream {
            let events = self.invoke_stream(&envelope).await?;
            return Ok(Completion::Stream(events));
        }
        let body = self.invoke(&envelope).await?;
        let response = serde_json::from_slice(&body).map_err(BedrockError::Decode)?;
        Ok(Completion::Complete(response))
    }

    /// Single-shot invocation; the raw response body is decoded by the
    /// dialect-aware call sites.
    async fn invoke(&self, envelope: &InvocationEnvelope) -> Result<Bytes, BedrockError> {
        let output = self
            .client
            .invoke_model()
            .body(Blob::new(envelope.body.to_vec()))
            .model_id(&envelope.model_id)
            .content_type(envelope.content_type)
            .send()
            .await
            .map_err(|err| BedrockError::Invoke(DisplayErrorContext(&err).to_string()))?;
        Ok(Bytes::from(output.body.into_inner()))
    }

    /// Streaming invocation. Establishment failures return immediately with
    /// no background work; on success one relay task per request forwards
    /// decoded chunks into a bounded channel in arrival order. The producer
    /// owns closing: it drops the sender on upstream end-of-stream or
    /// error, and stops early if the consumer goes away.
    async fn invoke_stream<E>(
        &self,
        envelope: &InvocationEnvelope,
    ) -> Result<mpsc::Receiver<E>, BedrockError>
    where
        E: StreamEvent + DeserializeOwned + Send + 'static,
    {
        let output = self
            .client
            .invoke_model_with_response_stream()
            .body(Blob::new(envelope.body.to_vec()))
            .model_id(&envelope.model_id)
            .content_type(envelope.content_type)
            .send()
            .await
            .map_err(|err| BedrockError::Invoke(DisplayErrorContext(&err).to_string()))?;

        let mut reader = output.body;
        let (tx, rx) = mpsc::channel::<E>(RELAY_CAPACITY);
        tokio::spawn(async move {
            loop {
                match reader.recv().await {
                    Ok(Some(ResponseStream::Chunk(part))) => {
                        let Some(blob) = part.bytes else {
                            continue;
                        };
                        if !forward_chunk(&tx, blob.as_ref()).await {
                            // consumer hung up; tear the upstream stream down
                            break;
                        }
                    }
                    Ok(Some(_)) => {
                        warn!("skipping unknown stream frame");
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(
                            error = %DisplayErrorContext(&err),
                            "bedrock stream ended with transport error"
                        );
                        break;
                    }
                }
            }
        });
        Ok(rx)
    }
}
