#[derive(Debug, thiserror::Error)]
pub enum BedrockError {
    /// Request could not be serialized; nothing was sent upstream.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),
    /// Upstream call failed (transport or service error). Never retried.
    #[error("bedrock invocation failed: {0}")]
    Invoke(String),
    /// Upstream answered but the response body did not decode.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
    /// Credential bootstrap (static or assume-role) failed; fatal to client
    /// construction.
    #[error("failed to establish backend credentials: {0}")]
    Credentials(String),
}
