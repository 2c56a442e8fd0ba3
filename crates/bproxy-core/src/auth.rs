use http::HeaderMap;

/// Key gate for the `/v1` API routes. An empty configured key disables the
/// gate entirely; a configured key requires an exact `x-api-key` match.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyAuth {
    key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingKey,
    InvalidKey,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingKey => "empty api key",
            AuthError::InvalidKey => "invalid api key",
        }
    }
}

impl ApiKeyAuth {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        if self.key.is_empty() {
            return Ok(());
        }
        let provided = headers
            .get("x-api-key")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if provided.is_empty() {
            return Err(AuthError::MissingKey);
        }
        if provided != self.key {
            return Err(AuthError::InvalidKey);
        }
        Ok(())
    }
}
