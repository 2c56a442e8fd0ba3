use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mapping::parse_mappings;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub listen: String,
    #[serde(default)]
    pub web_root: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BedrockConfig {
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub role_arn: String,
    #[serde(default)]
    pub role_region: String,
    #[serde(default)]
    pub model_mappings: HashMap<String, String>,
    #[serde(default)]
    pub anthropic_version_mappings: HashMap<String, String>,
    #[serde(default)]
    pub anthropic_default_model: String,
    #[serde(default)]
    pub anthropic_default_version: String,
}

impl BedrockConfig {
    /// Environment overlay. Scalar fields are filled only when the file left
    /// them empty; mapping tables and the default identifiers are replaced
    /// wholesale whenever the environment supplies a value.
    pub fn overlay_env(&mut self) {
        fill_if_empty(&mut self.access_key, "AWS_BEDROCK_ACCESS_KEY");
        fill_if_empty(&mut self.secret_key, "AWS_BEDROCK_SECRET_KEY");
        fill_if_empty(&mut self.region, "AWS_BEDROCK_REGION");
        fill_if_empty(&mut self.role_arn, "AWS_BEDROCK_ROLE_ARN");
        fill_if_empty(&mut self.role_region, "AWS_BEDROCK_ROLE_REGION");

        let model_mappings = env_var("AWS_BEDROCK_MODEL_MAPPINGS");
        if !model_mappings.is_empty() {
            self.model_mappings = parse_mappings(&model_mappings);
        }
        let version_mappings = env_var("AWS_BEDROCK_ANTHROPIC_VERSION_MAPPINGS");
        if !version_mappings.is_empty() {
            self.anthropic_version_mappings = parse_mappings(&version_mappings);
        }
        let default_model = env_var("AWS_BEDROCK_ANTHROPIC_DEFAULT_MODEL");
        if !default_model.is_empty() {
            self.anthropic_default_model = default_model;
        }
        let default_version = env_var("AWS_BEDROCK_ANTHROPIC_DEFAULT_VERSION");
        if !default_version.is_empty() {
            self.anthropic_default_version = default_version;
        }
    }
}

/// Process configuration: HTTP fields at the top level, upstream settings
/// nested under `bedrock_config`, matching the JSON config file layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub http: HttpConfig,
    #[serde(default)]
    pub bedrock_config: BedrockConfig,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    pub fn overlay_env(&mut self) {
        fill_if_empty(&mut self.http.listen, "HTTP_LISTEN");
        fill_if_empty(&mut self.http.web_root, "WEB_ROOT");
        fill_if_empty(&mut self.http.api_key, "API_KEY");
        self.bedrock_config.overlay_env();
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn env_var(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

fn fill_if_empty(field: &mut String, name: &str) {
    if field.is_empty() {
        *field = env_var(name);
    }
}
