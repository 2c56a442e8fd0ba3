pub mod config;
pub mod mapping;

pub use config::{BedrockConfig, Config, ConfigError, HttpConfig};
pub use mapping::{parse_mappings, resolve};
