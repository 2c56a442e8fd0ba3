use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, warn};

mod cli;

use bproxy_bedrock::BedrockClient;
use bproxy_common::Config;
use bproxy_core::{ApiKeyAuth, AppState};

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("bproxy failed: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let mut config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %cli.config, error = %err, "config file not loaded, starting from defaults");
            Config::default()
        }
    };

    if dotenvy::dotenv().is_err() {
        debug!("no .env file found");
    }
    config.overlay_env();
    if let Ok(dump) = config.to_json_pretty() {
        debug!(config = %dump, "effective configuration");
    }
    if config.http.listen.is_empty() {
        return Err("listen address not configured (set `listen` or HTTP_LISTEN)".into());
    }

    let client = BedrockClient::connect(config.bedrock_config.clone()).await?;
    let state = Arc::new(AppState {
        auth: ApiKeyAuth::new(config.http.api_key.clone()),
        client,
    });
    let app = bproxy_core::router(state, &config.http.web_root);

    let listener = tokio::net::TcpListener::bind(&config.http.listen).await?;
    info!(addr = %config.http.listen, "http service starting");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bproxy=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
