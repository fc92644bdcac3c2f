//! D'Quest API server.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use dquest::api::{build_router, AppState};
use dquest::clients::cerebras::{CerebrasClient, CerebrasConfig};
use dquest::clients::CompletionClient;
use dquest::config::Config;
use dquest::store::QuizStore;

#[derive(Debug, Parser)]
#[command(name = "dquest", about = "AI trivia quiz API server")]
struct Args {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "DQUEST_BIND", default_value = "127.0.0.1:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::from_env();
    let args = Args::parse();

    info!("Starting dquest v{}", env!("CARGO_PKG_VERSION"));

    let client: Option<Box<dyn CompletionClient>> = match &config.api_key {
        Some(key) => {
            let cerebras = CerebrasClient::new(CerebrasConfig {
                api_key: key.clone(),
                model: config
                    .model
                    .clone()
                    .unwrap_or_else(|| dquest::clients::cerebras::DEFAULT_MODEL.to_string()),
                ..CerebrasConfig::default()
            })?;
            Some(Box::new(cerebras))
        }
        None => {
            warn!("CEREBRAS_API_KEY not set; quiz generation is disabled");
            None
        }
    };

    let store = QuizStore::new(config.backend.clone());
    info!(backend = store.backend_name(), "persistence configured");

    let state = AppState::new(config, client, store);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("dquest listening on http://{}", args.bind);
    info!("Health check: http://{}/api/health", args.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
