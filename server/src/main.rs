use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use llm_core::{LlmConfig, Responder};
use server::{build_router, config::ServerConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    async_main().await
}

async fn async_main() -> anyhow::Result<()> {
    info!("Starting talk server...");

    // Backend choice is made once here and never re-read
    let llm_config = LlmConfig::from_env();
    let responder = Responder::from_config(&llm_config)
        .context("Failed to initialize LLM backend")?;

    let config = ServerConfig::from_env();
    info!(
        "Server configuration loaded: port={}, request_timeout={}s, llm_backend={}",
        config.port,
        config.request_timeout_secs,
        responder.backend_name()
    );

    let state = AppState {
        responder: Arc::new(responder),
        config: config.clone(),
    };
    let app = build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT.")
    })?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
