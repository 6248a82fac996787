use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use quickwatch_core::{ChatClient, LlmHighlightSelector, LlmSummaryGenerator, Orchestrator, YoutubeTranscriptSource};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    routes::{AppState, router},
};

mod config;
mod error;
mod routes;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Config::parse();

    let mut client = ChatClient::from_env(config.provider)?;
    if let Some(model) = &config.model {
        client = client.with_model(model);
    }
    info!(
        provider = %config.provider,
        model = client.model(),
        mode = %config.mode,
        lang = %config.lang,
        "quickwatch server configured"
    );

    let state = AppState {
        orchestrator: Orchestrator::new(
            Arc::new(YoutubeTranscriptSource::new(&config.lang)),
            Arc::new(LlmSummaryGenerator::new(client.clone())),
            Arc::new(LlmHighlightSelector::new(client, config.mode)),
        ),
        timeout: config.timeout(),
    };

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
