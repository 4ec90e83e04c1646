use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use ollama_relay::config::{Cli, Config};
use ollama_relay::server::api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "ollama_relay=debug,tower_http=debug"
    } else {
        "ollama_relay=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("ollama-relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let mut config = Config::load(&cli.config)?;
    config.apply_cli(&cli);
    let config = Arc::new(config);

    info!(
        upstream = %config.upstream.base_url,
        static_dir = %config.server.static_dir.display(),
        "Configuration loaded"
    );

    let state = Arc::new(AppState::new(config.clone()).context("building upstream client")?);
    let app = build_router(state);

    let listen_addr = &config.server.listen;
    let listener = match TcpListener::bind(listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %listen_addr, error = %e, "Server failed to start");
            return Err(e).with_context(|| format!("binding {listen_addr}"));
        }
    };
    info!("Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
