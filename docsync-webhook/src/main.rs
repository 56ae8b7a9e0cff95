//! docsync webhook service
//!
//! Receives change notifications from the document store and keeps the
//! per-type search indices in sync.
//!
//! Usage:
//!   docsync-webhook --config docsync.json --port 8080

use anyhow::{Context, Result};
use clap::Parser;
use docsync_webhook::build_router;
use docsync_webhook::config::{ServiceConfig, build_state};
use std::{path::PathBuf, sync::Arc};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "docsync-webhook")]
#[command(about = "Keeps search indices in sync with document store changes")]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "docsync.json")]
    config: PathBuf,

    /// HTTP port to listen on
    #[arg(short, long, env = "DOCSYNC_PORT", default_value = "8080")]
    port: u16,

    /// Sanity read token, overrides the config file
    #[arg(long, env = "SANITY_TOKEN", hide_env_values = true)]
    sanity_token: Option<String>,

    /// Algolia write key, overrides the config file
    #[arg(long, env = "ALGOLIA_API_KEY", hide_env_values = true)]
    algolia_api_key: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("docsync webhook starting...");
    let mut config = ServiceConfig::load(&args.config)?;
    if let Some(token) = args.sanity_token {
        config.sanity.token = Some(token);
    }
    if let Some(key) = args.algolia_api_key {
        config.algolia.api_key = key;
    }

    let state = build_state(config)?;
    info!("Indexing types {:?}", state.indexer.types());

    let app = build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", args.port))?;
    info!("Listening for webhooks on port {}", args.port);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
