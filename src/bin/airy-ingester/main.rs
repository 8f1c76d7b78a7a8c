mod args;
mod transport;

use std::{process::ExitCode, sync::Arc};

use airy::{
    db::{PgStore, new_pool},
    ingest::MeasurementHandler,
};
use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let pool = new_pool(&args.database_url, args.max_connections).await?;
    let handler = MeasurementHandler::new(Arc::new(PgStore::new(pool)));

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("ingester is listening on {}", args.listen);

    tokio::select! {
        _ = transport::serve(listener, handler) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("signal caught - exiting");
        }
    }

    info!("shutdown complete");

    Ok(())
}
