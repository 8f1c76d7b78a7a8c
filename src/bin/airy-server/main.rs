mod args;

use std::{process::ExitCode, sync::Arc};

use airy::{
    api::{AppState, run_http_server},
    db::{PgStore, new_pool},
    view::{ViewConfig, ViewResolver},
};
use anyhow::{Result, ensure};
use args::Args;
use clap::Parser as _;
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

    let sensor_ids: Vec<String> = args
        .sensor_ids
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    ensure!(!sensor_ids.is_empty(), "at least one sensor id is required");

    let pool = new_pool(&args.database_url, args.max_connections).await?;
    let store = Arc::new(PgStore::new(pool));

    if args.run_migrations {
        store.migrate().await?;
        info!("database migrations applied");
    }

    info!(timezone = %args.timezone, sensors = ?sensor_ids, "starting server");

    let views = ViewResolver::new(ViewConfig::new(args.timezone));
    let state = AppState::new(store.clone(), store, views, sensor_ids);

    run_http_server(&args.listen, state).await
}
