//! HTTP surface: measurement queries, graphs and event records.

mod error;
mod events;
mod graphs;
mod measurements;

pub use error::ApiError;

use std::sync::Arc;

use anyhow::Context as _;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    aggregator::Aggregator,
    store::{EventStore, MeasurementStore},
    view::ViewResolver,
};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,

    pub events: Arc<dyn EventStore>,

    pub views: ViewResolver,

    /// Sensors every query covers, in display order.
    pub sensor_ids: Arc<[String]>,
}

impl AppState {
    pub fn new(
        measurements: Arc<dyn MeasurementStore>,
        events: Arc<dyn EventStore>,
        views: ViewResolver,
        sensor_ids: Vec<String>,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(measurements),
            events,
            views,
            sensor_ids: sensor_ids.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/measurements", get(measurements::list_measurements))
        .route("/api/graphs", get(graphs::show_graphs))
        .route(
            "/api/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/events/{id}",
            get(events::get_event).patch(events::update_event),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Serves the API on `address` until Ctrl-C.
pub async fn run_http_server(address: &str, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("server is listening on http://{address}");
    info!("visit http://{address}/api/graphs");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("signal caught - exiting");
        })
        .await
        .context("HTTP server failed")?;

    info!("shutdown complete");

    Ok(())
}
