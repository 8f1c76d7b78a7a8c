use axum::{
    extract::{Query, State},
    response::Html,
};

use crate::{
    api::{ApiError, AppState},
    chart::{TimeAxis, render_graphs},
    view::ViewRequest,
};

pub async fn show_graphs(
    State(state): State<AppState>,
    Query(request): Query<ViewRequest>,
) -> Result<Html<String>, ApiError> {
    let resolved = state.views.resolve_now(&request)?;

    let points = state
        .aggregator
        .aggregate(&resolved.measurements_query(&state.sensor_ids))
        .await?;
    let events = state.events.query_events(&resolved.events_query()).await?;

    let axis = TimeAxis {
        start_epoch: resolved.start_epoch,
        end_epoch: resolved.end_epoch,
    };

    Ok(Html(render_graphs(points, events, &state.sensor_ids, axis)))
}
