use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::Deserialize;

use crate::{
    api::{ApiError, AppState, measurements::parse_integer},
    error::{Error, Result},
    models::{Event, EventPatch, EventsQuery, NewEvent},
};

#[derive(Debug, Deserialize)]
pub struct EventsParams {
    from: Option<String>,
    to: Option<String>,
}

impl EventsParams {
    fn into_query(self) -> Result<EventsQuery> {
        let query = EventsQuery {
            start_epoch: parse_integer("from", self.from.as_deref())?,
            end_epoch: parse_integer("to", self.to.as_deref())?,
        };
        query.validate()?;
        Ok(query)
    }
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(v)| v)
        .map_err(|rejection| Error::invalid_argument(rejection.body_text()))
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventsParams>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let query = params.into_query()?;
    let events = state.events.query_events(&query).await?;
    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewEvent>, JsonRejection>,
) -> Result<Json<Event>, ApiError> {
    let new_event = json_body(body)?;
    new_event.validate(&state.sensor_ids)?;

    let event = state.events.insert_event(new_event).await?;
    Ok(Json(event))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let event = state.events.get_event(&id).await?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<EventPatch>, JsonRejection>,
) -> Result<Json<Event>, ApiError> {
    let patch = json_body(body)?;

    let event = patch.apply(state.events.get_event(&id).await?);
    event.validate(&state.sensor_ids)?;

    let event = state.events.update_event(&event).await?;
    Ok(Json(event))
}
