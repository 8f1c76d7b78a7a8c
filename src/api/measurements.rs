use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    api::{ApiError, AppState},
    error::{Error, Result},
    models::{AggregatedPoint, MeasurementsQuery},
};

#[derive(Debug, Deserialize)]
pub struct MeasurementsParams {
    from: Option<String>,
    to: Option<String>,
    resolution: Option<String>,
}

pub(super) fn parse_integer(name: &str, raw: Option<&str>) -> Result<i64> {
    let raw = raw.unwrap_or_default();
    raw.parse().map_err(|_| {
        Error::invalid_argument(format!("invalid {name}: '{raw}', must be an integer"))
    })
}

impl MeasurementsParams {
    fn into_query(self, sensor_ids: &[String]) -> Result<MeasurementsQuery> {
        Ok(MeasurementsQuery {
            start_epoch: parse_integer("from", self.from.as_deref())?,
            end_epoch: parse_integer("to", self.to.as_deref())?,
            resolution: parse_integer("resolution", self.resolution.as_deref())?,
            sensor_ids: sensor_ids.to_vec(),
        })
    }
}

pub async fn list_measurements(
    State(state): State<AppState>,
    Query(params): Query<MeasurementsParams>,
) -> Result<Json<Vec<AggregatedPoint>>, ApiError> {
    let query = params.into_query(&state.sensor_ids)?;
    let points = state.aggregator.aggregate(&query).await?;
    Ok(Json(points))
}
