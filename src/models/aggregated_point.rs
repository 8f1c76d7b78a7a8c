use serde::{Deserialize, Serialize};

/// Mean of every quantity over one `(bucket, sensor)` group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPoint {
    #[serde(rename = "timestamp")]
    pub bucket_timestamp: i64,

    pub sensor_id: String,

    pub iaq: f64,

    pub co2: f64,

    pub voc: f64,

    pub pressure: f64,

    pub temperature: f64,

    pub humidity: f64,
}
