use serde::{Deserialize, Serialize};

/// A single reading from one sensor. Stored once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub sensor_id: String,

    /// Seconds since epoch.
    pub timestamp: i64,

    pub iaq: f64,

    pub co2: f64,

    pub voc: f64,

    pub pressure: f64,

    pub temperature: f64,

    pub humidity: f64,
}
