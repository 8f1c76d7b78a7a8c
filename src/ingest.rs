//! Decoding of inbound measurement payloads.
//!
//! Delivery is at-most-once: a payload that cannot be parsed or stored is
//! logged and dropped. There is no redelivery.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};

use crate::{
    error::{Error, Result},
    models::Measurement,
    store::MeasurementStore,
};

const FIELD_COUNT: usize = 7;

/// Parses `"<sensorId> <iaq> <co2> <voc> <pressure> <temperature> <humidity>"`.
pub fn parse_measurement_payload(payload: &str, timestamp: i64) -> Result<Measurement> {
    let fields: Vec<&str> = payload.split_whitespace().collect();
    if fields.len() != FIELD_COUNT {
        return Err(Error::ParseFailure(format!(
            "expected {FIELD_COUNT} space-separated fields, got {}",
            fields.len()
        )));
    }

    let number = |index: usize, name: &str| -> Result<f64> {
        let raw = fields[index];
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(Error::ParseFailure(format!(
                "{name} must be a finite number, got '{raw}'"
            ))),
        }
    };

    Ok(Measurement {
        sensor_id: fields[0].to_string(),
        timestamp,
        iaq: number(1, "iaq")?,
        co2: number(2, "co2")?,
        voc: number(3, "voc")?,
        pressure: number(4, "pressure")?,
        temperature: number(5, "temperature")?,
        humidity: number(6, "humidity")?,
    })
}

#[derive(Clone)]
pub struct MeasurementHandler {
    store: Arc<dyn MeasurementStore>,
}

impl MeasurementHandler {
    pub fn new(store: Arc<dyn MeasurementStore>) -> Self {
        Self { store }
    }

    /// Stamps the payload with the current time and stores it. Failures are
    /// logged, never returned.
    pub async fn handle(&self, payload: &str) {
        let _ = self.process(payload, Utc::now().timestamp()).await;
    }

    /// Parses and stores one payload received at `received_at`.
    pub async fn process(&self, payload: &str, received_at: i64) -> Result<Measurement> {
        debug!(payload, "received measurement message");

        let measurement = parse_measurement_payload(payload, received_at).inspect_err(|e| {
            warn!(payload, error = %e, "dropping measurement message that could not be parsed");
        })?;

        self.store
            .insert_measurement(&measurement)
            .await
            .inspect_err(|e| {
                error!(
                    sensor_id = %measurement.sensor_id,
                    payload,
                    error = ?e,
                    "dropping measurement that could not be stored"
                );
            })?;

        debug!(sensor_id = %measurement.sensor_id, timestamp = measurement.timestamp, "stored measurement");

        Ok(measurement)
    }
}
