//! Time-bucketed averaging of sensor measurements.
//!
//! The production path pushes the grouping down into the store as a single
//! grouped read. [`aggregate_measurements`] is the same computation over
//! measurements already in memory; the in-memory store is built on it.

use std::{collections::BTreeMap, sync::Arc};

use tracing::debug;

use crate::{
    bucket::bucket,
    error::Result,
    models::{AggregatedPoint, Measurement, MeasurementsQuery},
    store::MeasurementStore,
};

/// Answers [`MeasurementsQuery`]s against an injected store.
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn MeasurementStore>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn MeasurementStore>) -> Self {
        Self { store }
    }

    /// One averaged point per `(bucket, sensor)` that has at least one
    /// measurement, ascending by bucket.
    ///
    /// The query is validated before the store is touched. Store failures
    /// are returned unchanged.
    pub async fn aggregate(&self, query: &MeasurementsQuery) -> Result<Vec<AggregatedPoint>> {
        query.validate()?;

        let points = self.store.query_aggregates(query).await?;

        debug!(
            start_epoch = query.start_epoch,
            end_epoch = query.end_epoch,
            resolution = query.resolution,
            points = points.len(),
            "aggregated measurements"
        );

        Ok(points)
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: u64,
    iaq: f64,
    co2: f64,
    voc: f64,
    pressure: f64,
    temperature: f64,
    humidity: f64,
}

impl Accumulator {
    fn add(&mut self, m: &Measurement) {
        self.count += 1;
        self.iaq += m.iaq;
        self.co2 += m.co2;
        self.voc += m.voc;
        self.pressure += m.pressure;
        self.temperature += m.temperature;
        self.humidity += m.humidity;
    }

    fn finish(self, bucket_timestamp: i64, sensor_id: &str) -> AggregatedPoint {
        let n = self.count as f64;
        AggregatedPoint {
            bucket_timestamp,
            sensor_id: sensor_id.to_string(),
            iaq: self.iaq / n,
            co2: self.co2 / n,
            voc: self.voc / n,
            pressure: self.pressure / n,
            temperature: self.temperature / n,
            humidity: self.humidity / n,
        }
    }
}

/// Groups `measurements` by `(bucket, sensor)` and averages each quantity.
///
/// Output is ordered by bucket, then by sensor id. Measurements outside
/// `[start_epoch, end_epoch]` or for sensors not in the query are ignored.
pub fn aggregate_measurements<'a>(
    measurements: impl IntoIterator<Item = &'a Measurement>,
    query: &MeasurementsQuery,
) -> Result<Vec<AggregatedPoint>> {
    query.validate()?;

    let mut groups: BTreeMap<(i64, &str), Accumulator> = BTreeMap::new();

    for m in measurements {
        if m.timestamp < query.start_epoch || m.timestamp > query.end_epoch {
            continue;
        }
        if !query.sensor_ids.iter().any(|id| *id == m.sensor_id) {
            continue;
        }

        let bucket_timestamp = bucket(m.timestamp, query.resolution)?;
        groups
            .entry((bucket_timestamp, m.sensor_id.as_str()))
            .or_default()
            .add(m);
    }

    Ok(groups
        .into_iter()
        .map(|((bucket_timestamp, sensor_id), acc)| acc.finish(bucket_timestamp, sensor_id))
        .collect())
}
