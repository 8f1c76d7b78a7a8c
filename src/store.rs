//! Storage capabilities the core depends on.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{AggregatedPoint, Event, EventsQuery, Measurement, MeasurementsQuery, NewEvent},
};

#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// Averaged points for `query`, ascending by bucket then sensor id.
    async fn query_aggregates(&self, query: &MeasurementsQuery) -> Result<Vec<AggregatedPoint>>;

    async fn insert_measurement(&self, measurement: &Measurement) -> Result<()>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events starting within `[start_epoch, end_epoch]`, ascending by start.
    async fn query_events(&self, query: &EventsQuery) -> Result<Vec<Event>>;

    async fn insert_event(&self, event: NewEvent) -> Result<Event>;

    async fn get_event(&self, id: &str) -> Result<Event>;

    async fn update_event(&self, event: &Event) -> Result<Event>;
}
