use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    aggregator::aggregate_measurements,
    error::{Error, Result},
    models::{AggregatedPoint, Event, EventsQuery, Measurement, MeasurementsQuery, NewEvent},
    store::{EventStore, MeasurementStore},
};

/// In-process store with the same contract as the Postgres adapter.
#[derive(Debug, Default)]
pub struct MemoryStore {
    measurements: Mutex<Vec<Measurement>>,
    events: Mutex<Vec<Event>>,
    unavailable: AtomicBool,
    insert_attempts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with [`Error::StorageUnavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn measurements(&self) -> Result<Vec<Measurement>> {
        Ok(lock(&self.measurements)?.clone())
    }

    /// Number of `insert_measurement` calls, successful or not.
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::storage("memory store is marked unavailable"));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::storage("memory store lock poisoned"))
}

fn is_duplicate(a: &Event, b: &Event) -> bool {
    a.start_timestamp == b.start_timestamp
        && a.event_type == b.event_type
        && a.location_id == b.location_id
}

#[async_trait]
impl MeasurementStore for MemoryStore {
    async fn query_aggregates(&self, query: &MeasurementsQuery) -> Result<Vec<AggregatedPoint>> {
        self.check_available()?;
        let measurements = lock(&self.measurements)?;
        aggregate_measurements(measurements.iter(), query)
    }

    async fn insert_measurement(&self, measurement: &Measurement) -> Result<()> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        lock(&self.measurements)?.push(measurement.clone());
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn query_events(&self, query: &EventsQuery) -> Result<Vec<Event>> {
        self.check_available()?;
        let mut events: Vec<Event> = lock(&self.events)?
            .iter()
            .filter(|e| (query.start_epoch..=query.end_epoch).contains(&e.start_timestamp))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_timestamp);
        Ok(events)
    }

    async fn insert_event(&self, event: NewEvent) -> Result<Event> {
        self.check_available()?;
        let event = event.into_event(Uuid::new_v4().to_string());

        let mut events = lock(&self.events)?;
        if events.iter().any(|e| is_duplicate(e, &event)) {
            return Err(Error::DuplicateEvent);
        }
        events.push(event.clone());

        Ok(event)
    }

    async fn get_event(&self, id: &str) -> Result<Event> {
        self.check_available()?;
        lock(&self.events)?
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| Error::EventNotFound(id.to_string()))
    }

    async fn update_event(&self, event: &Event) -> Result<Event> {
        self.check_available()?;
        let mut events = lock(&self.events)?;

        if events
            .iter()
            .any(|e| e.id != event.id && is_duplicate(e, event))
        {
            return Err(Error::DuplicateEvent);
        }

        let Some(stored) = events.iter_mut().find(|e| e.id == event.id) else {
            return Err(Error::EventNotFound(event.id.clone()));
        };
        *stored = event.clone();

        Ok(stored.clone())
    }
}
