use anyhow::Context as _;
use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::{AggregatedPoint, Event, EventsQuery, Measurement, MeasurementsQuery, NewEvent},
    store::{EventStore, MeasurementStore},
};

pub async fn new_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to database")
}

/// Postgres-backed measurement and event storage.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run database migrations")
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    start_timestamp: i64,
    end_timestamp: Option<i64>,
    location_id: String,
    event_type: String,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id.to_string(),
            start_timestamp: row.start_timestamp,
            end_timestamp: row.end_timestamp,
            location_id: row.location_id,
            event_type: row.event_type,
        }
    }
}

fn map_event_error(e: sqlx::Error, id: &str) -> Error {
    match &e {
        sqlx::Error::RowNotFound => Error::EventNotFound(id.to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::DuplicateEvent,
        _ => e.into(),
    }
}

#[async_trait]
impl MeasurementStore for PgStore {
    async fn query_aggregates(&self, query: &MeasurementsQuery) -> Result<Vec<AggregatedPoint>> {
        // Postgres `%` keeps the sign of the dividend, so negative remainders
        // step back one more bucket. No intermediate exceeds the floor itself.
        let points = sqlx::query_as::<_, AggregatedPoint>(
            r#"
            WITH bucketed AS (
                SELECT
                    CASE
                        WHEN "timestamp" % $1 < 0 THEN "timestamp" - "timestamp" % $1 - $1
                        ELSE "timestamp" - "timestamp" % $1
                    END AS bucket_timestamp,
                    sensor_id,
                    iaq,
                    co2,
                    voc,
                    pressure,
                    temperature,
                    humidity
                FROM measurements
                WHERE sensor_id = ANY($4) AND "timestamp" >= $2 AND "timestamp" <= $3
            )
            SELECT
                bucket_timestamp,
                sensor_id,
                AVG(iaq) AS iaq,
                AVG(co2) AS co2,
                AVG(voc) AS voc,
                AVG(pressure) AS pressure,
                AVG(temperature) AS temperature,
                AVG(humidity) AS humidity
            FROM bucketed
            GROUP BY bucket_timestamp, sensor_id
            ORDER BY bucket_timestamp ASC, sensor_id ASC
            "#,
        )
        .bind(query.resolution)
        .bind(query.start_epoch)
        .bind(query.end_epoch)
        .bind(&query.sensor_ids)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            start_epoch = query.start_epoch,
            end_epoch = query.end_epoch,
            resolution = query.resolution,
            rows = points.len(),
            "queried aggregated measurements"
        );

        Ok(points)
    }

    async fn insert_measurement(&self, m: &Measurement) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO measurements ("timestamp", sensor_id, iaq, co2, voc, pressure, temperature, humidity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(m.timestamp)
        .bind(&m.sensor_id)
        .bind(m.iaq)
        .bind(m.co2)
        .bind(m.voc)
        .bind(m.pressure)
        .bind(m.temperature)
        .bind(m.humidity)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn query_events(&self, query: &EventsQuery) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, start_timestamp, end_timestamp, location_id, type AS event_type
            FROM events
            WHERE start_timestamp >= $1 AND start_timestamp <= $2
            ORDER BY start_timestamp ASC
            "#,
        )
        .bind(query.start_epoch)
        .bind(query.end_epoch)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn insert_event(&self, event: NewEvent) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (start_timestamp, end_timestamp, location_id, type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, start_timestamp, end_timestamp, location_id, type AS event_type
            "#,
        )
        .bind(event.start_timestamp)
        .bind(event.end_timestamp)
        .bind(&event.location_id)
        .bind(&event.event_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_event_error(e, ""))?;

        Ok(row.into())
    }

    async fn get_event(&self, id: &str) -> Result<Event> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Err(Error::EventNotFound(id.to_string()));
        };

        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, start_timestamp, end_timestamp, location_id, type AS event_type
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(uuid)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_event_error(e, id))?;

        Ok(row.into())
    }

    async fn update_event(&self, event: &Event) -> Result<Event> {
        let Ok(uuid) = Uuid::parse_str(&event.id) else {
            return Err(Error::EventNotFound(event.id.clone()));
        };

        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events SET
                start_timestamp = $2,
                end_timestamp = $3,
                location_id = $4,
                type = $5
            WHERE id = $1
            RETURNING id, start_timestamp, end_timestamp, location_id, type AS event_type
            "#,
        )
        .bind(uuid)
        .bind(event.start_timestamp)
        .bind(event.end_timestamp)
        .bind(&event.location_id)
        .bind(&event.event_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_event_error(e, &event.id))?;

        Ok(row.into())
    }
}
