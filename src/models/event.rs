use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MAX_EVENT_TIMESTAMP: i64 = i32::MAX as i64;

/// A discrete occurrence at a location, e.g. `window:open` in the bedroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,

    pub start_timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<i64>,

    pub location_id: String,

    pub event_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewEvent {
    pub start_timestamp: i64,

    #[serde(default)]
    pub end_timestamp: Option<i64>,

    pub location_id: String,

    pub event_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventPatch {
    #[serde(default)]
    pub start_timestamp: Option<i64>,

    #[serde(default)]
    pub end_timestamp: Option<i64>,

    #[serde(default)]
    pub location_id: Option<String>,

    #[serde(default)]
    pub event_type: Option<String>,
}

impl NewEvent {
    pub fn validate(&self, location_ids: &[String]) -> Result<()> {
        validate_event_fields(
            self.start_timestamp,
            self.end_timestamp,
            &self.location_id,
            &self.event_type,
            location_ids,
        )
    }

    pub fn into_event(self, id: String) -> Event {
        Event {
            id,
            start_timestamp: self.start_timestamp,
            end_timestamp: self.end_timestamp,
            location_id: self.location_id,
            event_type: self.event_type,
        }
    }
}

impl Event {
    pub fn validate(&self, location_ids: &[String]) -> Result<()> {
        validate_event_fields(
            self.start_timestamp,
            self.end_timestamp,
            &self.location_id,
            &self.event_type,
            location_ids,
        )
    }
}

impl EventPatch {
    pub fn apply(self, mut event: Event) -> Event {
        if let Some(start_timestamp) = self.start_timestamp {
            event.start_timestamp = start_timestamp;
        }
        if let Some(end_timestamp) = self.end_timestamp {
            event.end_timestamp = Some(end_timestamp);
        }
        if let Some(location_id) = self.location_id {
            event.location_id = location_id;
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        event
    }
}

fn validate_event_fields(
    start_timestamp: i64,
    end_timestamp: Option<i64>,
    location_id: &str,
    event_type: &str,
    location_ids: &[String],
) -> Result<()> {
    if !(0..=MAX_EVENT_TIMESTAMP).contains(&start_timestamp) {
        return Err(Error::invalid_argument(format!(
            "startTimestamp must be between 0 and {MAX_EVENT_TIMESTAMP}, got {start_timestamp}"
        )));
    }

    if let Some(end_timestamp) = end_timestamp {
        if end_timestamp <= start_timestamp {
            return Err(Error::invalid_argument(format!(
                "endTimestamp must be greater than startTimestamp, got {end_timestamp}"
            )));
        }
        if end_timestamp > MAX_EVENT_TIMESTAMP {
            return Err(Error::invalid_argument(format!(
                "endTimestamp must not exceed {MAX_EVENT_TIMESTAMP}, got {end_timestamp}"
            )));
        }
    }

    if !location_ids.iter().any(|id| id == location_id) {
        return Err(Error::invalid_argument(format!(
            "locationId must be one of [{}], got '{location_id}'",
            location_ids.join(" ")
        )));
    }

    if event_type.trim().is_empty() {
        return Err(Error::invalid_argument("eventType must not be empty"));
    }

    Ok(())
}
