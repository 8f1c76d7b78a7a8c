//! Named chart views ("day", "week") resolved into concrete epoch ranges.
//!
//! All calendar arithmetic happens in the configured zone; "today" is the
//! calendar date of `now` in that zone.

use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset as _, TimeZone as _, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    models::{EventsQuery, MeasurementsQuery},
};

const HOUR: i64 = 3600;
const DAY: i64 = 24 * HOUR;

/// Rolling day window: 23 hours back, up to the end of the current hour.
const DAY_LOOKBACK: i64 = 23 * HOUR;
const DAY_LOOKAHEAD: i64 = HOUR - 1;

const WEEK_LOOKBACK: i64 = 7 * DAY;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Day,
    Week,
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(View::Day),
            "week" => Ok(View::Week),
            _ => Err(Error::invalid_argument(format!("unknown view: '{s}'"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub timezone: Tz,

    pub day_resolution: i64,

    pub week_resolution: i64,

    /// Largest resolution a caller may request, in seconds.
    pub max_resolution: i64,
}

impl ViewConfig {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            day_resolution: 600,
            week_resolution: 3600,
            max_resolution: DAY,
        }
    }

    fn default_resolution(&self, view: View) -> i64 {
        match view {
            View::Day => self.day_resolution,
            View::Week => self.week_resolution,
        }
    }
}

/// Raw, user-supplied view parameters. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewRequest {
    pub view: Option<String>,

    /// Calendar date, `YYYY-MM-DD`.
    pub date: Option<String>,

    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedView {
    pub view: View,

    pub start_epoch: i64,

    pub end_epoch: i64,

    pub resolution: i64,
}

impl ResolvedView {
    pub fn measurements_query(&self, sensor_ids: &[String]) -> MeasurementsQuery {
        MeasurementsQuery {
            start_epoch: self.start_epoch,
            end_epoch: self.end_epoch,
            resolution: self.resolution,
            sensor_ids: sensor_ids.to_vec(),
        }
    }

    pub fn events_query(&self) -> EventsQuery {
        EventsQuery {
            start_epoch: self.start_epoch,
            end_epoch: self.end_epoch,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewResolver {
    config: ViewConfig,
}

impl ViewResolver {
    pub fn new(config: ViewConfig) -> Self {
        Self { config }
    }

    pub fn resolve_now(&self, request: &ViewRequest) -> Result<ResolvedView> {
        self.resolve(request, Utc::now())
    }

    pub fn resolve(&self, request: &ViewRequest, now: DateTime<Utc>) -> Result<ResolvedView> {
        let tz = self.config.timezone;

        let view = match request.view.as_deref() {
            Some(v) => v.parse()?,
            None => View::Day,
        };

        let date = request.date.as_deref().map(parse_date).transpose()?;

        let resolution = match request.resolution.as_deref() {
            Some(r) => self.parse_resolution(r)?,
            None => self.config.default_resolution(view),
        };

        let now_epoch = now.timestamp();
        let today = now.with_timezone(&tz).date_naive();

        let (start_epoch, end_epoch) = match view {
            View::Day => match date {
                Some(date) if date != today => (start_of_day(date, tz), end_of_day(date, tz)),
                _ => (now_epoch - DAY_LOOKBACK, now_epoch + DAY_LOOKAHEAD),
            },
            View::Week => {
                let date = date.unwrap_or(today);
                (start_of_day(date, tz) - WEEK_LOOKBACK, end_of_day(date, tz))
            }
        };

        Ok(ResolvedView {
            view,
            start_epoch,
            end_epoch,
            resolution,
        })
    }

    fn parse_resolution(&self, raw: &str) -> Result<i64> {
        let resolution: i64 = raw.parse().map_err(|_| {
            Error::invalid_argument(format!(
                "could not parse 'resolution', expected an integer, got '{raw}'"
            ))
        })?;

        if resolution <= 0 || resolution > self.config.max_resolution {
            return Err(Error::invalid_argument(format!(
                "resolution must be greater than 0 and at most {}, got {resolution}",
                self.config.max_resolution
            )));
        }

        Ok(resolution)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        Error::invalid_argument(format!(
            "could not parse 'date', expected YYYY-MM-DD, got '{raw}': {e}"
        ))
    })
}

fn start_of_day(date: NaiveDate, tz: Tz) -> i64 {
    local_epoch(date.and_time(NaiveTime::MIN), tz)
}

fn end_of_day(date: NaiveDate, tz: Tz) -> i64 {
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    local_epoch(date.and_time(end), tz)
}

/// Epoch seconds of a wall-clock time in `tz`. Ambiguous times take the
/// earlier instant; times skipped by a DST gap use the offset in effect
/// after the gap.
fn local_epoch(naive: NaiveDateTime, tz: Tz) -> i64 {
    match naive.and_local_timezone(tz) {
        LocalResult::Single(dt) => dt.timestamp(),
        LocalResult::Ambiguous(dt, _) => dt.timestamp(),
        LocalResult::None => {
            let offset = tz.offset_from_utc_datetime(&naive).fix().local_minus_utc();
            naive.and_utc().timestamp() - i64::from(offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn resolver(tz: Tz) -> ViewResolver {
        ViewResolver::new(ViewConfig::new(tz))
    }

    fn request(view: Option<&str>, date: Option<&str>, resolution: Option<&str>) -> ViewRequest {
        ViewRequest {
            view: view.map(str::to_string),
            date: date.map(str::to_string),
            resolution: resolution.map(str::to_string),
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn day_without_date_is_rolling_window() {
        let now = utc(2024, 6, 15, 12, 34, 56);
        let resolved = resolver(Tz::UTC)
            .resolve(&request(Some("day"), None, None), now)
            .unwrap();

        assert_eq!(resolved.view, View::Day);
        assert_eq!(resolved.start_epoch, now.timestamp() - 23 * 3600);
        assert_eq!(resolved.end_epoch, now.timestamp() + 3599);
        assert_eq!(resolved.end_epoch - resolved.start_epoch, 86399);
        assert_eq!(resolved.resolution, 600);
    }

    #[test]
    fn day_window_length_is_constant() {
        let r = resolver(chrono_tz::Europe::Amsterdam);
        for offset in (0..400 * 86400).step_by(7919) {
            let now = utc(2023, 1, 1, 0, 0, 0) + chrono::Duration::seconds(offset);
            let resolved = r.resolve(&ViewRequest::default(), now).unwrap();
            assert_eq!(resolved.end_epoch - resolved.start_epoch, 86399);
        }
    }

    #[test]
    fn view_defaults_to_day() {
        let now = utc(2024, 6, 15, 12, 0, 0);
        let resolved = resolver(Tz::UTC)
            .resolve(&ViewRequest::default(), now)
            .unwrap();
        assert_eq!(resolved.view, View::Day);
    }

    #[test]
    fn day_for_today_in_zone_is_rolling_window() {
        // 23:30 UTC on the 10th is already the 11th in Amsterdam.
        let now = utc(2024, 3, 10, 23, 30, 0);
        let resolved = resolver(chrono_tz::Europe::Amsterdam)
            .resolve(&request(Some("day"), Some("2024-03-11"), None), now)
            .unwrap();

        assert_eq!(resolved.start_epoch, now.timestamp() - 23 * 3600);
        assert_eq!(resolved.end_epoch, now.timestamp() + 3599);
    }

    #[test]
    fn day_for_other_date_is_calendar_day_in_zone() {
        let now = utc(2024, 3, 10, 23, 30, 0);
        let resolved = resolver(chrono_tz::Europe::Amsterdam)
            .resolve(&request(Some("day"), Some("2024-03-10"), None), now)
            .unwrap();

        // Amsterdam is UTC+1 in March before the DST switch.
        let start = utc(2024, 3, 9, 23, 0, 0).timestamp();
        assert_eq!(resolved.start_epoch, start);
        assert_eq!(resolved.end_epoch, start + 86399);
    }

    #[test]
    fn week_spans_seven_days_before_date_through_its_end() {
        let now = utc(2024, 6, 15, 12, 0, 0);
        let resolved = resolver(Tz::UTC)
            .resolve(&request(Some("week"), Some("2024-06-10"), None), now)
            .unwrap();

        let day_start = utc(2024, 6, 10, 0, 0, 0).timestamp();
        assert_eq!(resolved.start_epoch, day_start - 7 * 86400);
        assert_eq!(resolved.end_epoch, day_start + 86399);
        assert_eq!(resolved.end_epoch - resolved.start_epoch, 7 * 86400 + 86399);
        assert_eq!(resolved.resolution, 3600);
    }

    #[test]
    fn week_without_date_ends_today_in_zone() {
        let now = utc(2024, 6, 15, 23, 30, 0);
        let resolved = resolver(chrono_tz::Europe::Amsterdam)
            .resolve(&request(Some("week"), None, None), now)
            .unwrap();

        // 01:30 on the 16th in Amsterdam (UTC+2).
        let day_start = utc(2024, 6, 15, 22, 0, 0).timestamp();
        assert_eq!(resolved.start_epoch, day_start - 7 * 86400);
        assert_eq!(resolved.end_epoch, day_start + 86399);
    }

    #[test]
    fn explicit_resolution_overrides_default() {
        let now = utc(2024, 6, 15, 12, 0, 0);
        let r = resolver(Tz::UTC);

        let resolved = r.resolve(&request(Some("week"), None, Some("60")), now).unwrap();
        assert_eq!(resolved.resolution, 60);

        let resolved = r.resolve(&request(None, None, Some("86400")), now).unwrap();
        assert_eq!(resolved.resolution, 86400);
    }

    #[test]
    fn rejects_out_of_range_resolution() {
        let now = utc(2024, 6, 15, 12, 0, 0);
        let r = resolver(Tz::UTC);

        for raw in ["0", "-600", "86401", "ten"] {
            let err = r.resolve(&request(None, None, Some(raw)), now).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{raw}");
        }
    }

    #[test]
    fn rejects_unknown_view() {
        let now = utc(2024, 6, 15, 12, 0, 0);
        let err = resolver(Tz::UTC)
            .resolve(&request(Some("month"), None, None), now)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref msg) if msg.contains("unknown view")));
    }

    #[test]
    fn rejects_unparsable_date() {
        let now = utc(2024, 6, 15, 12, 0, 0);
        for raw in ["2024-13-01", "15-06-2024", "yesterday"] {
            let err = resolver(Tz::UTC)
                .resolve(&request(Some("day"), Some(raw), None), now)
                .unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{raw}");
        }
    }

    #[test]
    fn builds_queries_from_resolved_range() {
        let now = utc(2024, 6, 15, 12, 0, 0);
        let resolved = resolver(Tz::UTC)
            .resolve(&ViewRequest::default(), now)
            .unwrap();
        let sensor_ids = vec!["livingroom".to_string(), "bedroom".to_string()];

        let q = resolved.measurements_query(&sensor_ids);
        assert_eq!(q.start_epoch, resolved.start_epoch);
        assert_eq!(q.end_epoch, resolved.end_epoch);
        assert_eq!(q.resolution, 600);
        assert_eq!(q.sensor_ids, sensor_ids);

        let e = resolved.events_query();
        assert_eq!((e.start_epoch, e.end_epoch), (resolved.start_epoch, resolved.end_epoch));
    }
}
