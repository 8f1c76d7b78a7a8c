use indexmap::IndexMap;

use crate::models::{AggregatedPoint, Event};

/// Points per sensor, in order of first appearance.
pub type SensorSeries = IndexMap<String, Vec<AggregatedPoint>>;

/// Events per location, in order of first appearance.
pub type LocationEvents = IndexMap<String, Vec<Event>>;

/// Stable partition of the aggregator output by sensor id. Each inner
/// sequence keeps the relative order of the input.
pub fn group_by_sensor(points: impl IntoIterator<Item = AggregatedPoint>) -> SensorSeries {
    partition(points, |p| &p.sensor_id)
}

pub fn group_by_location(events: impl IntoIterator<Item = Event>) -> LocationEvents {
    partition(events, |e| &e.location_id)
}

/// Inverse of [`group_by_sensor`] for time-ordered input: interleaves the
/// series back into one sequence ascending by bucket.
pub fn flatten(series: SensorSeries) -> Vec<AggregatedPoint> {
    let mut points: Vec<AggregatedPoint> = series.into_values().flatten().collect();
    points.sort_by_key(|p| p.bucket_timestamp);
    points
}

fn partition<T>(
    items: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> &String,
) -> IndexMap<String, Vec<T>> {
    let mut groups: IndexMap<String, Vec<T>> = IndexMap::new();
    for item in items {
        if let Some(group) = groups.get_mut(key(&item)) {
            group.push(item);
        } else {
            groups.insert(key(&item).clone(), vec![item]);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(bucket_timestamp: i64, sensor_id: &str) -> AggregatedPoint {
        AggregatedPoint {
            bucket_timestamp,
            sensor_id: sensor_id.to_string(),
            iaq: bucket_timestamp as f64,
            co2: 0.0,
            voc: 0.0,
            pressure: 0.0,
            temperature: 0.0,
            humidity: 0.0,
        }
    }

    fn sample() -> Vec<AggregatedPoint> {
        vec![
            point(0, "bedroom"),
            point(0, "livingroom"),
            point(600, "livingroom"),
            point(1200, "bedroom"),
            point(1200, "livingroom"),
            point(1800, "bedroom"),
        ]
    }

    #[test]
    fn groups_preserving_time_order() {
        let series = group_by_sensor(sample());

        assert_eq!(series.len(), 2);
        let bedroom: Vec<_> = series["bedroom"].iter().map(|p| p.bucket_timestamp).collect();
        let livingroom: Vec<_> = series["livingroom"]
            .iter()
            .map(|p| p.bucket_timestamp)
            .collect();
        assert_eq!(bedroom, vec![0, 1200, 1800]);
        assert_eq!(livingroom, vec![0, 600, 1200]);
    }

    #[test]
    fn keys_follow_first_appearance() {
        let series = group_by_sensor(sample());
        let keys: Vec<_> = series.keys().cloned().collect();
        assert_eq!(keys, vec!["bedroom", "livingroom"]);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(group_by_sensor(Vec::new()).is_empty());
    }

    #[test]
    fn flatten_restores_per_sensor_order() {
        let original = sample();
        let flattened = flatten(group_by_sensor(original.clone()));

        assert_eq!(flattened.len(), original.len());
        assert!(
            flattened
                .windows(2)
                .all(|w| w[0].bucket_timestamp <= w[1].bucket_timestamp)
        );
        for sensor in ["bedroom", "livingroom"] {
            let before: Vec<_> = original.iter().filter(|p| p.sensor_id == sensor).collect();
            let after: Vec<_> = flattened.iter().filter(|p| p.sensor_id == sensor).collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn groups_events_by_location() {
        let event = |start_timestamp: i64, location_id: &str| Event {
            id: start_timestamp.to_string(),
            start_timestamp,
            end_timestamp: None,
            location_id: location_id.to_string(),
            event_type: "window:open".to_string(),
        };

        let events = group_by_location(vec![
            event(10, "bedroom"),
            event(20, "livingroom"),
            event(30, "bedroom"),
        ]);

        assert_eq!(events["bedroom"].len(), 2);
        assert_eq!(events["bedroom"][1].start_timestamp, 30);
        assert_eq!(events["livingroom"].len(), 1);
    }
}
