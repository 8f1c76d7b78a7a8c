//! ECharts line charts built from aggregated series.

use std::fmt::Write as _;

use serde_json::{Value, json};

use crate::{
    models::{AggregatedPoint, Event},
    series::{LocationEvents, SensorSeries, group_by_location, group_by_sensor},
};

const PAGE_TEMPLATE: &str = include_str!("../templates/graphs.html");
const CHARTS_PLACEHOLDER: &str = "<!-- {{CHARTS}} -->";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Iaq,
    Co2,
    Voc,
    Temperature,
    Humidity,
}

/// Quantities rendered on the graphs page, top to bottom.
pub const CHARTED_QUANTITIES: [Quantity; 5] = [
    Quantity::Co2,
    Quantity::Voc,
    Quantity::Iaq,
    Quantity::Humidity,
    Quantity::Temperature,
];

impl Quantity {
    pub fn title(&self) -> &'static str {
        match self {
            Quantity::Iaq => "IAQ",
            Quantity::Co2 => "CO2",
            Quantity::Voc => "VOC",
            Quantity::Temperature => "Temperature",
            Quantity::Humidity => "Humidity",
        }
    }

    pub fn value(&self, p: &AggregatedPoint) -> f64 {
        match self {
            Quantity::Iaq => p.iaq,
            Quantity::Co2 => p.co2,
            Quantity::Voc => p.voc,
            Quantity::Temperature => p.temperature,
            Quantity::Humidity => p.humidity,
        }
    }
}

/// Time range shown on the x axis, in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAxis {
    pub start_epoch: i64,
    pub end_epoch: i64,
}

fn millis(epoch: i64) -> i64 {
    epoch.saturating_mul(1000)
}

/// Option object for one quantity: a series per sensor in `sensor_ids`
/// order, with the sensor's events as vertical mark lines.
pub fn chart_options(
    quantity: Quantity,
    series: &SensorSeries,
    events: &LocationEvents,
    sensor_ids: &[String],
    axis: TimeAxis,
) -> Value {
    let series: Vec<Value> = sensor_ids
        .iter()
        .map(|sensor_id| {
            let data: Vec<Value> = series
                .get(sensor_id)
                .map(|points| {
                    points
                        .iter()
                        .map(|p| json!([millis(p.bucket_timestamp), quantity.value(p)]))
                        .collect()
                })
                .unwrap_or_default();

            let marks: Vec<Value> = events
                .get(sensor_id)
                .map(|events| {
                    events
                        .iter()
                        .map(|e| json!({ "name": e.event_type, "xAxis": millis(e.start_timestamp) }))
                        .collect()
                })
                .unwrap_or_default();

            json!({
                "name": sensor_id,
                "type": "line",
                "smooth": true,
                "showSymbol": false,
                "data": data,
                "markLine": {
                    "symbol": ["none", "none"],
                    "label": { "show": true, "formatter": "{b}" },
                    "data": marks,
                },
            })
        })
        .collect();

    json!({
        "title": { "text": quantity.title() },
        "animation": false,
        "legend": {},
        "tooltip": { "show": true, "trigger": "axis", "triggerOn": "click" },
        "xAxis": {
            "name": "Time",
            "type": "time",
            "min": millis(axis.start_epoch),
            "max": millis(axis.end_epoch),
        },
        "yAxis": { "type": "value", "scale": true },
        "series": series,
    })
}

/// Embeds chart options into a standalone HTML page.
pub fn render_page(charts: &[Value]) -> String {
    let mut body = String::new();
    for (i, options) in charts.iter().enumerate() {
        // `<` is escaped so that no string inside the options can close the script tag.
        let options = options.to_string().replace('<', "\\u003c");
        let _ = write!(
            body,
            "<div id=\"chart-{i}\" class=\"chart\"></div>\n\
             <script>echarts.init(document.getElementById(\"chart-{i}\")).setOption({options});</script>\n"
        );
    }
    PAGE_TEMPLATE.replace(CHARTS_PLACEHOLDER, &body)
}

/// Graphs page for one resolved range: one chart per charted quantity.
pub fn render_graphs(
    points: Vec<AggregatedPoint>,
    events: Vec<Event>,
    sensor_ids: &[String],
    axis: TimeAxis,
) -> String {
    let series = group_by_sensor(points);
    let events = group_by_location(events);

    let charts: Vec<Value> = CHARTED_QUANTITIES
        .iter()
        .map(|q| chart_options(*q, &series, &events, sensor_ids, axis))
        .collect();

    render_page(&charts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(bucket_timestamp: i64, sensor_id: &str, co2: f64) -> AggregatedPoint {
        AggregatedPoint {
            bucket_timestamp,
            sensor_id: sensor_id.to_string(),
            iaq: 50.0,
            co2,
            voc: 0.5,
            pressure: 100_000.0,
            temperature: 21.5,
            humidity: 45.0,
        }
    }

    fn event(start_timestamp: i64, location_id: &str, event_type: &str) -> Event {
        Event {
            id: "1".to_string(),
            start_timestamp,
            end_timestamp: None,
            location_id: location_id.to_string(),
            event_type: event_type.to_string(),
        }
    }

    fn sensor_ids() -> Vec<String> {
        vec!["livingroom".to_string(), "bedroom".to_string()]
    }

    const AXIS: TimeAxis = TimeAxis {
        start_epoch: 0,
        end_epoch: 3599,
    };

    #[test]
    fn series_follow_display_order_and_carry_values() {
        let series = group_by_sensor(vec![
            point(0, "bedroom", 600.0),
            point(600, "bedroom", 650.0),
            point(0, "livingroom", 500.0),
        ]);

        let options = chart_options(
            Quantity::Co2,
            &series,
            &LocationEvents::new(),
            &sensor_ids(),
            AXIS,
        );

        assert_eq!(options["title"]["text"], "CO2");
        assert_eq!(options["xAxis"]["max"], 3_599_000);
        assert_eq!(options["series"][0]["name"], "livingroom");
        assert_eq!(options["series"][1]["name"], "bedroom");
        assert_eq!(options["series"][1]["data"], json!([[0, 600.0], [600_000, 650.0]]));
    }

    #[test]
    fn sensors_without_points_get_empty_series() {
        let options = chart_options(
            Quantity::Temperature,
            &SensorSeries::new(),
            &LocationEvents::new(),
            &sensor_ids(),
            AXIS,
        );

        assert_eq!(options["series"].as_array().unwrap().len(), 2);
        assert_eq!(options["series"][0]["data"], json!([]));
    }

    #[test]
    fn events_become_mark_lines_on_their_sensor() {
        let events = group_by_location(vec![event(120, "bedroom", "window:open")]);

        let options = chart_options(
            Quantity::Iaq,
            &SensorSeries::new(),
            &events,
            &sensor_ids(),
            AXIS,
        );

        assert_eq!(options["series"][0]["markLine"]["data"], json!([]));
        assert_eq!(
            options["series"][1]["markLine"]["data"],
            json!([{ "name": "window:open", "xAxis": 120_000 }])
        );
    }

    #[test]
    fn page_contains_every_chart_and_escapes_markup() {
        let html = render_graphs(
            vec![point(0, "bedroom", 600.0)],
            vec![event(0, "bedroom", "</script><b>")],
            &sensor_ids(),
            AXIS,
        );

        for q in CHARTED_QUANTITIES {
            assert!(html.contains(&format!("\"text\":\"{}\"", q.title())));
        }
        assert!(html.contains("chart-4"));
        assert!(!html.contains("</script><b>"));
        assert!(!html.contains(CHARTS_PLACEHOLDER));
    }
}
