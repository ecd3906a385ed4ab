//! Portfolio growth line chart
//!
//! Two datasets on two y axes: absolute value in dollars on the left, growth
//! percentage on the right.

use chrono::NaiveDate;
use serde_json::{json, Value};

use super::{ChartKind, ChartSpec, TooltipFormatter, LABEL_COLOR};
use crate::payload::GrowthData;

/// Axis id of the dollar-value dataset
pub const VALUE_AXIS: &str = "y";
/// Axis id of the percentage dataset
pub const GROWTH_AXIS: &str = "y1";

const TICK_COLOR: &str = "#9ca3af";
const GRID_COLOR: &str = "#374151";

/// Time unit for the x axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
        }
    }
}

/// Pick the axis unit from the smallest gap between consecutive dates.
///
/// Series sampled weekly or monthly would otherwise show a tick per day.
/// Labels that are not `YYYY-MM-DD` dates give `Day`.
pub fn infer_time_unit(labels: &[String]) -> TimeUnit {
    let dates: Option<Vec<NaiveDate>> = labels
        .iter()
        .map(|l| NaiveDate::parse_from_str(l, "%Y-%m-%d").ok())
        .collect();
    let Some(dates) = dates else {
        return TimeUnit::Day;
    };

    let min_gap = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .filter(|d| *d > 0)
        .min();

    match min_gap {
        Some(gap) if gap >= 28 => TimeUnit::Month,
        Some(gap) if gap >= 7 => TimeUnit::Week,
        _ => TimeUnit::Day,
    }
}

/// How the dates along the x axis are laid out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XAxis {
    /// Evenly spaced labels; works with the bare chart library
    Category,
    /// Dates placed on a time scale; needs a date adapter module
    Time,
}

fn x_scale(axis: XAxis, labels: &[String]) -> Value {
    let mut scale = json!({
        "type": "category",
        "title": { "display": true, "text": "Date", "color": LABEL_COLOR },
        "ticks": { "color": TICK_COLOR },
        "grid": { "color": GRID_COLOR },
    });
    if axis == XAxis::Time {
        scale["type"] = json!("time");
        scale["time"] = json!({ "unit": infer_time_unit(labels).as_str() });
    }
    scale
}

/// `None` unless there are at least two points
pub fn build(data: &GrowthData, x_axis: XAxis) -> Option<ChartSpec> {
    if !data.is_renderable() {
        return None;
    }

    Some(ChartSpec {
        kind: ChartKind::Growth,
        data: json!({
            "labels": data.labels,
            "datasets": [
                {
                    "label": "Portfolio Value",
                    "data": data.values_abs,
                    "borderColor": "rgb(54, 162, 235)",
                    "backgroundColor": "rgba(54, 162, 235, 0.2)",
                    "fill": true,
                    "yAxisID": VALUE_AXIS,
                },
                {
                    "label": "Growth",
                    "data": data.values_pct,
                    "borderColor": "rgb(255, 99, 132)",
                    "yAxisID": GROWTH_AXIS,
                },
            ],
        }),
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "interaction": { "mode": "index", "intersect": false },
            "plugins": {
                "legend": { "labels": { "color": LABEL_COLOR } },
            },
            "scales": {
                "x": x_scale(x_axis, &data.labels),
                VALUE_AXIS: {
                    "type": "linear",
                    "position": "left",
                    "title": { "display": true, "text": "Value ($)", "color": LABEL_COLOR },
                    "ticks": { "color": TICK_COLOR },
                    "grid": { "color": GRID_COLOR },
                },
                GROWTH_AXIS: {
                    "type": "linear",
                    "position": "right",
                    "title": { "display": true, "text": "Growth (%)", "color": LABEL_COLOR },
                    "ticks": { "color": TICK_COLOR },
                    "grid": { "drawOnChartArea": false },
                },
            },
        }),
        tooltip: TooltipFormatter::ValueOrGrowth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::TooltipItem;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unit_inference() {
        assert_eq!(
            infer_time_unit(&labels(&["2024-01-01", "2024-01-02", "2024-01-04"])),
            TimeUnit::Day
        );
        assert_eq!(
            infer_time_unit(&labels(&["2024-01-01", "2024-01-08", "2024-01-15"])),
            TimeUnit::Week
        );
        assert_eq!(
            infer_time_unit(&labels(&["2023-01-01", "2023-01-31", "2023-03-02"])),
            TimeUnit::Month
        );
        assert_eq!(
            infer_time_unit(&labels(&["Q1", "Q2"])),
            TimeUnit::Day
        );
    }

    #[test]
    fn test_two_points_build() {
        let data = GrowthData {
            labels: labels(&["2024-01-01", "2024-02-01"]),
            values_abs: vec![1000.0, 1234.5],
            values_pct: vec![0.0, 12.345],
        };
        let spec = build(&data, XAxis::Time).unwrap();
        assert_eq!(spec.options["scales"]["x"]["type"], "time");
        assert_eq!(spec.options["scales"]["x"]["time"]["unit"], "month");
        assert_eq!(spec.data["datasets"][1]["yAxisID"], GROWTH_AXIS);
        assert_eq!(spec.data["datasets"][1]["data"], json!([0.0, 12.345]));
    }

    #[test]
    fn test_category_axis_needs_no_adapter() {
        let data = GrowthData {
            labels: labels(&["2024-01-01", "2024-02-01"]),
            values_abs: vec![1000.0, 1234.5],
            values_pct: vec![0.0, 12.345],
        };
        let spec = build(&data, XAxis::Category).unwrap();
        let x = &spec.options["scales"]["x"];
        assert_eq!(x["type"], "category");
        assert!(x.get("time").is_none());
        assert_eq!(x["title"]["text"], "Date");
    }

    #[test]
    fn test_tooltip_by_axis() {
        let formatter = TooltipFormatter::ValueOrGrowth;
        let value = TooltipItem {
            label: "2024-02-01",
            dataset_label: "Portfolio Value",
            axis_id: VALUE_AXIS,
            value: Some(1234.5),
        };
        assert_eq!(formatter.label(&value), "Portfolio Value: $1,234.50");

        let pct = TooltipItem {
            dataset_label: "Growth",
            axis_id: GROWTH_AXIS,
            value: Some(12.345),
            ..value
        };
        assert_eq!(formatter.label(&pct), "Growth: 12.35%");

        let unlabeled = TooltipItem {
            dataset_label: "",
            ..pct
        };
        assert_eq!(formatter.label(&unlabeled), "12.35%");
    }

    #[test]
    fn test_too_short() {
        let data = GrowthData {
            labels: labels(&["2024-01-01"]),
            values_abs: vec![1.0],
            values_pct: vec![0.0],
        };
        assert!(build(&data, XAxis::Category).is_none());
    }
}
