//! Chart Plan
//!
//! Turns the validated payload into what the external chart library needs:
//! a chart type tag, a configuration object and a tooltip label formatter.
//! Charts whose data is too short, or whose drawing surface is missing from
//! the page, are left out of the plan.

pub mod distribution;
pub mod growth;

pub use growth::XAxis;

use serde_json::{json, Value};

use crate::format;
use crate::payload::ChartPayload;

/// Shared text colour for legends and axis titles
pub(crate) const LABEL_COLOR: &str = "#e5e7eb";

/// Which dashboard chart a spec describes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Distribution,
    Growth,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::Distribution, ChartKind::Growth];

    /// Id of the canvas this chart draws on
    pub fn canvas_id(&self) -> &'static str {
        match self {
            ChartKind::Distribution => "distributionChart",
            ChartKind::Growth => "growthChart",
        }
    }

    /// Chart type tag understood by the chart library
    pub fn chart_type(&self) -> &'static str {
        match self {
            ChartKind::Distribution => "doughnut",
            ChartKind::Growth => "line",
        }
    }
}

/// The data point a tooltip is being drawn for
#[derive(Clone, Copy, Debug)]
pub struct TooltipItem<'a> {
    /// Category label (slice name or x value)
    pub label: &'a str,
    pub dataset_label: &'a str,
    pub axis_id: &'a str,
    pub value: Option<f64>,
}

/// How a chart's tooltip lines are worded
#[derive(Clone, Debug, PartialEq)]
pub enum TooltipFormatter {
    /// `"<label>: <share>%"` against the dataset total
    Share { total: f64 },
    /// Dollars on the value axis, percent on the growth axis
    ValueOrGrowth,
}

impl TooltipFormatter {
    pub fn label(&self, item: &TooltipItem<'_>) -> String {
        match self {
            TooltipFormatter::Share { total } => {
                let share = format::share_of_total(item.value.unwrap_or(0.0), *total);
                format!("{}: {}", item.label, format::percent(share))
            }
            TooltipFormatter::ValueOrGrowth => {
                let mut label = String::new();
                if !item.dataset_label.is_empty() {
                    label.push_str(item.dataset_label);
                    label.push_str(": ");
                }
                if let Some(y) = item.value {
                    if item.axis_id == growth::GROWTH_AXIS {
                        label.push_str(&format::percent(y));
                    } else {
                        label.push_str(&format::usd(y));
                    }
                }
                label
            }
        }
    }
}

/// Everything needed to construct one chart
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub data: Value,
    pub options: Value,
    pub tooltip: TooltipFormatter,
}

impl ChartSpec {
    pub fn chart_type(&self) -> &'static str {
        self.kind.chart_type()
    }

    /// The `{type, data, options}` object handed to the chart constructor.
    /// Tooltip callbacks are attached separately by the caller.
    pub fn to_config(&self) -> Value {
        json!({
            "type": self.chart_type(),
            "data": self.data,
            "options": self.options,
        })
    }

    /// Tooltip lines for every point of the first dataset, in order
    #[cfg(test)]
    pub fn preview_tooltips(&self) -> Vec<String> {
        let labels = string_array(&self.data["labels"]);
        let dataset = &self.data["datasets"][0];
        let dataset_label = dataset["label"].as_str().unwrap_or("");
        let axis_id = dataset["yAxisID"].as_str().unwrap_or("");
        let values = dataset["data"].as_array().cloned().unwrap_or_default();

        labels
            .iter()
            .zip(values.iter())
            .map(|(label, value)| {
                self.tooltip.label(&TooltipItem {
                    label,
                    dataset_label,
                    axis_id,
                    value: value.as_f64(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
fn string_array(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|v| v.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// A chart ready to be constructed on its surface
#[derive(Clone, Debug)]
pub struct PlannedChart<S> {
    pub surface: S,
    pub spec: ChartSpec,
}

/// Build the specs for every chart that has enough data.
///
/// `surface` is only consulted for charts whose data qualifies; returning
/// `None` skips that chart.
pub fn plan_charts<S>(
    payload: &ChartPayload,
    x_axis: XAxis,
    mut surface: impl FnMut(ChartKind) -> Option<S>,
) -> Vec<PlannedChart<S>> {
    let mut planned = Vec::with_capacity(ChartKind::ALL.len());

    for kind in ChartKind::ALL {
        let spec = match kind {
            ChartKind::Distribution => distribution::build(&payload.distribution),
            ChartKind::Growth => growth::build(&payload.growth, x_axis),
        };
        let Some(spec) = spec else { continue };
        if let Some(surface) = surface(kind) {
            planned.push(PlannedChart { surface, spec });
        }
    }

    planned
}
