//! Asset distribution doughnut

use serde_json::json;

use super::{ChartKind, ChartSpec, TooltipFormatter, LABEL_COLOR};
use crate::payload::DistributionData;

/// Slice colours, cycled by the chart library when there are more holdings
const SLICE_COLORS: [&str; 8] = [
    "rgba(153, 102, 255, 0.7)",
    "rgba(255, 159, 64, 0.7)",
    "rgba(46, 204, 113, 0.7)",
    "rgba(255, 205, 86, 0.7)",
    "rgba(241, 196, 15, 0.7)",
    "rgba(26, 188, 156, 0.7)",
    "rgba(142, 68, 173, 0.7)",
    "rgba(230, 126, 34, 0.7)",
];

const BORDER_COLOR: &str = "#111827";

/// `None` when there are no holdings to draw
pub fn build(data: &DistributionData) -> Option<ChartSpec> {
    if !data.is_renderable() {
        return None;
    }

    Some(ChartSpec {
        kind: ChartKind::Distribution,
        data: json!({
            "labels": data.labels,
            "datasets": [{
                "data": data.values,
                "backgroundColor": SLICE_COLORS,
                "borderColor": BORDER_COLOR,
                "borderWidth": 2,
            }],
        }),
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": {
                "legend": { "labels": { "color": LABEL_COLOR } },
            },
        }),
        tooltip: TooltipFormatter::Share {
            total: data.total(),
        },
    })
}
