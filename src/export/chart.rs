use serde::Serialize;

use crate::model::DeviceCounts;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBar {
    pub label: &'static str,
    pub value: u32,
    pub color: &'static str,
}

/// Bar-chart data for device quantities. Only the counts are needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceChart {
    pub title: &'static str,
    pub x_axis: &'static str,
    pub y_axis: &'static str,
    pub bars: Vec<ChartBar>,
}

impl DeviceChart {
    pub fn from_counts(counts: &DeviceCounts) -> Self {
        let bar = |label, value, color| ChartBar { label, value, color };
        Self {
            title: "Device Quantities",
            x_axis: "Device Type",
            y_axis: "Quantity",
            bars: vec![
                bar("Smoke", counts.smoke, "#FF0000"),
                bar("Heat", counts.heat, "#9B59B6"),
                bar("Call Points", counts.call_points, "#00B050"),
                bar("Interface", counts.interface_units, "#000000"),
            ],
        }
    }

    pub fn max_value(&self) -> u32 {
        self.bars.iter().map(|b| b.value).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_follows_counts() {
        let chart = DeviceChart::from_counts(&DeviceCounts { smoke: 77, heat: 9, call_points: 13, interface_units: 0 });
        let labels: Vec<_> = chart.bars.iter().map(|b| b.label).collect();
        assert_eq!(labels, ["Smoke", "Heat", "Call Points", "Interface"]);
        assert_eq!(chart.bars[3].value, 0);
        assert_eq!(chart.max_value(), 77);
    }
}
