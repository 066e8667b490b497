//! Metric bindings attached to widgets

use serde::{Deserialize, Serialize};

use crate::color::RgbaColor;

/// Fully qualified reference to a telemetry metric
///
/// All ids at zero is the placeholder used when a widget is created before
/// the user has picked a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualifiedMetric {
    pub metric_id: u32,
    pub array_index: u32,
    pub device_id: u32,
    pub stat_id: u32,
    pub desired_unit_id: u32,
}

impl QualifiedMetric {
    pub fn new(metric_id: u32) -> Self {
        Self {
            metric_id,
            ..Self::default()
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::default()
    }
}

/// Which vertical axis a plotted series is scaled against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AxisAffinity {
    #[default]
    Left,
    Right,
}

/// A widget's binding to one data series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetMetric {
    pub metric: QualifiedMetric,
    pub line_color: RgbaColor,
    pub fill_color: RgbaColor,
    #[serde(default)]
    pub axis_affinity: AxisAffinity,
}

/// Build the binding a new widget starts with
pub fn make_default_widget_metric(metric: Option<QualifiedMetric>) -> WidgetMetric {
    WidgetMetric {
        metric: metric.unwrap_or_default(),
        line_color: RgbaColor::new(0.0, 245.0, 255.0, 1.0),
        fill_color: RgbaColor::new(0.0, 245.0, 255.0, 40.0 / 255.0),
        axis_affinity: AxisAffinity::Left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_widget_metric_uses_placeholder() {
        let binding = make_default_widget_metric(None);
        assert!(binding.metric.is_placeholder());
        assert_eq!(binding.axis_affinity, AxisAffinity::Left);
    }

    #[test]
    fn test_default_widget_metric_keeps_given_metric() {
        let metric = QualifiedMetric {
            metric_id: 12,
            array_index: 1,
            device_id: 3,
            stat_id: 2,
            desired_unit_id: 0,
        };
        let binding = make_default_widget_metric(Some(metric));
        assert_eq!(binding.metric, metric);
        assert!(!binding.metric.is_placeholder());
    }

    #[test]
    fn test_widget_metric_serialization() {
        let binding = make_default_widget_metric(Some(QualifiedMetric::new(7)));
        let json = serde_json::to_string(&binding).unwrap();
        assert!(json.contains("\"metricId\":7"));
        assert!(json.contains("\"axisAffinity\":\"Left\""));

        let parsed: WidgetMetric = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, binding);
    }
}
