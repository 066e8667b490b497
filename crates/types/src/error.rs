//! Validation errors for widget configuration values

use thiserror::Error;

use crate::widget::WidgetType;

/// A configuration value outside the range the renderer can draw
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} range is inverted: [{lo}, {hi}]")]
    InvertedRange {
        field: &'static str,
        lo: f64,
        hi: f64,
    },
    #[error("{field} color channel '{channel}' out of range: {value}")]
    ColorChannel {
        field: &'static str,
        channel: &'static str,
        value: f64,
    },
    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("expected a {expected:?} widget, found {found:?}")]
    WrongWidgetType {
        expected: WidgetType,
        found: WidgetType,
    },
}
