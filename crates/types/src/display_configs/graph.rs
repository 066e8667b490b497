//! Graph widget configuration types

use serde::{Deserialize, Serialize};

use crate::color::RgbaColor;
use crate::error::ConfigError;
use crate::metric::{make_default_widget_metric, QualifiedMetric, WidgetMetric};
use crate::widget::{generate_key, WidgetType};

/// Plot kind, stored as its name
///
/// Names this build does not know are kept in `Other` so a loadout written
/// by a newer release still loads and saves back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum GraphKind {
    #[default]
    Line,
    Histogram,
    Other(String),
}

impl GraphKind {
    pub fn name(&self) -> &str {
        match self {
            GraphKind::Line => "Line",
            GraphKind::Histogram => "Histogram",
            GraphKind::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, GraphKind::Other(_))
    }
}

impl From<String> for GraphKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Line" => GraphKind::Line,
            "Histogram" => GraphKind::Histogram,
            _ => GraphKind::Other(name),
        }
    }
}

impl From<GraphKind> for String {
    fn from(kind: GraphKind) -> Self {
        match kind {
            GraphKind::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

/// Plot parameters for the graph area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphTypeConfig {
    pub name: GraphKind,
    /// Fixed value range of the left axis
    pub range: [f64; 2],
    /// Fixed value range of the right axis
    pub range_right: [f64; 2],
    /// Number of histogram bins
    pub bin_count: u32,
    /// Fixed count range of the histogram axis
    pub count_range: [f64; 2],
    /// Compute the left range from data instead of `range`
    pub auto_left: bool,
    /// Compute the right range from data instead of `range_right`
    pub auto_right: bool,
    /// Compute the count range from data instead of `count_range`
    pub auto_count: bool,
}

impl Default for GraphTypeConfig {
    fn default() -> Self {
        Self {
            name: GraphKind::Line,
            range: [0.0, 150.0],
            range_right: [0.0, 150.0],
            bin_count: 40,
            count_range: [0.0, 1000.0],
            auto_left: true,
            auto_right: true,
            auto_count: false,
        }
    }
}

/// Graph widget configuration as persisted in a loadout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    // Widget identity and bindings
    pub key: String,
    pub metrics: Vec<WidgetMetric>,
    pub widget_type: WidgetType,

    // Geometry
    pub height: f64,
    pub v_divs: u32,
    pub h_divs: u32,
    pub show_bottom_axis: bool,

    pub graph_type: GraphTypeConfig,

    // Appearance
    pub grid_color: RgbaColor,
    pub divider_color: RgbaColor,
    pub background_color: RgbaColor,
    pub border_color: RgbaColor,
    pub text_color: RgbaColor,
    pub text_size: f64,
}

/// Create a graph with every setting at its initial value.
///
/// The single metric binding is built from `metric`, or from the placeholder
/// metric when none is given. Each call allocates a fresh widget key.
pub fn make_default_graph(metric: Option<QualifiedMetric>) -> GraphConfig {
    GraphConfig {
        key: generate_key(),
        metrics: vec![make_default_widget_metric(metric)],
        widget_type: WidgetType::Graph,
        height: 80.0,
        v_divs: 4,
        h_divs: 40,
        show_bottom_axis: false,
        graph_type: GraphTypeConfig::default(),
        grid_color: RgbaColor::from_rgba8(47, 120, 190, 40),
        divider_color: RgbaColor::from_rgba8(57, 126, 150, 220),
        background_color: RgbaColor::TRANSPARENT,
        border_color: RgbaColor::TRANSPARENT,
        text_color: RgbaColor::new(242.0, 242.0, 242.0, 1.0),
        text_size: 11.0,
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        make_default_graph(None)
    }
}

fn check_range(field: &'static str, range: [f64; 2]) -> Result<(), ConfigError> {
    // NaN fails the comparison and is reported as inverted
    if range[0] <= range[1] {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange {
            field,
            lo: range[0],
            hi: range[1],
        })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

impl GraphConfig {
    /// Check the value ranges the renderer relies on.
    ///
    /// Loading and migration do not call this; callers that render or
    /// accept user edits do.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.widget_type != WidgetType::Graph {
            return Err(ConfigError::WrongWidgetType {
                expected: WidgetType::Graph,
                found: self.widget_type,
            });
        }
        check_positive("height", self.height)?;
        check_positive("textSize", self.text_size)?;
        check_range("range", self.graph_type.range)?;
        check_range("rangeRight", self.graph_type.range_right)?;
        check_range("countRange", self.graph_type.count_range)?;

        self.grid_color.validate("gridColor")?;
        self.divider_color.validate("dividerColor")?;
        self.background_color.validate("backgroundColor")?;
        self.border_color.validate("borderColor")?;
        self.text_color.validate("textColor")?;
        for binding in &self.metrics {
            binding.line_color.validate("lineColor")?;
            binding.fill_color.validate("fillColor")?;
        }
        Ok(())
    }
}
