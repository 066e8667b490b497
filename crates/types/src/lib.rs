//! loadout-types: Shared data types for loadout widget configuration.
//!
//! This crate contains the pure data types (widget configs, colors, metric
//! bindings, version numbers) that saved loadouts are made of. It has no
//! file or rendering dependencies, making it the foundation layer for the
//! migration and loading code.

pub mod color;
pub mod display_configs;
pub mod error;
pub mod metric;
pub mod version;
pub mod widget;

// Re-export commonly used types at the crate root for convenience
pub use color::RgbaColor;
pub use display_configs::{make_default_graph, GraphConfig, GraphKind, GraphTypeConfig};
pub use error::ConfigError;
pub use metric::{make_default_widget_metric, AxisAffinity, QualifiedMetric, WidgetMetric};
pub use version::{compare_versions, SchemaVersion, VersionError};
pub use widget::{generate_key, WidgetType};
