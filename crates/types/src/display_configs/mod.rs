//! Display configuration types for widget variants

pub mod graph;

pub use graph::{make_default_graph, GraphConfig, GraphKind, GraphTypeConfig};
