//! loadout: graph widget configuration and saved loadout migration
//!
//! This library provides:
//! - The migration registry that upgrades saved widget records between releases
//! - Loading and saving of loadout documents
//! - Re-exports of the shared schema types from `loadout-types`

pub mod config;

// Re-export commonly used types
pub use config::{GraphMigrations, Loadout, MigrationError, MigrationRegistry};
pub use loadout_types::{compare_versions, make_default_graph, GraphConfig, SchemaVersion};
