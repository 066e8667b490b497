//! Version-ordered migration of saved widget configurations
//!
//! Each rule is keyed by the software version that introduced a breaking
//! schema change. A record saved under version `S` is brought up to date by
//! applying, oldest first, every rule whose version is newer than `S`.

use loadout_types::{GraphConfig, SchemaVersion, VersionError};
use log::{debug, info, trace, warn};
use std::fmt;
use thiserror::Error;

/// A rule declining to upgrade a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MigrationRefusal {
    pub message: String,
    /// The message is meant for the user, not a bug report
    pub notice: bool,
}

impl MigrationRefusal {
    /// Refusal the caller should show to the user as-is
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            notice: true,
        }
    }

    /// Refusal caused by an unexpected record shape
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            notice: false,
        }
    }
}

/// Error returned from [`MigrationRegistry::migrate`]
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("invalid source version: {0}")]
    InvalidVersion(#[from] VersionError),
    #[error("migration to {version} refused: {refusal}")]
    Refused {
        version: SchemaVersion,
        #[source]
        refusal: MigrationRefusal,
    },
    #[error("record does not match the graph schema: {0}")]
    Record(#[from] serde_json::Error),
}

impl MigrationError {
    /// Whether the error carries a user-facing notice
    pub fn is_notice(&self) -> bool {
        matches!(self, MigrationError::Refused { refusal, .. } if refusal.notice)
    }

    /// Message to show the user, if this error is a notice
    pub fn notice_message(&self) -> Option<&str> {
        match self {
            MigrationError::Refused { refusal, .. } if refusal.notice => {
                Some(refusal.message.as_str())
            }
            _ => None,
        }
    }
}

/// Function that rewrites a record into the shape expected as of a rule's version
pub type MigrateFn<T> = fn(&mut T) -> Result<(), MigrationRefusal>;

/// A schema transformation keyed by the version that requires it
pub struct MigrationRule<T> {
    version: SchemaVersion,
    migrate: MigrateFn<T>,
}

impl<T> MigrationRule<T> {
    pub fn new(version: SchemaVersion, migrate: MigrateFn<T>) -> Self {
        Self { version, migrate }
    }

    pub fn version(&self) -> &SchemaVersion {
        &self.version
    }

    /// Run the transform on `record`
    pub fn apply(&self, record: &mut T) -> Result<(), MigrationRefusal> {
        (self.migrate)(record)
    }
}

impl<T> fmt::Debug for MigrationRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRule")
            .field("version", &self.version)
            .finish()
    }
}

/// Immutable set of migration rules, sorted oldest first
///
/// Build it once at startup and pass it by reference to whatever loads
/// saved records.
pub struct MigrationRegistry<T> {
    rules: Vec<MigrationRule<T>>,
}

impl<T> MigrationRegistry<T> {
    /// Create a registry from rules in any order
    ///
    /// Rules sharing a version keep their relative order.
    pub fn new(rules: impl IntoIterator<Item = MigrationRule<T>>) -> Self {
        let mut rules: Vec<_> = rules.into_iter().collect();
        rules.sort_by(|a, b| a.version.cmp(&b.version));
        Self { rules }
    }

    /// All rules, oldest first
    pub fn rules(&self) -> &[MigrationRule<T>] {
        &self.rules
    }

    /// Version of the newest registered rule
    pub fn latest_version(&self) -> Option<&SchemaVersion> {
        self.rules.last().map(|rule| &rule.version)
    }

    /// Rules that a record saved under `source` still needs, oldest first
    pub fn pending<'a>(
        &'a self,
        source: &'a SchemaVersion,
    ) -> impl Iterator<Item = &'a MigrationRule<T>> + 'a {
        self.rules.iter().filter(move |rule| rule.version > *source)
    }

    /// Upgrade `record`, saved under `source_version`, to the current schema.
    ///
    /// Returns the number of rules applied. A refusing rule stops the run;
    /// changes made by rules before it are kept.
    pub fn migrate(&self, record: &mut T, source_version: &str) -> Result<usize, MigrationError> {
        let source: SchemaVersion = source_version.parse()?;
        self.migrate_from(record, &source)
    }

    /// Same as [`migrate`](Self::migrate) with an already parsed version
    pub fn migrate_from(
        &self,
        record: &mut T,
        source: &SchemaVersion,
    ) -> Result<usize, MigrationError> {
        let mut applied = 0;
        for rule in &self.rules {
            if rule.version <= *source {
                trace!("Skipping migration {} for record saved at {}", rule.version, source);
                continue;
            }

            debug!("Applying migration {} to record saved at {}", rule.version, source);
            if let Err(refusal) = rule.apply(record) {
                warn!(
                    "Migration {} refused record saved at {}: {}",
                    rule.version, source, refusal
                );
                return Err(MigrationError::Refused {
                    version: rule.version.clone(),
                    refusal,
                });
            }
            applied += 1;
        }

        if applied > 0 {
            info!("Migrated record from {} through {} rule(s)", source, applied);
        }
        Ok(applied)
    }
}

impl<T> fmt::Debug for MigrationRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRegistry")
            .field("rules", &self.rules)
            .finish()
    }
}

/// Migrations for saved graph widgets
///
/// Rules run on the persisted JSON form of a graph, so they can refuse or
/// restructure records whose layout no longer decodes as [`GraphConfig`].
pub type GraphMigrations = MigrationRegistry<serde_json::Value>;

impl MigrationRegistry<serde_json::Value> {
    /// The graph migrations shipped with this release
    pub fn graph() -> Self {
        Self::new([MigrationRule::new(
            SchemaVersion::new(vec![0, 13, 0]),
            refuse_before_0_13 as MigrateFn<serde_json::Value>,
        )])
    }

    /// Upgrade a decoded graph saved under `source_version`
    pub fn migrate_graph(
        &self,
        graph: &mut GraphConfig,
        source_version: &str,
    ) -> Result<usize, MigrationError> {
        let source: SchemaVersion = source_version.parse()?;
        self.migrate_graph_from(graph, &source)
    }

    /// Same as [`migrate_graph`](Self::migrate_graph) with an already parsed version
    ///
    /// Changes made by rules before a refusal are written back when the
    /// record still decodes.
    pub fn migrate_graph_from(
        &self,
        graph: &mut GraphConfig,
        source: &SchemaVersion,
    ) -> Result<usize, MigrationError> {
        let mut record = serde_json::to_value(&*graph)?;
        match self.migrate_from(&mut record, source) {
            Ok(applied) => {
                *graph = serde_json::from_value(record)?;
                Ok(applied)
            }
            Err(e) => {
                if let Ok(partial) = serde_json::from_value(record) {
                    *graph = partial;
                }
                Err(e)
            }
        }
    }
}

/// Records older than 0.13.0 use a layout that cannot be converted
fn refuse_before_0_13(_graph: &mut serde_json::Value) -> Result<(), MigrationRefusal> {
    Err(MigrationRefusal::notice(
        "Cannot migrate loadouts below version 0.13.0",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadout_types::make_default_graph;
    use serde_json::json;

    type Trail = Vec<&'static str>;

    fn push_a(trail: &mut Trail) -> Result<(), MigrationRefusal> {
        trail.push("0.10.0");
        Ok(())
    }

    fn push_b(trail: &mut Trail) -> Result<(), MigrationRefusal> {
        trail.push("0.11.0");
        Ok(())
    }

    fn push_c(trail: &mut Trail) -> Result<(), MigrationRefusal> {
        trail.push("0.11.2");
        Ok(())
    }

    fn push_first(trail: &mut Trail) -> Result<(), MigrationRefusal> {
        trail.push("first");
        Ok(())
    }

    fn push_second(trail: &mut Trail) -> Result<(), MigrationRefusal> {
        trail.push("second");
        Ok(())
    }

    fn refuse(trail: &mut Trail) -> Result<(), MigrationRefusal> {
        trail.push("refused");
        Err(MigrationRefusal::internal("unexpected layout"))
    }

    fn rule(version: &str, migrate: MigrateFn<Trail>) -> MigrationRule<Trail> {
        MigrationRule::new(version.parse().unwrap(), migrate)
    }

    /// Rules registered newest first
    fn trail_registry() -> MigrationRegistry<Trail> {
        MigrationRegistry::new([
            rule("0.11.2", push_c),
            rule("0.10.0", push_a),
            rule("0.11", push_b),
        ])
    }

    #[test]
    fn test_rules_apply_in_version_order() {
        let registry = trail_registry();
        let mut trail = Trail::new();
        let applied = registry.migrate(&mut trail, "0.9.5").unwrap();
        assert_eq!(applied, 3);
        assert_eq!(trail, ["0.10.0", "0.11.0", "0.11.2"]);
    }

    #[test]
    fn test_equal_versions_keep_registration_order() {
        let registry = MigrationRegistry::new([
            rule("0.11", push_first),
            rule("0.12.0", push_c),
            rule("0.10.0", push_a),
            rule("0.11.0", push_second),
        ]);
        let mut trail = Trail::new();
        assert_eq!(registry.migrate(&mut trail, "0.9.0").unwrap(), 4);
        assert_eq!(trail, ["0.10.0", "first", "second", "0.11.2"]);

        let registry = MigrationRegistry::new([
            rule("0.11.0", push_second),
            rule("0.11", push_first),
        ]);
        let mut trail = Trail::new();
        registry.migrate(&mut trail, "0.10.0").unwrap();
        assert_eq!(trail, ["second", "first"]);
    }

    #[test]
    fn test_only_newer_rules_apply() {
        let registry = trail_registry();

        let mut trail = Trail::new();
        assert_eq!(registry.migrate(&mut trail, "0.10.0").unwrap(), 2);
        assert_eq!(trail, ["0.11.0", "0.11.2"]);

        let mut trail = Trail::new();
        assert_eq!(registry.migrate(&mut trail, "0.11.1").unwrap(), 1);
        assert_eq!(trail, ["0.11.2"]);

        let source: SchemaVersion = "0.10.5".parse().unwrap();
        let pending: Vec<String> = registry
            .pending(&source)
            .map(|rule| rule.version().to_string())
            .collect();
        assert_eq!(pending, ["0.11", "0.11.2"]);
    }

    #[test]
    fn test_latest_version_is_a_no_op() {
        let registry = trail_registry();
        assert_eq!(registry.latest_version().unwrap().to_string(), "0.11.2");

        let mut trail = Trail::new();
        registry.migrate(&mut trail, "0.9.0").unwrap();
        let latest = registry.latest_version().unwrap().to_string();
        assert_eq!(registry.migrate(&mut trail, &latest).unwrap(), 0);
        assert_eq!(trail.len(), 3);

        // Newer than every rule
        assert_eq!(registry.migrate(&mut trail, "2.0.0").unwrap(), 0);
        assert_eq!(trail.len(), 3);
    }

    #[test]
    fn test_refusal_halts_without_rollback() {
        let registry = MigrationRegistry::new([
            rule("0.12.0", refuse),
            rule("0.10.0", push_a),
            rule("0.13.0", push_c),
        ]);
        let mut trail = Trail::new();
        let err = registry.migrate(&mut trail, "0.1.0").unwrap_err();

        assert_eq!(trail, ["0.10.0", "refused"]);
        assert!(!err.is_notice());
        assert!(err.notice_message().is_none());
        match err {
            MigrationError::Refused { version, refusal } => {
                assert_eq!(version.to_string(), "0.12.0");
                assert_eq!(refusal.message, "unexpected layout");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_source_version_is_rejected() {
        let registry = trail_registry();
        let mut trail = Trail::new();
        for source in ["", "abc", "0..1", "0.1.x"] {
            let err = registry.migrate(&mut trail, source).unwrap_err();
            assert!(matches!(err, MigrationError::InvalidVersion(_)));
        }
        assert!(trail.is_empty());
    }

    #[test]
    fn test_empty_registry() {
        let registry: MigrationRegistry<Trail> = MigrationRegistry::new([]);
        assert!(registry.latest_version().is_none());
        let mut trail = Trail::new();
        assert_eq!(registry.migrate(&mut trail, "0.0.1").unwrap(), 0);
    }

    #[test]
    fn test_graph_rejects_records_before_0_13() {
        let registry = GraphMigrations::graph();
        let mut graph = make_default_graph(None);
        let before = graph.clone();

        let err = registry.migrate_graph(&mut graph, "0.12.0").unwrap_err();
        assert!(err.is_notice());
        assert_eq!(
            err.notice_message(),
            Some("Cannot migrate loadouts below version 0.13.0")
        );
        assert_eq!(graph, before);
    }

    #[test]
    fn test_graph_refuses_old_layout_before_decoding() {
        let registry = GraphMigrations::graph();
        // Pre-0.13 graphs had no graphType block
        let mut record = json!({ "widgetType": "Graph", "height": 80, "vDivs": 4 });
        let before = record.clone();

        let err = registry.migrate(&mut record, "0.12.0").unwrap_err();
        assert!(err.is_notice());
        assert_eq!(record, before);
    }

    #[test]
    fn test_graph_accepts_records_from_0_13_on() {
        let registry = GraphMigrations::graph();
        let mut graph = make_default_graph(None);
        let before = graph.clone();

        for source in ["0.13.0", "0.13", "0.13.1", "0.14.0", "1.0.0"] {
            assert_eq!(registry.migrate_graph(&mut graph, source).unwrap(), 0);
        }
        assert_eq!(graph, before);
    }

    #[test]
    fn test_graph_prerelease_of_0_13_is_too_old() {
        let registry = GraphMigrations::graph();
        let mut graph = make_default_graph(None);
        let err = registry.migrate_graph(&mut graph, "0.13.0-beta.1").unwrap_err();
        assert!(err.is_notice());

        let err = registry.migrate_graph(&mut graph, "0.x").unwrap_err();
        assert!(matches!(err, MigrationError::InvalidVersion(_)));
    }
}
