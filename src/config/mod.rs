//! Configuration management

mod loadout;
mod migration;

pub use loadout::{
    default_loadout_path, Loadout, LoadoutError, LoadoutWidget, MigratedLoadout, Signature,
    CURRENT_VERSION, LOADOUT_SIGNATURE_CODE,
};
pub use migration::{
    GraphMigrations, MigrateFn, MigrationError, MigrationRefusal, MigrationRegistry,
    MigrationRule,
};
