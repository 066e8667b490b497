use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use loadout::config::{default_loadout_path, GraphMigrations, Loadout, LoadoutError};
use loadout_types::{make_default_graph, QualifiedMetric, SchemaVersion};
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status used when a loadout is too old to open
const EXIT_NOTICE: u8 = 2;

/// loadout - Inspect and migrate saved widget loadouts
#[derive(Parser, Debug)]
#[command(name = "loadout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0", global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Migrate a saved loadout to the current schema version
    Migrate {
        /// Loadout file (defaults to the loadout in the config directory)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Write the migrated loadout here instead of over the input
        #[arg(short = 'o', long = "output", value_name = "PATH")]
        output: Option<PathBuf>,

        /// Print the migrated loadout instead of writing it
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Print a default graph widget as JSON
    Default {
        /// Bind the graph to this metric id instead of the placeholder
        #[arg(long = "metric-id", value_name = "ID")]
        metric_id: Option<u32>,
    },
    /// List the migrations a loadout saved by VERSION would go through
    Check {
        #[arg(value_name = "VERSION")]
        version: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Level 0 (default): warn only
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("Starting loadout v{}", env!("CARGO_PKG_VERSION"));

    let registry = GraphMigrations::graph();
    match run(cli.command, &registry) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(notice) = e
                .downcast_ref::<LoadoutError>()
                .and_then(LoadoutError::notice_message)
            {
                warn!("Loadout refused: {}", notice);
                eprintln!("{}", notice);
                return ExitCode::from(EXIT_NOTICE);
            }
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, registry: &GraphMigrations) -> Result<()> {
    match command {
        Command::Migrate {
            file,
            output,
            dry_run,
        } => {
            let input = match file {
                Some(path) => path,
                None => default_loadout_path()?,
            };
            let migrated = Loadout::load_from_path(&input, registry)?;
            info!(
                "Applied {} migration(s) to loadout saved by {}",
                migrated.rules_applied, migrated.source_version
            );

            if dry_run {
                println!("{}", migrated.loadout.to_json()?);
                return Ok(());
            }

            let target = output.unwrap_or(input);
            migrated
                .loadout
                .save_to_path(&target)
                .with_context(|| format!("Failed to save migrated loadout to {}", target.display()))?;
            println!(
                "Migrated {} (saved by {}) -> {}",
                target.display(),
                migrated.source_version,
                migrated.loadout.signature.version
            );
        }
        Command::Default { metric_id } => {
            let graph = make_default_graph(metric_id.map(QualifiedMetric::new));
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
        Command::Check { version } => {
            let source: SchemaVersion = version
                .parse()
                .with_context(|| format!("Invalid version '{}'", version))?;
            let pending: Vec<String> = registry
                .pending(&source)
                .map(|rule| rule.version().to_string())
                .collect();
            if pending.is_empty() {
                println!("Loadouts saved by {} need no migration", source);
            } else {
                println!("Loadouts saved by {} go through: {}", source, pending.join(", "));
            }
        }
    }
    Ok(())
}
