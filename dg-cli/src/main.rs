//! dg: component type registry and project scaffolding CLI.
//!
//! # Usage
//!
//! ```text
//! dg deployment scaffold <name>
//! dg code-location scaffold <name> [--use-editable-dagster [PATH]] [--skip-venv] [--no-use-dg-managed-environment]
//! dg code-location list
//! dg component-type list [--verbose] [--json]
//! dg component-type info <typename>
//! ```
//!
//! Global options: `--cache-dir`, `--disable-cache`, `--entry-points-dir`, `--template-dir`,
//! `--discovery-mode lenient|strict|collect`, `-v` (repeatable).

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};

use commands::{
    code_location::CodeLocationCommand, component_type::ComponentTypeCommand,
    deployment::DeploymentCommand,
};
use dg_components::FailureMode;
use dg_workspace::DgConfig;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "dg",
    version,
    about = "Scaffold Dagster deployments and code locations, and inspect component types",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create deployments.
    Deployment {
        #[command(subcommand)]
        command: DeploymentCommand,
    },

    /// Create and list code locations.
    CodeLocation {
        #[command(subcommand)]
        command: CodeLocationCommand,
    },

    /// Inspect registered component types.
    ComponentType {
        #[command(subcommand)]
        command: ComponentTypeCommand,
    },
}

/// Options accepted by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Root directory for cached component listings [env: DG_CACHE_DIR].
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Never read or write the component listing cache.
    #[arg(long, global = true)]
    pub disable_cache: bool,

    /// Also scan `*.dist-info/entry_points.txt` manifests under DIR [env: DG_ENTRY_POINTS_DIR].
    #[arg(long, global = true, value_name = "DIR")]
    pub entry_points_dir: Option<PathBuf>,

    /// Scaffold templates overriding the built-in ones [env: DG_TEMPLATE_DIR].
    #[arg(long, global = true, value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// How discovery treats packages that fail to load: lenient | strict | collect.
    #[arg(long, global = true, value_name = "MODE")]
    pub discovery_mode: Option<FailureMode>,

    /// Increase log output on stderr (-v info, -vv debug).
    #[arg(short = 'v', long = "log-verbose", global = true, action = ArgAction::Count)]
    pub log_verbosity: u8,
}

impl GlobalArgs {
    /// Environment first, then flags on top.
    pub fn config(&self) -> DgConfig {
        let mut config = DgConfig::from_env();
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = Some(dir.clone());
        }
        if self.disable_cache {
            config.disable_cache = true;
        }
        if let Some(dir) = &self.entry_points_dir {
            config.entry_points_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.template_dir {
            config.template_dir = Some(dir.clone());
        }
        if let Some(mode) = self.discovery_mode {
            config.discovery_mode = mode;
        }
        config
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn init_tracing(verbosity: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.log_verbosity);
    let config = cli.global.config();
    tracing::debug!(?config, "resolved configuration");
    match cli.command {
        Commands::Deployment { command } => commands::deployment::run(command, &config),
        Commands::CodeLocation { command } => commands::code_location::run(command, &config),
        Commands::ComponentType { command } => commands::component_type::run(command, &config),
    }
}
