//! `dg code-location scaffold <name>` and `dg code-location list`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use dg_workspace::{
    list_code_locations, scaffold_code_location, CodeLocationOptions, DgConfig, DgContext,
    EditableDagster, Registration, UvProvisioner,
};

#[derive(Subcommand, Debug)]
pub enum CodeLocationCommand {
    /// Create a new code location, inside the current deployment if there is one.
    Scaffold(ScaffoldArgs),

    /// List the code locations of the current deployment.
    List,
}

#[derive(Args, Debug)]
pub struct ScaffoldArgs {
    /// Directory name for the code location; `-` becomes `_` in the package name.
    pub name: String,

    /// Pin dagster packages to a local checkout. Without PATH (or followed by
    /// `--`), the checkout at $DAGSTER_GIT_REPO_DIR is used.
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = "",
    )]
    pub use_editable_dagster: Option<String>,

    /// Do not create a virtual environment for the code location.
    #[arg(long)]
    pub skip_venv: bool,

    /// Leave environment management to the user; implies no venv and no
    /// executable path in workspace.yaml.
    #[arg(long)]
    pub no_use_dg_managed_environment: bool,
}

pub fn run(cmd: CodeLocationCommand, config: &DgConfig) -> Result<()> {
    match cmd {
        CodeLocationCommand::Scaffold(args) => args.run(config),
        CodeLocationCommand::List => list(),
    }
}

impl ScaffoldArgs {
    fn options(&self) -> CodeLocationOptions {
        let editable = match self.use_editable_dagster.as_deref() {
            None => EditableDagster::Off,
            Some("") => EditableDagster::FromEnv,
            Some(path) => EditableDagster::Path(PathBuf::from(path)),
        };
        CodeLocationOptions {
            editable,
            skip_venv: self.skip_venv,
            use_dg_managed_environment: !self.no_use_dg_managed_environment,
        }
    }

    pub fn run(self, config: &DgConfig) -> Result<()> {
        let cwd = super::current_dir()?;
        let ctx = DgContext::discover_at(&cwd);
        let provisioner = UvProvisioner::new(config.uv_bin.clone());

        let report =
            scaffold_code_location(&ctx, &self.name, &self.options(), config, &provisioner)
                .with_context(|| format!("failed to scaffold code location '{}'", self.name))?;

        if let Registration::MissingWorkspaceFile { expected } = &report.registration {
            println!("Expected a workspace.yaml file at {}", expected.display());
        }
        println!(
            "✓ Created code location '{}' at {}",
            report.name,
            report.root.display()
        );
        if report.provisioned {
            println!("  Environment: {}", report.root.join(".venv").display());
        }
        Ok(())
    }
}

fn list() -> Result<()> {
    let cwd = super::current_dir()?;
    let ctx = DgContext::discover_at(&cwd);
    let names = list_code_locations(&ctx).context("failed to list code locations")?;
    for name in names {
        println!("{name}");
    }
    Ok(())
}
