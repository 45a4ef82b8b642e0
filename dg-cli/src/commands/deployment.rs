//! `dg deployment scaffold <name>`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use dg_workspace::{scaffold_deployment, DgConfig};

#[derive(Subcommand, Debug)]
pub enum DeploymentCommand {
    /// Create a new deployment directory with an empty workspace.
    Scaffold(ScaffoldArgs),
}

#[derive(Args, Debug)]
pub struct ScaffoldArgs {
    /// Directory name for the deployment.
    pub name: String,
}

pub fn run(cmd: DeploymentCommand, config: &DgConfig) -> Result<()> {
    match cmd {
        DeploymentCommand::Scaffold(args) => args.run(config),
    }
}

impl ScaffoldArgs {
    pub fn run(self, config: &DgConfig) -> Result<()> {
        let cwd = super::current_dir()?;
        scaffold_deployment(&cwd, &self.name, config)
            .with_context(|| format!("failed to scaffold deployment '{}'", self.name))?;
        println!("✓ Created deployment '{}'", self.name);
        Ok(())
    }
}
