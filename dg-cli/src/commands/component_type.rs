//! `dg component-type list` and `dg component-type info <typename>`

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use dg_workspace::{list_component_types, load_registry, CachedComponent, DgConfig, DgContext};

#[derive(Subcommand, Debug)]
pub enum ComponentTypeCommand {
    /// List every registered component type.
    List(ListArgs),

    /// Show details for one component type.
    Info(InfoArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Report cache status and show summaries.
    #[arg(long)]
    pub verbose: bool,

    /// Emit machine-readable JSON.
    #[arg(long, conflicts_with = "verbose")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Typename, e.g. `pipes_subprocess_script_collection@dagster_components`.
    pub typename: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: ComponentTypeCommand, config: &DgConfig) -> Result<()> {
    match cmd {
        ComponentTypeCommand::List(args) => args.run(config),
        ComponentTypeCommand::Info(args) => args.run(config),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "component type")]
    typename: String,
    #[tabled(rename = "summary")]
    summary: String,
}

impl ListArgs {
    pub fn run(self, config: &DgConfig) -> Result<()> {
        let cwd = super::current_dir()?;
        let ctx = DgContext::discover_at(&cwd);
        let listing = list_component_types(config, ctx.code_location_root.as_deref())
            .context("failed to load component types")?;

        if self.json {
            return print_json(&listing.components);
        }

        if self.verbose {
            println!("CACHE [{}]", listing.status);
            if listing.components.is_empty() {
                println!("No component types registered.");
                return Ok(());
            }
            let rows: Vec<ComponentRow> = listing
                .components
                .into_iter()
                .map(|c| ComponentRow {
                    typename: c.typename,
                    summary: c.summary.unwrap_or_default(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
            return Ok(());
        }

        for component in &listing.components {
            println!("{}", component.typename);
        }
        Ok(())
    }
}

fn print_json(components: &[CachedComponent]) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(components).context("failed to serialize component types")?
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// info
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ComponentInfoJson<'a> {
    typename: String,
    namespace: &'a str,
    name: &'a str,
    defined_in: &'a str,
    type_name: &'a str,
    metadata: &'a dg_components::Metadata,
}

impl InfoArgs {
    pub fn run(self, config: &DgConfig) -> Result<()> {
        let registry = load_registry(config).context("failed to load component types")?;
        let key = dg_components::ComponentKey::from_typename(&self.typename)
            .map_err(|e| anyhow!("No component type named '{}': {e}", self.typename))?;
        let definition = registry
            .get(&key)
            .map_err(|_| anyhow!("No component type named '{}'", self.typename))?;

        if self.json {
            let payload = ComponentInfoJson {
                typename: key.to_typename(),
                namespace: key.namespace(),
                name: key.name(),
                defined_in: &definition.defined_in,
                type_name: definition.class.type_name,
                metadata: &definition.metadata,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize component type")?
            );
            return Ok(());
        }

        println!("{}", key.to_typename().bold());
        println!("  namespace:  {}", key.namespace());
        println!("  name:       {}", key.name());
        println!("  defined in: {}", definition.defined_in);
        println!("  type:       {}", definition.class.type_name);
        if !definition.metadata.is_empty() {
            println!("  metadata:");
            for (k, v) in &definition.metadata {
                println!("    {k}: {v}");
            }
        }
        Ok(())
    }
}
