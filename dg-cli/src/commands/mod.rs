pub mod code_location;
pub mod component_type;
pub mod deployment;

use anyhow::{Context, Result};
use std::path::PathBuf;

pub(crate) fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("cannot determine the current directory")
}
