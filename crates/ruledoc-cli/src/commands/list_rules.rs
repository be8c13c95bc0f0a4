//! List rules command implementation.

use anyhow::{Context, Result};
use ruledoc_core::manifest;

use crate::OutputFormat;

/// Runs the list-rules command.
pub fn run(manifests: &[String], format: OutputFormat) -> Result<()> {
    let catalog = manifest::load_catalog(manifests).context("Failed to load rule manifests")?;
    super::output::print_rules(&catalog, format)
}
