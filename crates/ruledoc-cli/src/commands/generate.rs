//! Generate command implementation.

use anyhow::{Context, Result};
use ruledoc_core::{manifest, Config, Outputs, Pipeline};
use std::path::{Path, PathBuf};

use crate::config_file;
use crate::OutputFormat;

/// Command-line values for `generate`.
pub struct GenerateArgs {
    /// Manifest paths or patterns.
    pub manifests: Vec<String>,
    /// Logical output name override.
    pub name: Option<String>,
    /// Output directory override.
    pub output: Option<PathBuf>,
    /// Tags replacing the configured ones when non-empty.
    pub tags: Vec<String>,
    /// Output kinds turned on by flags.
    pub outputs: Outputs,
    /// Console format.
    pub format: OutputFormat,
}

/// Applies command-line values on top of the file configuration.
fn merge(mut config: Config, args: &GenerateArgs) -> Config {
    if let Some(name) = &args.name {
        config.name = Some(name.clone());
    }
    if let Some(output) = &args.output {
        config.output_dir.clone_from(output);
    }
    if !args.tags.is_empty() {
        config.tags.clone_from(&args.tags);
    }
    config.outputs = config.outputs.union(args.outputs);
    config
}

/// Runs the generate command.
pub async fn run(args: GenerateArgs, config_path: Option<&Path>) -> Result<()> {
    let loaded = config_file::load(config_path)?;
    tracing::debug!("Configuration from {}", loaded.origin);
    let config = merge(loaded.config, &args);

    let catalog =
        manifest::load_catalog(&args.manifests).context("Failed to load rule manifests")?;
    tracing::info!(
        "Loaded {} rules from {} assemblies",
        catalog.rule_count(),
        catalog.assembly_count()
    );

    let pipeline = Pipeline::builder()
        .catalog(catalog)
        .config(config)
        .build()
        .context("Failed to set up pipeline")?;

    let summary = pipeline.run().await.context("Generation failed")?;

    super::output::print_summary(&summary, args.format)
}
