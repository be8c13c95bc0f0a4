//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# ruledoc configuration

# Logical output name (default: first assembly name)
# name = "Contoso.Analyzers"

# Directory every output is written under
output_dir = "."

# Additionally slice rulesets and config files by these tags
tags = []

# Output kinds to generate
[outputs]
sarif = true
markdown = true
rulesets = false
editorconfig = true
globalconfig = false
msbuild = false
checks = false

# Help-link check settings
[link_check]
timeout_seconds = 30
follow_trailing_slash = true
# user_agent = "Mozilla/5.0 ..."
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("ruledoc.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created ruledoc.toml");
    println!("\nNext steps:");
    println!("  1. Edit ruledoc.toml to choose outputs");
    println!("  2. Run: ruledoc generate manifests/*.toml");

    Ok(())
}
