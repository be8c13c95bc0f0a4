//! ruledoc CLI tool.
//!
//! Usage:
//! ```bash
//! ruledoc generate [OPTIONS] <MANIFESTS>...
//! ruledoc list-rules <MANIFESTS>...
//! ruledoc init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_file;

/// Documentation and configuration generator for analyzer rules
#[derive(Parser)]
#[command(name = "ruledoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate documentation and configuration files
    Generate {
        /// Rule manifest paths or glob patterns
        #[arg(required = true)]
        manifests: Vec<String>,

        /// Logical output name (default: first assembly name)
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also slice configuration files by this tag (can be specified multiple times)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Generate every output kind
        #[arg(short, long)]
        all: bool,

        /// Generate the SARIF report
        #[arg(long)]
        sarif: bool,

        /// Generate Markdown documentation
        #[arg(long)]
        markdown: bool,

        /// Generate rulesets
        #[arg(long)]
        rulesets: bool,

        /// Generate .editorconfig files
        #[arg(long)]
        editorconfig: bool,

        /// Generate .globalconfig files
        #[arg(long)]
        globalconfig: bool,

        /// Generate the MSBuild .props file
        #[arg(long)]
        msbuild: bool,

        /// Generate the help-link check report
        #[arg(long)]
        checks: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List rules found in manifests
    ListRules {
        /// Rule manifest paths or glob patterns
        #[arg(required = true)]
        manifests: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for console summaries.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            manifests,
            name,
            output,
            tags,
            all,
            sarif,
            markdown,
            rulesets,
            editorconfig,
            globalconfig,
            msbuild,
            checks,
            format,
        } => {
            let outputs = if all {
                ruledoc_core::Outputs::all()
            } else {
                ruledoc_core::Outputs {
                    sarif,
                    markdown,
                    rulesets,
                    editorconfig,
                    globalconfig,
                    msbuild,
                    checks,
                }
            };
            let args = commands::generate::GenerateArgs {
                manifests,
                name,
                output,
                tags,
                outputs,
                format,
            };
            commands::generate::run(args, cli.config.as_deref()).await
        }
        Commands::ListRules { manifests, format } => commands::list_rules::run(&manifests, format),
        Commands::Init { force } => commands::init::run(force),
    }
}
