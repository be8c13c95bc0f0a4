//! Writer protocol and concrete output formats.
//!
//! Every writer consumes the same lifecycle, driven by the pipeline:
//!
//! ```text
//! start → [ start_assembly → [ start_rules → rule* → end_rules ] → end_assembly ]* → end
//! ```
//!
//! Writers registered for the flat traversal never see the assembly steps.
//! Each writer owns exactly one output file, opened on `start` and closed on
//! `end`.

mod config;
mod docs;
mod links;
mod output;
mod props;
mod ruleset;
mod sarif;

pub use config::{ConfigDialect, ConfigWriter, EditorConfig, GlobalConfig};
pub use docs::DocsWriter;
pub use links::LinkCheckWriter;
pub use output::OutputFile;
pub use props::PropsWriter;
pub use ruleset::Ruleset;
pub use sarif::SarifWriter;

use crate::model::{AssemblyDescriptor, RuleDescriptor};

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Output format produced by a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// SARIF interchange report.
    Sarif,
    /// Help-link check report.
    Checks,
    /// Markdown rule documentation.
    Markdown,
    /// MSBuild `.props` manifest.
    MsBuild,
    /// XML ruleset.
    Ruleset,
    /// `.editorconfig` file.
    EditorConfig,
    /// `.globalconfig` file.
    GlobalConfig,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sarif => "sarif",
            Self::Checks => "checks",
            Self::Markdown => "markdown",
            Self::MsBuild => "msbuild",
            Self::Ruleset => "ruleset",
            Self::EditorConfig => "editorconfig",
            Self::GlobalConfig => "globalconfig",
        };
        f.write_str(name)
    }
}

/// A stateful consumer of the rule traversal that produces one file.
///
/// Steps other than [`start`](Self::start), [`rule`](Self::rule) and
/// [`end`](Self::end) default to no-ops.
#[async_trait]
pub trait RuleWriter: Send {
    /// Format this writer produces.
    fn kind(&self) -> OutputKind;

    /// Path of the file this writer owns.
    fn path(&self) -> &Path;

    /// Opens the output file, truncating any previous content.
    async fn start(&mut self) -> Result<(), WriterError>;

    /// Begins one assembly. Only called on per-assembly writers.
    async fn start_assembly(&mut self, _assembly: &AssemblyDescriptor) -> Result<(), WriterError> {
        Ok(())
    }

    /// Begins a rule group.
    async fn start_rules(&mut self) -> Result<(), WriterError> {
        Ok(())
    }

    /// Consumes one rule.
    async fn rule(&mut self, rule: &Arc<RuleDescriptor>) -> Result<(), WriterError>;

    /// Ends the current rule group.
    async fn end_rules(&mut self) -> Result<(), WriterError> {
        Ok(())
    }

    /// Ends the current assembly. Only called on per-assembly writers.
    async fn end_assembly(&mut self) -> Result<(), WriterError> {
        Ok(())
    }

    /// Flushes pending output and closes the file.
    ///
    /// Called even when an earlier step failed, so implementations must
    /// tolerate being ended without having started. A writer that panicked
    /// is not ended.
    async fn end(&mut self) -> Result<(), WriterError>;
}

/// Errors raised while producing an output file.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// IO error creating or writing the file.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// File being written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A step was invoked before `start` opened the file.
    #[error("Writer for {path} used before start")]
    NotStarted {
        /// File the writer owns.
        path: PathBuf,
    },

    /// Serializing a JSON document failed.
    #[error("Failed to serialize {path}: {source}")]
    Json {
        /// File being written.
        path: PathBuf,
        /// Underlying serialization error.
        source: serde_json::Error,
    },
}

/// Escapes text for XML attribute and element content.
fn xml_escape(text: &str) -> std::borrow::Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// Makes text safe inside an XML comment.
fn xml_comment(text: &str) -> String {
    let mut text = text.replace("--", "- -");
    if text.ends_with('-') {
        text.push(' ');
    }
    text
}
