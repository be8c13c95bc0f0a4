//! Help-link check report.

use super::{OutputFile, OutputKind, RuleWriter, WriterError};
use crate::model::{AssemblyDescriptor, RuleDescriptor};
use crate::probe::{check_help_link, LinkProbe};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Writes one table per assembly listing the rules whose help link is broken.
///
/// Rules with a working link produce no row. Lookup failures become rows and
/// never fail the writer.
pub struct LinkCheckWriter {
    file: OutputFile,
    probe: Arc<dyn LinkProbe>,
}

impl LinkCheckWriter {
    /// Creates a writer that will produce `path` using `probe` for lookups.
    pub fn new(path: impl Into<PathBuf>, probe: Arc<dyn LinkProbe>) -> Self {
        Self {
            file: OutputFile::new(path),
            probe,
        }
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[async_trait]
impl RuleWriter for LinkCheckWriter {
    fn kind(&self) -> OutputKind {
        OutputKind::Checks
    }

    fn path(&self) -> &Path {
        self.file.path()
    }

    async fn start(&mut self) -> Result<(), WriterError> {
        self.file.open().await
    }

    async fn start_assembly(&mut self, assembly: &AssemblyDescriptor) -> Result<(), WriterError> {
        let heading = format!(
            "# {}\n\n|Rule ID|Title|Check|\n|-------|-----|-----|\n",
            assembly.name()
        );
        self.file.write_str(&heading).await
    }

    async fn rule(&mut self, rule: &Arc<RuleDescriptor>) -> Result<(), WriterError> {
        let Err(error) = check_help_link(self.probe.as_ref(), rule.help_link()).await else {
            return Ok(());
        };
        debug!("{}: {error}", rule.id());
        let row = format!(
            "|{}|{}|{}|\n",
            rule.id(),
            cell(rule.title()),
            cell(&error.to_string())
        );
        self.file.write_str(&row).await
    }

    async fn end_assembly(&mut self) -> Result<(), WriterError> {
        self.file.write_str("\n").await
    }

    async fn end(&mut self) -> Result<(), WriterError> {
        self.file.close().await
    }
}
