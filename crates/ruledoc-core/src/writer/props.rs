//! MSBuild `.props` manifest listing every rule id.

use super::{xml_escape, OutputFile, OutputKind, RuleWriter, WriterError};
use crate::model::RuleDescriptor;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const COMMENT: &str = "  <!--
    This property group prevents the rule ids implemented in this package to be bumped to errors when
    the 'CodeAnalysisTreatWarningsAsErrors' = 'false'.
  -->";

const WARNINGS_NOT_AS_ERRORS: &str = "    <WarningsNotAsErrors Condition=\"'$(CodeAnalysisTreatWarningsAsErrors)' == 'false'\">$(WarningsNotAsErrors);$(CodeAnalysisRuleIds)</WarningsNotAsErrors>";

/// Collects rule ids and writes them as a single property on `end`.
#[derive(Debug)]
pub struct PropsWriter {
    file: OutputFile,
    ids: Vec<String>,
}

impl PropsWriter {
    /// Creates a writer that will produce `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: OutputFile::new(path),
            ids: Vec::new(),
        }
    }

    fn render(&self) -> String {
        format!(
            "<Project>\n{COMMENT}\n  <PropertyGroup>\n    <CodeAnalysisRuleIds>{}</CodeAnalysisRuleIds>\n{WARNINGS_NOT_AS_ERRORS}\n  </PropertyGroup>\n</Project>\n",
            xml_escape(&self.ids.join(";")),
        )
    }
}

#[async_trait]
impl RuleWriter for PropsWriter {
    fn kind(&self) -> OutputKind {
        OutputKind::MsBuild
    }

    fn path(&self) -> &Path {
        self.file.path()
    }

    async fn start(&mut self) -> Result<(), WriterError> {
        self.ids.clear();
        self.file.open().await
    }

    async fn rule(&mut self, rule: &Arc<RuleDescriptor>) -> Result<(), WriterError> {
        self.ids.push(rule.id().to_string());
        Ok(())
    }

    async fn end(&mut self) -> Result<(), WriterError> {
        if !self.file.is_open() {
            return Ok(());
        }
        let text = self.render();
        self.file.write_str(&text).await?;
        self.file.close().await
    }
}
