//! Markdown rule documentation.

use super::{OutputFile, OutputKind, RuleWriter, WriterError};
use crate::model::RuleDescriptor;

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Writes one section per rule of the master list.
#[derive(Debug)]
pub struct DocsWriter {
    file: OutputFile,
    name: String,
    fixable_ids: Arc<BTreeSet<String>>,
}

impl DocsWriter {
    /// Creates a writer titled `name` that will produce `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        fixable_ids: Arc<BTreeSet<String>>,
    ) -> Self {
        Self {
            file: OutputFile::new(path),
            name: name.into(),
            fixable_ids,
        }
    }
}

fn title_case(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Replaces line breaks so a description stays on one Markdown line.
fn inline_breaks(text: &str) -> String {
    text.replace("\r\n", "<br>").replace('\n', "<br>")
}

fn section(rule: &RuleDescriptor, has_fix: bool) -> String {
    let mut text = String::from("## ");
    match rule.help_link() {
        Some(link) => {
            let _ = write!(text, "[{}]({link})", rule.id());
        }
        None => text.push_str(rule.id()),
    }
    let _ = write!(
        text,
        ": {}\n\n{}\n\n|Item|Value|\n|-|-|\n|Category|{}|\n|Enabled|{}|\n|Severity|{}|\n|CodeFix|{}|\n\n",
        rule.title(),
        inline_breaks(rule.description_or_message()),
        rule.category(),
        title_case(rule.is_enabled_by_default()),
        rule.default_severity(),
        title_case(has_fix),
    );
    text
}

#[async_trait]
impl RuleWriter for DocsWriter {
    fn kind(&self) -> OutputKind {
        OutputKind::Markdown
    }

    fn path(&self) -> &Path {
        self.file.path()
    }

    async fn start(&mut self) -> Result<(), WriterError> {
        self.file.open().await
    }

    async fn start_rules(&mut self) -> Result<(), WriterError> {
        let heading = format!("# {}\n\n", self.name);
        self.file.write_str(&heading).await
    }

    async fn rule(&mut self, rule: &Arc<RuleDescriptor>) -> Result<(), WriterError> {
        let text = section(rule, self.fixable_ids.contains(rule.id()));
        self.file.write_str(&text).await
    }

    async fn end(&mut self) -> Result<(), WriterError> {
        self.file.close().await
    }
}
