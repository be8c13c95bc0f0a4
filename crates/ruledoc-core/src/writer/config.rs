//! Configuration-style writers with two-pass rule emission.
//!
//! A configuration file lists every known rule exactly once. Rules the
//! selector admits are written as they arrive with the severity resolved by
//! the variant. The rest are deferred and written disabled in a trailing
//! "Other rules" group when the selected group ends.

use super::{OutputFile, OutputKind, RuleWriter, WriterError};
use crate::model::{RuleDescriptor, Severity};
use crate::selector::{RulesetVariant, Selector};

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Text framing of one configuration format.
///
/// Implementations only render strings; the [`ConfigWriter`] owns the file
/// and the selection state.
pub trait ConfigDialect: Send + Sync {
    /// Format produced.
    fn kind(&self) -> OutputKind;

    /// Text written right after the file is opened.
    fn header(&self, selector: &Selector, variant: RulesetVariant) -> String;

    /// Opens a rule group. `label` is the context of the selected group or
    /// `Other` for the deferred one, and `None` when the selector has no
    /// context.
    fn group_start(&self, label: Option<&str>) -> String;

    /// One rule with its resolved severity, `None` meaning disabled.
    fn rule(&self, rule: &RuleDescriptor, severity: Option<Severity>) -> String;

    /// Closes a rule group.
    fn group_end(&self) -> String {
        String::new()
    }

    /// Written between the selected group and the deferred group.
    fn separator(&self) -> String {
        String::new()
    }

    /// Text written right before the file is closed.
    fn footer(&self) -> String {
        String::new()
    }
}

/// Outcome of offering a rule to [`TwoPass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    /// Write now with this severity.
    Emit(Option<Severity>),
    /// Held back for the "Other rules" group.
    Deferred,
}

/// Selection state shared by every configuration format.
#[derive(Debug)]
struct TwoPass {
    selector: Selector,
    variant: RulesetVariant,
    deferred: Vec<Arc<RuleDescriptor>>,
}

impl TwoPass {
    fn new(selector: Selector, variant: RulesetVariant) -> Self {
        Self {
            selector,
            variant,
            deferred: Vec::new(),
        }
    }

    fn admit(&mut self, rule: &Arc<RuleDescriptor>) -> Admission {
        if self.selector.is_selected(rule) {
            Admission::Emit(self.variant.resolve(rule))
        } else {
            self.deferred.push(Arc::clone(rule));
            Admission::Deferred
        }
    }

    fn reset(&mut self) {
        self.deferred.clear();
    }

    fn take_deferred(&mut self) -> Vec<Arc<RuleDescriptor>> {
        std::mem::take(&mut self.deferred)
    }

    fn selected_label(&self) -> Option<&str> {
        self.selector.context()
    }

    fn other_label(&self) -> Option<&'static str> {
        self.selector.context().map(|_| "Other")
    }
}

/// Writer for one (selector, variant) configuration file.
pub struct ConfigWriter<D> {
    dialect: D,
    file: OutputFile,
    pass: TwoPass,
    group_open: bool,
}

impl<D: ConfigDialect> ConfigWriter<D> {
    /// Creates a writer that will produce `path`.
    pub fn new(
        dialect: D,
        path: impl Into<std::path::PathBuf>,
        selector: Selector,
        variant: RulesetVariant,
    ) -> Self {
        Self {
            dialect,
            file: OutputFile::new(path),
            pass: TwoPass::new(selector, variant),
            group_open: false,
        }
    }
}

#[async_trait]
impl<D: ConfigDialect> RuleWriter for ConfigWriter<D> {
    fn kind(&self) -> OutputKind {
        self.dialect.kind()
    }

    fn path(&self) -> &Path {
        self.file.path()
    }

    async fn start(&mut self) -> Result<(), WriterError> {
        self.file.open().await?;
        let header = self
            .dialect
            .header(&self.pass.selector, self.pass.variant);
        self.file.write_str(&header).await
    }

    async fn start_rules(&mut self) -> Result<(), WriterError> {
        self.pass.reset();
        let text = self.dialect.group_start(self.pass.selected_label());
        self.file.write_str(&text).await?;
        self.group_open = true;
        Ok(())
    }

    async fn rule(&mut self, rule: &Arc<RuleDescriptor>) -> Result<(), WriterError> {
        match self.pass.admit(rule) {
            Admission::Emit(severity) => {
                let text = self.dialect.rule(rule, severity);
                self.file.write_str(&text).await
            }
            Admission::Deferred => Ok(()),
        }
    }

    async fn end_rules(&mut self) -> Result<(), WriterError> {
        if !self.group_open {
            return Ok(());
        }
        self.group_open = false;

        let mut text = self.dialect.group_end();
        let deferred = self.pass.take_deferred();
        if !deferred.is_empty() {
            text.push_str(&self.dialect.separator());
            text.push_str(&self.dialect.group_start(self.pass.other_label()));
            for rule in &deferred {
                text.push_str(&self.dialect.rule(rule, None));
            }
            text.push_str(&self.dialect.group_end());
        }
        self.file.write_str(&text).await
    }

    async fn end(&mut self) -> Result<(), WriterError> {
        if !self.file.is_open() {
            return Ok(());
        }
        self.end_rules().await?;
        let footer = self.dialect.footer();
        self.file.write_str(&footer).await?;
        self.file.close().await
    }
}

/// Severity token of the `key = value` formats.
fn ini_severity(severity: Option<Severity>) -> &'static str {
    match severity {
        Some(Severity::Hidden) => "silent",
        Some(Severity::Info) => "suggestion",
        Some(Severity::Warning) => "warning",
        Some(Severity::Error) => "error",
        None => "none",
    }
}

fn ini_header(note: &str, section: &str, selector: &Selector, variant: RulesetVariant) -> String {
    format!(
        "{note}\n\n# {}\n# Description: {}\n\n{section}\n\n",
        selector.title(variant),
        selector.description(variant),
    )
}

fn ini_group_start(label: Option<&str>) -> String {
    label.map_or_else(String::new, |label| format!("# {label} rules\n"))
}

fn ini_rule(rule: &RuleDescriptor, severity: Option<Severity>) -> String {
    format!(
        "\n# {id}: {title}\ndotnet_diagnostic.{id}.severity = {token}\n",
        id = rule.id(),
        title = rule.title(),
        token = ini_severity(severity),
    )
}

/// `.editorconfig` format scoped to C# and Visual Basic files.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorConfig;

impl ConfigDialect for EditorConfig {
    fn kind(&self) -> OutputKind {
        OutputKind::EditorConfig
    }

    fn header(&self, selector: &Selector, variant: RulesetVariant) -> String {
        ini_header(
            "# NOTE: Requires **VS2019 16.3** or later",
            "# Code files\n[*.{cs,vb}]",
            selector,
            variant,
        )
    }

    fn group_start(&self, label: Option<&str>) -> String {
        ini_group_start(label)
    }

    fn rule(&self, rule: &RuleDescriptor, severity: Option<Severity>) -> String {
        ini_rule(rule, severity)
    }

    fn separator(&self) -> String {
        "\n\n\n".to_string()
    }
}

/// `.globalconfig` format with the lowest global level.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalConfig;

impl ConfigDialect for GlobalConfig {
    fn kind(&self) -> OutputKind {
        OutputKind::GlobalConfig
    }

    fn header(&self, selector: &Selector, variant: RulesetVariant) -> String {
        ini_header(
            "# NOTE: Requires **VS2019 16.7** or later",
            "is_global = true\nglobal_level = -1",
            selector,
            variant,
        )
    }

    fn group_start(&self, label: Option<&str>) -> String {
        ini_group_start(label)
    }

    fn rule(&self, rule: &RuleDescriptor, severity: Option<Severity>) -> String {
        ini_rule(rule, severity)
    }

    fn separator(&self) -> String {
        "\n\n\n".to_string()
    }
}
