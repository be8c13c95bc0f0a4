//! Rule and assembly descriptors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Default severity of an analyzer rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported to tooling only, never surfaced to the user.
    Hidden,
    /// Informational suggestion.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that breaks the build.
    Error,
}

impl Severity {
    /// Parses a severity name, accepting both the diagnostic vocabulary
    /// (`hidden`, `info`) and the editor-config one (`silent`, `suggestion`).
    ///
    /// Matching is case-insensitive.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hidden" | "silent" => Some(Self::Hidden),
            "info" | "suggestion" | "note" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => write!(f, "Hidden"),
            Self::Info => write!(f, "Info"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Metadata of one static-analysis rule.
///
/// Values are a snapshot taken at discovery time. Once a descriptor is shared
/// through an [`Arc`] it is never mutated again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDescriptor {
    id: String,
    title: String,
    description: String,
    message_format: String,
    category: String,
    default_severity: Severity,
    enabled_by_default: bool,
    tags: Vec<String>,
    help_link: Option<String>,
    type_name: String,
    languages: Vec<String>,
}

impl RuleDescriptor {
    /// Creates a rule that is enabled by default and has no optional metadata.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        default_severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            message_format: String::new(),
            category: category.into(),
            default_severity,
            enabled_by_default: true,
            tags: Vec::new(),
            help_link: None,
            type_name: String::new(),
            languages: Vec::new(),
        }
    }

    /// Sets the long description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the message format used when the description is blank.
    #[must_use]
    pub fn with_message_format(mut self, message_format: impl Into<String>) -> Self {
        self.message_format = message_format.into();
        self
    }

    /// Sets whether the rule is enabled by default.
    #[must_use]
    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.enabled_by_default = enabled;
        self
    }

    /// Adds a custom tag. Duplicate tags are ignored.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Sets the help link.
    #[must_use]
    pub fn with_help_link(mut self, help_link: impl Into<String>) -> Self {
        self.help_link = Some(help_link.into());
        self
    }

    /// Sets the name of the type that reports this rule.
    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Adds an applicable source language. Duplicates are ignored.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        if !self.languages.contains(&language) {
            self.languages.push(language);
        }
        self
    }

    /// Diagnostic id, e.g. `CT1001`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Short title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Long description as declared, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Description, or the message format when the description is blank.
    #[must_use]
    pub fn description_or_message(&self) -> &str {
        if self.description.trim().is_empty() {
            &self.message_format
        } else {
            &self.description
        }
    }

    /// Rule category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Severity the rule reports with when enabled.
    #[must_use]
    pub fn default_severity(&self) -> Severity {
        self.default_severity
    }

    /// Whether the rule is on without explicit configuration.
    #[must_use]
    pub fn is_enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }

    /// Custom tags in declaration order.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns `true` if the rule carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Help link, or `None` when missing or empty.
    #[must_use]
    pub fn help_link(&self) -> Option<&str> {
        self.help_link.as_deref().filter(|link| !link.is_empty())
    }

    /// Owning type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Applicable languages. Empty means every language.
    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }
}

/// One input assembly and the rules it contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyDescriptor {
    name: String,
    version: Option<String>,
    file_version: Option<String>,
    informational_version: Option<String>,
    rules: BTreeMap<String, Arc<RuleDescriptor>>,
}

impl AssemblyDescriptor {
    /// Creates an assembly descriptor with no rules.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            file_version: None,
            informational_version: None,
            rules: BTreeMap::new(),
        }
    }

    /// Sets the four-part file version.
    #[must_use]
    pub fn with_file_version(mut self, file_version: impl Into<String>) -> Self {
        self.file_version = Some(file_version.into()).filter(|v| !v.is_empty());
        self
    }

    /// Sets the informational version and derives the semantic version from it.
    #[must_use]
    pub fn with_informational_version(mut self, informational: impl Into<String>) -> Self {
        let informational = informational.into();
        if informational.is_empty() {
            return self;
        }
        self.version = Some(semantic_version(&informational).to_string());
        self.informational_version = Some(informational);
        self
    }

    /// Adds a rule, replacing any rule with the same id.
    ///
    /// Returns the replaced rule, if any.
    pub fn add_rule(&mut self, rule: RuleDescriptor) -> Option<Arc<RuleDescriptor>> {
        self.rules.insert(rule.id().to_string(), Arc::new(rule))
    }

    /// Builder form of [`Self::add_rule`].
    #[must_use]
    pub fn with_rule(mut self, rule: RuleDescriptor) -> Self {
        self.add_rule(rule);
        self
    }

    /// Assembly name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semantic version without pre-release or build metadata.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Four-part file version.
    #[must_use]
    pub fn file_version(&self) -> Option<&str> {
        self.file_version.as_deref()
    }

    /// Raw informational version.
    #[must_use]
    pub fn informational_version(&self) -> Option<&str> {
        self.informational_version.as_deref()
    }

    /// Rules in id order.
    pub fn rules(&self) -> impl Iterator<Item = &Arc<RuleDescriptor>> {
        self.rules.values()
    }

    /// Number of rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the assembly contributes no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Cuts an informational version at the first `-` or `+`.
fn semantic_version(informational: &str) -> &str {
    informational
        .find(['-', '+'])
        .map_or(informational, |idx| &informational[..idx])
}
