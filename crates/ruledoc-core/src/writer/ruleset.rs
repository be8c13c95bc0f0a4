//! XML ruleset format.

use super::config::ConfigDialect;
use super::{xml_comment, xml_escape, OutputKind};
use crate::model::{RuleDescriptor, Severity};
use crate::selector::{RulesetVariant, Selector};

/// Code-analysis ruleset (`.ruleset`).
///
/// Every rule group is a `<Rules>` element whose analyzer id and namespace
/// are the logical output name.
#[derive(Debug, Clone)]
pub struct Ruleset {
    name: String,
}

impl Ruleset {
    /// Creates the dialect for the given logical output name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

fn action(severity: Option<Severity>) -> &'static str {
    match severity {
        Some(Severity::Hidden) => "Hidden",
        Some(Severity::Info) => "Info",
        Some(Severity::Warning) => "Warning",
        Some(Severity::Error) => "Error",
        None => "None",
    }
}

impl ConfigDialect for Ruleset {
    fn kind(&self) -> OutputKind {
        OutputKind::Ruleset
    }

    fn header(&self, selector: &Selector, variant: RulesetVariant) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<RuleSet Name=\"{}\" Description=\"{}\" ToolsVersion=\"15.0\">\n",
            xml_escape(&selector.title(variant)),
            xml_escape(&selector.description(variant)),
        )
    }

    fn group_start(&self, label: Option<&str>) -> String {
        let mut text = String::new();
        if let Some(label) = label {
            text.push_str(&format!("  <!--{}-->\n", xml_comment(&format!("{label} rules"))));
        }
        let name = xml_escape(&self.name);
        text.push_str(&format!(
            "  <Rules AnalyzerId=\"{name}\" RuleNamespace=\"{name}\">\n"
        ));
        text
    }

    fn rule(&self, rule: &RuleDescriptor, severity: Option<Severity>) -> String {
        format!(
            "    <!--{}-->\n    <Rule Id=\"{}\" Action=\"{}\" />\n",
            xml_comment(rule.title()),
            xml_escape(rule.id()),
            action(severity),
        )
    }

    fn group_end(&self) -> String {
        "  </Rules>\n".to_string()
    }

    fn footer(&self) -> String {
        "</RuleSet>\n".to_string()
    }
}
