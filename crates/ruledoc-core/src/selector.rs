//! Rule selection and severity resolution for configuration outputs.
//!
//! A [`Selector`] decides which rules belong to a configuration context
//! (every rule, one category, or one tag) and supplies the title and
//! description written at the top of each generated file. A
//! [`RulesetVariant`] decides the severity written for a selected rule.

use crate::model::{RuleDescriptor, Severity};

use std::fmt;

/// Severity policy of one generated configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulesetVariant {
    /// Rules keep their default severity; rules disabled by default stay off.
    Default,
    /// Every selected rule is forced on with its default severity.
    Enabled,
    /// Every rule is forced off.
    Disabled,
}

impl RulesetVariant {
    /// Name used in generated file names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }

    /// Resolves the severity written for a selected rule.
    ///
    /// `None` means the rule is written as disabled.
    #[must_use]
    pub fn resolve(self, rule: &RuleDescriptor) -> Option<Severity> {
        match self {
            Self::Default => rule
                .is_enabled_by_default()
                .then_some(rule.default_severity()),
            Self::Enabled => Some(rule.default_severity()),
            Self::Disabled => None,
        }
    }
}

impl fmt::Display for RulesetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration context a generated file is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Every rule is selected.
    All,
    /// Rules whose category equals the context.
    Category(String),
    /// Rules carrying the context as a custom tag.
    Tag(String),
}

impl Selector {
    /// The context value, `None` for [`Selector::All`].
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Category(context) | Self::Tag(context) => Some(context),
        }
    }

    /// Returns `true` if the rule belongs to this context.
    #[must_use]
    pub fn is_selected(&self, rule: &RuleDescriptor) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => rule.category() == category,
            Self::Tag(tag) => rule.has_tag(tag),
        }
    }

    /// File name prefix: `AllRules`, `{Category}Rules` or `{Tag}Rules`.
    #[must_use]
    pub fn file_prefix(&self) -> String {
        match self.context() {
            None => "AllRules".to_string(),
            Some(context) => format!("{context}Rules"),
        }
    }

    /// Human-readable title for a file of the given variant.
    #[must_use]
    pub fn title(&self, variant: RulesetVariant) -> String {
        match (self, variant) {
            (Self::All, RulesetVariant::Default) => "All rules with default severity".to_string(),
            (Self::All, RulesetVariant::Disabled) => "All rules disabled".to_string(),
            (Self::All, RulesetVariant::Enabled) => {
                "All rules Enabled with default severity".to_string()
            }
            (Self::Category(c), RulesetVariant::Default) => {
                format!("Rules in the {c} category with default severity")
            }
            (Self::Category(c), RulesetVariant::Disabled) => {
                format!("Rules in the {c} category disabled")
            }
            (Self::Category(c), RulesetVariant::Enabled) => {
                format!("Rules in the {c} category Enabled with default severity")
            }
            (Self::Tag(t), RulesetVariant::Default) => {
                format!("Rules tagged {t} with default severity")
            }
            (Self::Tag(t), RulesetVariant::Disabled) => format!("Rules tagged {t} disabled"),
            (Self::Tag(t), RulesetVariant::Enabled) => {
                format!("Rules tagged {t} Enabled with default severity")
            }
        }
    }

    /// Human-readable description for a file of the given variant.
    #[must_use]
    pub fn description(&self, variant: RulesetVariant) -> String {
        match (self, variant) {
            (Self::All, RulesetVariant::Default) => {
                "All rules with default severity. Rules with IsEnabledByDefault = false are disabled."
                    .to_string()
            }
            (Self::All, RulesetVariant::Disabled) => "All rules are forced disabled.".to_string(),
            (Self::All, RulesetVariant::Enabled) => {
                "All rules are enabled with default severity. Rules with IsEnabledByDefault = false are force enabled with default severity."
                    .to_string()
            }
            (Self::Category(c), RulesetVariant::Default) => format!(
                "Rules in the {c} category with default severity. Rules with IsEnabledByDefault = false or from a different category are disabled."
            ),
            (Self::Category(c), RulesetVariant::Disabled) => {
                format!("Rules in the {c} category are forced disabled.")
            }
            (Self::Category(c), RulesetVariant::Enabled) => format!(
                "Rules in the {c} category are enabled with default severity. Rules in the {c} category are force enabled with default severity. Rules from a different category are disabled."
            ),
            (Self::Tag(t), RulesetVariant::Default) => format!(
                "Rules tagged {t} with default severity. Rules with IsEnabledByDefault = false are disabled."
            ),
            (Self::Tag(t), RulesetVariant::Disabled) => {
                format!("Rules tagged {t} are forced disabled.")
            }
            (Self::Tag(t), RulesetVariant::Enabled) => format!(
                "Rules tagged {t} are enabled with default severity. Rules tagged {t} are force enabled with default severity. Rules not tagged {t} are disabled."
            ),
        }
    }
}
