//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to descriptors via the loader.

use serde::Deserialize;

/// Raw TOML representation of one rule manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestDto {
    /// Assembly metadata.
    #[serde(default)]
    pub assembly: AssemblyDto,

    /// Rules the assembly contributes.
    #[serde(default)]
    pub rules: Vec<RuleDto>,

    /// Code fixers the assembly contributes.
    #[serde(default)]
    pub fixers: Vec<FixerDto>,
}

/// TOML representation of the `[assembly]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssemblyDto {
    /// Assembly name (default: the manifest file stem).
    #[serde(default)]
    pub name: Option<String>,
    /// Four-part file version.
    #[serde(default)]
    pub file_version: Option<String>,
    /// Informational version, e.g. `1.2.0-beta.1+abc123`.
    #[serde(default)]
    pub informational_version: Option<String>,
}

/// TOML representation of one `[[rules]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDto {
    /// Diagnostic id.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Message format, used when the description is blank.
    #[serde(default)]
    pub message_format: String,
    /// Rule category.
    pub category: String,
    /// Severity name (default: "warning").
    #[serde(default = "default_severity_str")]
    pub default_severity: String,
    /// Whether the rule is on by default.
    #[serde(default = "default_true")]
    pub enabled_by_default: bool,
    /// Custom tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Help link.
    #[serde(default)]
    pub help_link: Option<String>,
    /// Reporting type name.
    #[serde(default)]
    pub type_name: String,
    /// Applicable languages.
    #[serde(default)]
    pub languages: Vec<String>,
}

/// TOML representation of one `[[fixers]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixerDto {
    /// Fixer type name.
    #[serde(default)]
    pub type_name: String,
    /// Diagnostic ids the fixer handles.
    #[serde(default)]
    pub fixable_ids: Vec<String>,
}

fn default_severity_str() -> String {
    "warning".to_string()
}

fn default_true() -> bool {
    true
}
