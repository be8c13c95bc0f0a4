//! DTO → descriptor conversion with validation.

use crate::model::{AssemblyDescriptor, RuleDescriptor, Severity};

use super::dto::{ManifestDto, RuleDto};
use std::collections::BTreeSet;

/// Errors during DTO → descriptor conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// A rule has an empty id.
    #[error("rules[{index}]: rule id must not be empty")]
    EmptyId {
        /// Position of the rule in the manifest.
        index: usize,
    },

    /// Unknown severity string.
    #[error("rules[{index}]: unknown severity `{value}`, expected: hidden, info, warning, error")]
    UnknownSeverity {
        /// Position of the rule in the manifest.
        index: usize,
        /// The invalid value.
        value: String,
    },

    /// Two rules in one manifest share an id.
    #[error("rules[{index}]: duplicate rule id `{id}`")]
    DuplicateId {
        /// Position of the second occurrence.
        index: usize,
        /// The repeated id.
        id: String,
    },

    /// No assembly name and no file stem to fall back to.
    #[error("assembly name is missing")]
    MissingName,
}

/// A validated manifest: the assembly plus the ids its fixers handle.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    /// Assembly with its rules.
    pub assembly: AssemblyDescriptor,
    /// Diagnostic ids with a code fix.
    pub fixable_ids: BTreeSet<String>,
}

/// Converts a [`ManifestDto`] to descriptors.
///
/// `fallback_name` is used when the manifest declares no assembly name.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: ManifestDto, fallback_name: Option<&str>) -> Result<LoadedManifest, LoadError> {
    let name = dto
        .assembly
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| fallback_name.map(str::to_string))
        .ok_or(LoadError::MissingName)?;

    let mut assembly = AssemblyDescriptor::new(name);
    if let Some(file_version) = dto.assembly.file_version {
        assembly = assembly.with_file_version(file_version);
    }
    if let Some(informational) = dto.assembly.informational_version {
        assembly = assembly.with_informational_version(informational);
    }

    let mut seen = BTreeSet::new();
    for (index, rule) in dto.rules.into_iter().enumerate() {
        let rule = convert_rule(rule, index)?;
        if !seen.insert(rule.id().to_string()) {
            return Err(LoadError::DuplicateId {
                index,
                id: rule.id().to_string(),
            });
        }
        assembly.add_rule(rule);
    }

    let fixable_ids = dto
        .fixers
        .into_iter()
        .flat_map(|f| f.fixable_ids)
        .filter(|id| !id.is_empty())
        .collect();

    Ok(LoadedManifest {
        assembly,
        fixable_ids,
    })
}

fn convert_rule(dto: RuleDto, index: usize) -> Result<RuleDescriptor, LoadError> {
    let id = dto.id.trim();
    if id.is_empty() {
        return Err(LoadError::EmptyId { index });
    }

    let severity =
        Severity::parse(&dto.default_severity).ok_or_else(|| LoadError::UnknownSeverity {
            index,
            value: dto.default_severity.clone(),
        })?;

    let mut rule = RuleDescriptor::new(id, dto.title, dto.category, severity)
        .with_description(dto.description)
        .with_message_format(dto.message_format)
        .enabled_by_default(dto.enabled_by_default)
        .with_type_name(dto.type_name);

    if let Some(link) = dto.help_link {
        rule = rule.with_help_link(link);
    }
    for tag in dto.tags {
        rule = rule.with_tag(tag);
    }
    for language in dto.languages {
        rule = rule.with_language(language);
    }
    Ok(rule)
}
