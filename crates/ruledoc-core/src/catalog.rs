//! Master rule catalog assembled from discovered assemblies.

use crate::model::{AssemblyDescriptor, RuleDescriptor};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Builder that accumulates assemblies into a [`Catalog`].
///
/// Assemblies are deduplicated by name (first seen wins) and assemblies
/// without rules are dropped.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    assemblies: BTreeMap<String, Arc<AssemblyDescriptor>>,
    rules: BTreeMap<String, Arc<RuleDescriptor>>,
    categories: BTreeSet<String>,
    fixable_ids: BTreeSet<String>,
    first_assembly: Option<String>,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assembly without code fixes.
    #[must_use]
    pub fn assembly(mut self, assembly: AssemblyDescriptor) -> Self {
        self.add_assembly(assembly, std::iter::empty::<String>());
        self
    }

    /// Adds an assembly together with the diagnostic ids its fixers handle.
    ///
    /// Returns `false` if the assembly was skipped, either because an
    /// assembly with the same name was already added or because it has no
    /// rules. Fixable ids of skipped assemblies are discarded.
    pub fn add_assembly<I, S>(&mut self, assembly: AssemblyDescriptor, fixable_ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.assemblies.contains_key(assembly.name()) {
            warn!("Skipping duplicate assembly: {}", assembly.name());
            return false;
        }

        if assembly.is_empty() {
            debug!("Dropping assembly without rules: {}", assembly.name());
            return false;
        }

        for rule in assembly.rules() {
            self.categories.insert(rule.category().to_string());
            self.rules.insert(rule.id().to_string(), Arc::clone(rule));
        }
        self.fixable_ids
            .extend(fixable_ids.into_iter().map(Into::into));

        debug!(
            "Added assembly {} with {} rules",
            assembly.name(),
            assembly.rule_count()
        );

        if self.first_assembly.is_none() {
            self.first_assembly = Some(assembly.name().to_string());
        }
        self.assemblies
            .insert(assembly.name().to_string(), Arc::new(assembly));
        true
    }

    /// Finalizes the catalog.
    #[must_use]
    pub fn build(self) -> Catalog {
        Catalog {
            assemblies: self.assemblies,
            rules: self.rules,
            categories: self.categories,
            fixable_ids: self.fixable_ids,
            first_assembly: self.first_assembly,
        }
    }
}

/// Immutable view of every discovered rule and assembly.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    assemblies: BTreeMap<String, Arc<AssemblyDescriptor>>,
    rules: BTreeMap<String, Arc<RuleDescriptor>>,
    categories: BTreeSet<String>,
    fixable_ids: BTreeSet<String>,
    first_assembly: Option<String>,
}

impl Catalog {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Master rule list in id order. A rule id declared by several
    /// assemblies resolves to the one added last.
    pub fn rules(&self) -> impl Iterator<Item = &Arc<RuleDescriptor>> {
        self.rules.values()
    }

    /// Looks up a rule by id.
    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&Arc<RuleDescriptor>> {
        self.rules.get(id)
    }

    /// Assemblies in name order.
    pub fn assemblies(&self) -> impl Iterator<Item = &Arc<AssemblyDescriptor>> {
        self.assemblies.values()
    }

    /// Distinct categories in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    /// Diagnostic ids that have at least one code fix.
    #[must_use]
    pub fn fixable_ids(&self) -> &BTreeSet<String> {
        &self.fixable_ids
    }

    /// Returns `true` if a code fix exists for the given id.
    #[must_use]
    pub fn has_fix(&self, id: &str) -> bool {
        self.fixable_ids.contains(id)
    }

    /// Name of the first assembly added, used when no output name is given.
    #[must_use]
    pub fn default_name(&self) -> Option<&str> {
        self.first_assembly.as_deref()
    }

    /// Number of distinct rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of retained assemblies.
    #[must_use]
    pub fn assembly_count(&self) -> usize {
        self.assemblies.len()
    }

    /// Returns `true` if no rules were discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
