//! Orchestration: output planning and the concurrent writer fan-out.
//!
//! # Architecture
//!
//! ```text
//! Catalog + Config
//!   ↓ OutputPlan::new()
//! WriterSpec list (per-assembly / flat)
//!   ↓ create writers
//! two Fanouts ── tokio::join! ──┐
//!   per-assembly: start → (assembly → rules → rule*)* → end
//!   flat:         start → rules → rule* → end
//!   ↓
//! RunSummary
//! ```
//!
//! Every lifecycle step is sent to all writers of a traversal at once and
//! awaited as a barrier before the next step starts.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::model::{AssemblyDescriptor, RuleDescriptor};
use crate::probe::{HttpLinkProbe, LinkProbe};
use crate::selector::{RulesetVariant, Selector};
use crate::writer::{
    ConfigWriter, DocsWriter, EditorConfig, GlobalConfig, LinkCheckWriter, OutputKind,
    PropsWriter, RuleWriter, Ruleset, SarifWriter, WriterError,
};

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Name used when neither the configuration nor the catalog supplies one.
const FALLBACK_NAME: &str = "Analyzers";

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No catalog was given to the builder.
    #[error("Pipeline requires a catalog")]
    MissingCatalog,

    /// The HTTP client for link checks could not be built.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A writer failed.
    #[error(transparent)]
    Writer(#[from] WriterError),

    /// A writer task panicked or was cancelled.
    #[error("Writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Which traversal drives a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Assemblies in name order, each with its own rules.
    PerAssembly,
    /// The master rule list in id order.
    Flat,
}

/// Selection scope of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Rules the file is about.
    pub selector: Selector,
    /// Severity policy.
    pub variant: RulesetVariant,
}

/// What a planned writer produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// SARIF report.
    Sarif,
    /// Help-link check report.
    Checks,
    /// Markdown documentation.
    Markdown,
    /// MSBuild manifest.
    MsBuild,
    /// XML ruleset for one scope.
    Ruleset(Scope),
    /// `.editorconfig` for one scope.
    EditorConfig(Scope),
    /// `.globalconfig` for one scope.
    GlobalConfig(Scope),
}

impl Target {
    /// Output format.
    #[must_use]
    pub fn kind(&self) -> OutputKind {
        match self {
            Self::Sarif => OutputKind::Sarif,
            Self::Checks => OutputKind::Checks,
            Self::Markdown => OutputKind::Markdown,
            Self::MsBuild => OutputKind::MsBuild,
            Self::Ruleset(_) => OutputKind::Ruleset,
            Self::EditorConfig(_) => OutputKind::EditorConfig,
            Self::GlobalConfig(_) => OutputKind::GlobalConfig,
        }
    }

    /// Traversal that drives this output.
    #[must_use]
    pub fn traversal(&self) -> Traversal {
        match self {
            Self::Sarif | Self::Checks => Traversal::PerAssembly,
            _ => Traversal::Flat,
        }
    }
}

/// One planned output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterSpec {
    /// What to produce.
    pub target: Target,
    /// Where to write it.
    pub path: PathBuf,
}

/// Every output file a run will produce, computed without touching the disk.
#[derive(Debug, Clone, Default)]
pub struct OutputPlan {
    name: String,
    specs: Vec<WriterSpec>,
}

impl OutputPlan {
    /// Plans the outputs requested by `config` for `catalog`.
    #[must_use]
    pub fn new(catalog: &Catalog, config: &Config) -> Self {
        let name = config
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| catalog.default_name().map(str::to_string))
            .unwrap_or_else(|| FALLBACK_NAME.to_string());
        let root = config.output_dir.as_path();
        let outputs = config.outputs;
        let mut specs = Vec::new();

        if outputs.sarif {
            specs.push(spec(Target::Sarif, root.join("documentation").join(format!("{name}.sarif"))));
        }
        if outputs.checks {
            specs.push(spec(Target::Checks, root.join("Checks.md")));
        }
        if outputs.markdown {
            specs.push(spec(Target::Markdown, root.join("documentation").join(format!("{name}.md"))));
        }
        if outputs.msbuild {
            specs.push(spec(Target::MsBuild, root.join("build").join(format!("{name}.props"))));
        }

        let scopes = scopes(catalog, &config.tags);
        if outputs.rulesets {
            for scope in &scopes {
                let file = format!("{}.ruleset", file_stem(scope));
                specs.push(spec(Target::Ruleset(scope.clone()), root.join("rulesets").join(file)));
            }
        }
        if outputs.editorconfig {
            for scope in &scopes {
                let path = root.join("editorconfig").join(file_stem(scope)).join(".editorconfig");
                specs.push(spec(Target::EditorConfig(scope.clone()), path));
            }
        }
        if outputs.globalconfig {
            for scope in &scopes {
                let file = format!("{}.globalconfig", file_stem(scope));
                let path = root.join("build").join("config").join(file);
                specs.push(spec(Target::GlobalConfig(scope.clone()), path));
            }
        }

        // A tag named like a category maps to the category's files.
        let mut planned = HashSet::new();
        specs.retain(|s| {
            let fresh = planned.insert(s.path.clone());
            if !fresh {
                warn!(
                    "Skipping {} output already planned at {}",
                    s.target.kind(),
                    s.path.display()
                );
            }
            fresh
        });

        Self { name, specs }
    }

    /// Logical output name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All planned files in plan order.
    #[must_use]
    pub fn specs(&self) -> &[WriterSpec] {
        &self.specs
    }

    /// Planned files driven by the given traversal.
    pub fn traversal(&self, traversal: Traversal) -> impl Iterator<Item = &WriterSpec> {
        self.specs
            .iter()
            .filter(move |s| s.target.traversal() == traversal)
    }

    /// Returns `true` if nothing is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

fn spec(target: Target, path: PathBuf) -> WriterSpec {
    WriterSpec { target, path }
}

fn file_stem(scope: &Scope) -> String {
    format!("{}{}", scope.selector.file_prefix(), scope.variant.name())
}

/// All rules in three variants, then each category and each requested tag
/// in the Default and Enabled variants.
fn scopes(catalog: &Catalog, tags: &[String]) -> Vec<Scope> {
    let mut scopes: Vec<Scope> = [
        RulesetVariant::Default,
        RulesetVariant::Enabled,
        RulesetVariant::Disabled,
    ]
    .into_iter()
    .map(|variant| Scope {
        selector: Selector::All,
        variant,
    })
    .collect();

    let mut seen_tags = HashSet::new();
    let contexts = catalog
        .categories()
        .map(|c| Selector::Category(c.to_string()))
        .chain(
            tags.iter()
                .filter(|t| !t.is_empty() && seen_tags.insert(t.as_str()))
                .map(|t| Selector::Tag(t.clone())),
        );

    for selector in contexts {
        for variant in [RulesetVariant::Default, RulesetVariant::Enabled] {
            scopes.push(Scope {
                selector: selector.clone(),
                variant,
            });
        }
    }
    scopes
}

/// One file produced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    /// Output format.
    pub kind: OutputKind,
    /// File path.
    pub path: PathBuf,
}

/// Result of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Files written, per-assembly outputs first, each group in plan order.
    pub files: Vec<WrittenFile>,
    /// Number of assemblies traversed.
    pub assemblies: usize,
    /// Number of rules in the master list.
    pub rules: usize,
}

impl RunSummary {
    /// Returns `true` if the run wrote nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// One lifecycle step sent to every writer of a traversal.
#[derive(Debug, Clone)]
enum Step {
    Start,
    StartAssembly(Arc<AssemblyDescriptor>),
    StartRules,
    Rule(Arc<RuleDescriptor>),
    EndRules,
    EndAssembly,
    End,
}

impl Step {
    async fn apply(&self, writer: &mut dyn RuleWriter) -> Result<(), WriterError> {
        match self {
            Self::Start => writer.start().await,
            Self::StartAssembly(assembly) => writer.start_assembly(assembly).await,
            Self::StartRules => writer.start_rules().await,
            Self::Rule(rule) => writer.rule(rule).await,
            Self::EndRules => writer.end_rules().await,
            Self::EndAssembly => writer.end_assembly().await,
            Self::End => writer.end().await,
        }
    }
}

/// Writers of one traversal, stepped together.
struct Fanout {
    traversal: Traversal,
    writers: Vec<Box<dyn RuleWriter>>,
}

impl Fanout {
    fn new(traversal: Traversal, writers: Vec<Box<dyn RuleWriter>>) -> Self {
        Self { traversal, writers }
    }

    /// Runs `step` on every writer concurrently and waits for all of them.
    ///
    /// Writers keep their registration order. When several writers fail the
    /// error of the earliest registered one is returned. A writer whose task
    /// panicked is dropped here and gets no further steps, `End` included.
    async fn broadcast(&mut self, step: &Step) -> Result<(), PipelineError> {
        let count = self.writers.len();
        let mut tasks = JoinSet::new();
        for (index, mut writer) in self.writers.drain(..).enumerate() {
            let step = step.clone();
            tasks.spawn(async move {
                let result = step.apply(writer.as_mut()).await;
                (index, writer, result)
            });
        }

        let mut slots: Vec<Option<Box<dyn RuleWriter>>> = (0..count).map(|_| None).collect();
        let mut failure: Option<(usize, PipelineError)> = None;
        while let Some(joined) = tasks.join_next().await {
            let (index, error) = match joined {
                Ok((index, writer, result)) => {
                    slots[index] = Some(writer);
                    match result {
                        Ok(()) => continue,
                        Err(e) => (index, PipelineError::Writer(e)),
                    }
                }
                Err(e) => (usize::MAX, PipelineError::Join(e)),
            };
            if failure.as_ref().map_or(true, |(first, _)| index < *first) {
                failure = Some((index, error));
            }
        }

        self.writers.extend(slots.into_iter().flatten());
        failure.map_or(Ok(()), |(_, e)| Err(e))
    }

    async fn walk_assemblies(&mut self, catalog: &Catalog) -> Result<(), PipelineError> {
        self.broadcast(&Step::Start).await?;
        for assembly in catalog.assemblies() {
            self.broadcast(&Step::StartAssembly(Arc::clone(assembly))).await?;
            self.broadcast(&Step::StartRules).await?;
            for rule in assembly.rules() {
                self.broadcast(&Step::Rule(Arc::clone(rule))).await?;
            }
            self.broadcast(&Step::EndRules).await?;
            self.broadcast(&Step::EndAssembly).await?;
        }
        Ok(())
    }

    async fn walk_flat(&mut self, catalog: &Catalog) -> Result<(), PipelineError> {
        self.broadcast(&Step::Start).await?;
        self.broadcast(&Step::StartRules).await?;
        for rule in catalog.rules() {
            self.broadcast(&Step::Rule(Arc::clone(rule))).await?;
        }
        self.broadcast(&Step::EndRules).await
    }

    /// Drives the traversal to completion.
    ///
    /// `end` reaches every writer even when an earlier step failed; the
    /// earlier failure wins over a failure while ending.
    async fn run(mut self, catalog: &Catalog) -> Result<Vec<WrittenFile>, PipelineError> {
        if self.writers.is_empty() {
            return Ok(Vec::new());
        }

        let walked = match self.traversal {
            Traversal::PerAssembly => self.walk_assemblies(catalog).await,
            Traversal::Flat => self.walk_flat(catalog).await,
        };
        let ended = self.broadcast(&Step::End).await;

        match (walked, ended) {
            (Err(error), Err(cleanup)) => {
                warn!("Cleanup after failed run also failed: {cleanup}");
                Err(error)
            }
            (Err(error), Ok(())) => Err(error),
            (Ok(()), ended) => ended.map(|()| self.written()),
        }
    }

    fn written(&self) -> Vec<WrittenFile> {
        self.writers
            .iter()
            .map(|w| WrittenFile {
                kind: w.kind(),
                path: w.path().to_path_buf(),
            })
            .collect()
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    catalog: Option<Catalog>,
    config: Config,
    probe: Option<Arc<dyn LinkProbe>>,
}

impl PipelineBuilder {
    /// Sets the rule catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replaces the live HTTP link probe.
    #[must_use]
    pub fn link_probe(mut self, probe: Arc<dyn LinkProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if no catalog was set.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        let catalog = self.catalog.ok_or(PipelineError::MissingCatalog)?;
        Ok(Pipeline {
            catalog: Arc::new(catalog),
            config: self.config,
            probe: self.probe,
        })
    }
}

/// Emits every requested output for a catalog.
pub struct Pipeline {
    catalog: Arc<Catalog>,
    config: Config,
    /// Injected probe; the HTTP one is built on demand for `Checks.md`.
    probe: Option<Arc<dyn LinkProbe>>,
}

impl Pipeline {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Catalog being emitted.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Files this pipeline would write.
    #[must_use]
    pub fn plan(&self) -> OutputPlan {
        OutputPlan::new(&self.catalog, &self.config)
    }

    /// Writes every planned file.
    ///
    /// Returns an empty summary without touching the disk when the catalog
    /// has no rules or no output kind is requested.
    ///
    /// # Errors
    ///
    /// Returns the first writer failure, or an error if the HTTP client for
    /// link checks cannot be created. Files written before a failure may be
    /// incomplete.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        if self.catalog.is_empty() {
            info!("No rules discovered, nothing to do");
            return Ok(RunSummary::default());
        }
        if !self.config.outputs.any() {
            info!("No outputs requested, nothing to do");
            return Ok(RunSummary::default());
        }

        let plan = self.plan();
        let per_assembly = Fanout::new(
            Traversal::PerAssembly,
            self.create_writers(&plan, Traversal::PerAssembly)?,
        );
        let flat = Fanout::new(Traversal::Flat, self.create_writers(&plan, Traversal::Flat)?);

        let (per_assembly, flat) = tokio::join!(
            per_assembly.run(&self.catalog),
            flat.run(&self.catalog)
        );

        let mut files = per_assembly?;
        files.extend(flat?);

        let summary = RunSummary {
            files,
            assemblies: self.catalog.assembly_count(),
            rules: self.catalog.rule_count(),
        };
        info!(
            "Wrote {} files for {} rules from {} assemblies",
            summary.files.len(),
            summary.rules,
            summary.assemblies
        );
        Ok(summary)
    }

    fn create_writers(
        &self,
        plan: &OutputPlan,
        traversal: Traversal,
    ) -> Result<Vec<Box<dyn RuleWriter>>, PipelineError> {
        plan.traversal(traversal)
            .map(|spec| {
                debug!("Registering {} writer for {}", spec.target.kind(), spec.path.display());
                self.create_writer(plan.name(), spec)
            })
            .collect()
    }

    fn create_writer(
        &self,
        name: &str,
        spec: &WriterSpec,
    ) -> Result<Box<dyn RuleWriter>, PipelineError> {
        let path: &Path = &spec.path;
        let writer: Box<dyn RuleWriter> = match &spec.target {
            Target::Sarif => Box::new(SarifWriter::new(path)),
            Target::Checks => Box::new(LinkCheckWriter::new(path, self.link_probe()?)),
            Target::Markdown => Box::new(DocsWriter::new(
                path,
                name,
                Arc::new(self.catalog.fixable_ids().clone()),
            )),
            Target::MsBuild => Box::new(PropsWriter::new(path)),
            Target::Ruleset(scope) => Box::new(ConfigWriter::new(
                Ruleset::new(name),
                path,
                scope.selector.clone(),
                scope.variant,
            )),
            Target::EditorConfig(scope) => Box::new(ConfigWriter::new(
                EditorConfig,
                path,
                scope.selector.clone(),
                scope.variant,
            )),
            Target::GlobalConfig(scope) => Box::new(ConfigWriter::new(
                GlobalConfig,
                path,
                scope.selector.clone(),
                scope.variant,
            )),
        };
        Ok(writer)
    }

    fn link_probe(&self) -> Result<Arc<dyn LinkProbe>, PipelineError> {
        if let Some(probe) = &self.probe {
            return Ok(Arc::clone(probe));
        }
        let probe: Arc<dyn LinkProbe> = Arc::new(HttpLinkProbe::new(&self.config.link_check)?);
        Ok(probe)
    }
}
