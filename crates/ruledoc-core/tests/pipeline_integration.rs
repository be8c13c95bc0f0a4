//! End-to-end runs of the pipeline against manifest fixtures.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use ruledoc_core::{
    manifest, AssemblyDescriptor, Catalog, Config, LinkError, LinkProbe, OutputKind, Outputs,
    Pipeline, PipelineError, RuleDescriptor, Severity,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn fixture_catalog() -> Catalog {
    manifest::load_catalog(&[fixture("*.toml")]).unwrap()
}

/// Offline probe: paths containing `missing` answer 404.
#[derive(Default)]
struct FakeProbe {
    calls: AtomicUsize,
}

#[async_trait]
impl LinkProbe for FakeProbe {
    async fn probe(&self, url: &Url) -> Result<(), LinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.path().contains("missing") {
            return Err(LinkError::Status {
                status: StatusCode::NOT_FOUND,
                uri: url.to_string(),
            });
        }
        Ok(())
    }
}

fn config(dir: &Path, outputs: Outputs, tags: &[&str]) -> Config {
    Config {
        output_dir: dir.to_path_buf(),
        tags: tags.iter().map(ToString::to_string).collect(),
        outputs,
        ..Config::default()
    }
}

async fn run(catalog: Catalog, config: Config, probe: Arc<FakeProbe>) -> ruledoc_core::RunSummary {
    Pipeline::builder()
        .catalog(catalog)
        .config(config)
        .link_probe(probe)
        .build()
        .unwrap()
        .run()
        .await
        .unwrap()
}

/// Every file under `dir`, keyed by its path relative to `dir`.
fn read_tree(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, files);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(relative, std::fs::read(&path).unwrap());
            }
        }
    }

    let mut files = BTreeMap::new();
    walk(dir, dir, &mut files);
    files
}

#[test]
fn fixtures_load_into_catalog() {
    let catalog = fixture_catalog();

    let assemblies: Vec<_> = catalog.assemblies().map(|a| a.name().to_string()).collect();
    assert_eq!(assemblies, ["Contoso.Analyzers", "Fabrikam.Analyzers"]);
    assert_eq!(catalog.default_name(), Some("Contoso.Analyzers"));
    assert_eq!(catalog.rule_count(), 4);
    assert_eq!(
        catalog.categories().collect::<Vec<_>>(),
        ["Design", "Naming", "Reliability"]
    );
    assert!(catalog.has_fix("CT1002"));
}

#[tokio::test]
async fn full_run_writes_every_planned_file() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Arc::new(FakeProbe::default());
    let summary = run(
        fixture_catalog(),
        config(dir.path(), Outputs::all(), &["Telemetry", "Logging"]),
        Arc::clone(&probe),
    )
    .await;

    // 2 per-assembly + docs + props + 3 formats x (3 All + 2 x 3 categories + 2 x 2 tags)
    assert_eq!(summary.files.len(), 43);
    assert_eq!(summary.assemblies, 2);
    assert_eq!(summary.rules, 4);
    assert_eq!(summary.files[0].kind, OutputKind::Sarif);
    assert_eq!(summary.files[1].kind, OutputKind::Checks);
    for file in &summary.files {
        assert!(file.path.is_file(), "{} missing", file.path.display());
    }

    let tree = read_tree(dir.path());
    assert_eq!(tree.len(), 43);
    assert!(tree.contains_key(Path::new("documentation/Contoso.Analyzers.sarif")));
    assert!(tree.contains_key(Path::new("editorconfig/LoggingRulesEnabled/.editorconfig")));
    assert!(tree.contains_key(Path::new("build/config/ReliabilityRulesDefault.globalconfig")));
    assert!(!tree.contains_key(Path::new("rulesets/DesignRulesDisabled.ruleset")));
}

#[tokio::test]
async fn config_files_list_every_rule_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = Outputs {
        rulesets: true,
        editorconfig: true,
        globalconfig: true,
        ..Outputs::default()
    };
    let catalog = fixture_catalog();
    let ids: Vec<String> = catalog.rules().map(|r| r.id().to_string()).collect();
    run(
        catalog,
        config(dir.path(), outputs, &["Telemetry"]),
        Arc::default(),
    )
    .await;

    let tree = read_tree(dir.path());
    assert!(!tree.is_empty());
    for (path, bytes) in &tree {
        let text = String::from_utf8(bytes.clone()).unwrap();
        for id in &ids {
            let needle = if path.extension().is_some_and(|e| e == "ruleset") {
                format!("<Rule Id=\"{id}\"")
            } else {
                format!("dotnet_diagnostic.{id}.severity")
            };
            assert_eq!(text.matches(&needle).count(), 1, "{id} in {}", path.display());
        }
    }
}

#[tokio::test]
async fn category_default_scenario() {
    let catalog = Catalog::builder()
        .assembly(
            AssemblyDescriptor::new("Scenario")
                .with_rule(RuleDescriptor::new("RULE001", "First", "Design", Severity::Warning))
                .with_rule(
                    RuleDescriptor::new("RULE002", "Second", "Design", Severity::Error)
                        .enabled_by_default(false),
                ),
        )
        .build();
    let dir = tempfile::tempdir().unwrap();
    let outputs = Outputs {
        editorconfig: true,
        ..Outputs::default()
    };
    run(catalog, config(dir.path(), outputs, &[]), Arc::default()).await;

    let text = std::fs::read_to_string(
        dir.path()
            .join("editorconfig/DesignRulesDefault/.editorconfig"),
    )
    .unwrap();
    assert!(text.contains("# Design rules\n"));
    assert!(text.contains("dotnet_diagnostic.RULE001.severity = warning\n"));
    assert!(text.contains("dotnet_diagnostic.RULE002.severity = none\n"));
    assert!(!text.contains("Other rules"));
}

#[tokio::test]
async fn selected_rule_keeps_its_severity_in_every_matching_scope() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = Outputs {
        rulesets: true,
        editorconfig: true,
        ..Outputs::default()
    };
    run(
        fixture_catalog(),
        config(dir.path(), outputs, &["Telemetry"]),
        Arc::default(),
    )
    .await;

    // CT1001 is a Design warning tagged Telemetry.
    for stem in ["AllRulesDefault", "DesignRulesDefault", "TelemetryRulesDefault"] {
        let ini = std::fs::read_to_string(
            dir.path().join("editorconfig").join(stem).join(".editorconfig"),
        )
        .unwrap();
        let line = ini
            .find("dotnet_diagnostic.CT1001.severity = warning\n")
            .unwrap_or_else(|| panic!("CT1001 not at warning in {stem}"));
        if let Some(other) = ini.find("# Other rules") {
            assert!(line < other, "CT1001 deferred in {stem}");
        }

        let ruleset =
            std::fs::read_to_string(dir.path().join("rulesets").join(format!("{stem}.ruleset")))
                .unwrap();
        let line = ruleset
            .find("<Rule Id=\"CT1001\" Action=\"Warning\" />")
            .unwrap_or_else(|| panic!("CT1001 not at Warning in {stem}.ruleset"));
        if let Some(other) = ruleset.find("<!--Other rules-->") {
            assert!(line < other, "CT1001 deferred in {stem}.ruleset");
        }
    }

    let telemetry = std::fs::read_to_string(
        dir.path()
            .join("editorconfig/TelemetryRulesDefault/.editorconfig"),
    )
    .unwrap();
    let other = telemetry.find("# Other rules").unwrap();
    assert!(telemetry.find("dotnet_diagnostic.CT2001.severity = none").unwrap() > other);
}

#[tokio::test]
async fn tag_named_like_a_category_writes_each_file_once() {
    let mut assembly = AssemblyDescriptor::new("Overlap");
    for n in 0..40 {
        let category = if n % 2 == 0 { "Telemetry" } else { "Design" };
        assembly.add_rule(RuleDescriptor::new(
            format!("R{n:03}"),
            "Rule",
            category,
            Severity::Warning,
        ));
    }
    let catalog = Catalog::builder().assembly(assembly).build();
    let dir = tempfile::tempdir().unwrap();
    let outputs = Outputs {
        editorconfig: true,
        ..Outputs::default()
    };
    let summary = run(catalog, config(dir.path(), outputs, &["Telemetry"]), Arc::default()).await;

    let mut paths: Vec<_> = summary.files.iter().map(|f| f.path.clone()).collect();
    let total = paths.len();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), total);
    // 3 All + 2 x 2 categories
    assert_eq!(total, 7);

    let text = std::fs::read_to_string(
        dir.path()
            .join("editorconfig/TelemetryRulesDefault/.editorconfig"),
    )
    .unwrap();
    assert!(text.contains("# Rules in the Telemetry category with default severity\n"));
    assert!(!text.contains("Rules tagged"));
    for n in 0..40 {
        let needle = format!("dotnet_diagnostic.R{n:03}.severity");
        assert_eq!(text.matches(&needle).count(), 1, "R{n:03}");
    }
}

#[tokio::test]
async fn link_report_lists_only_broken_links() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Arc::new(FakeProbe::default());
    let outputs = Outputs {
        checks: true,
        ..Outputs::default()
    };
    run(
        fixture_catalog(),
        config(dir.path(), outputs, &[]),
        Arc::clone(&probe),
    )
    .await;

    let text = std::fs::read_to_string(dir.path().join("Checks.md")).unwrap();
    insta::assert_snapshot!(text, @r"
    # Contoso.Analyzers

    |Rule ID|Title|Check|
    |-------|-----|-----|
    |CT1002|Seal internal types|Missing help link URI|
    |CT2001|Use PascalCase for constants|Invalid response (404 Not Found) for link URI: https://docs.example.com/rules/missing/CT2001|

    # Fabrikam.Analyzers

    |Rule ID|Title|Check|
    |-------|-----|-----|
    |FB0001|Log with structured fields|Missing help link URI|
    ");
    assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn documentation_and_manifest_cover_master_list() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = Outputs {
        markdown: true,
        msbuild: true,
        sarif: true,
        ..Outputs::default()
    };
    let mut config = config(dir.path(), outputs, &[]);
    config.name = Some("Bundle".into());
    run(fixture_catalog(), config, Arc::default()).await;

    let docs = std::fs::read_to_string(dir.path().join("documentation/Bundle.md")).unwrap();
    assert!(docs.starts_with("# Bundle\n\n## [CT1001](https://docs.example.com/rules/CT1001): Avoid mutable statics\n"));
    assert!(docs.contains("Mutable statics make code hard to reason about.<br>Prefer dependency injection."));
    assert!(docs.contains("## CT1002: Seal internal types\n\nType {0} can be sealed\n"));
    assert!(docs.contains("## FB0001: Log with structured fields\n"));

    let sections: Vec<_> = docs.match_indices("\n## ").map(|(i, _)| i).collect();
    assert_eq!(sections.len(), 4);

    let props = std::fs::read_to_string(dir.path().join("build/Bundle.props")).unwrap();
    assert!(props.contains("<CodeAnalysisRuleIds>CT1001;CT1002;CT2001;FB0001</CodeAnalysisRuleIds>"));

    let sarif: serde_json::Value = serde_json::from_slice(
        &std::fs::read(dir.path().join("documentation/Bundle.sarif")).unwrap(),
    )
    .unwrap();
    let runs = sarif["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["tool"]["driver"]["rules"].as_array().unwrap().len(), 3);
    assert_eq!(runs[1]["tool"]["driver"]["version"], "0.9.1");
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let tags = ["Telemetry", "Logging"];

    run(fixture_catalog(), config(first.path(), Outputs::all(), &tags), Arc::default()).await;
    let before = read_tree(first.path());

    run(fixture_catalog(), config(first.path(), Outputs::all(), &tags), Arc::default()).await;
    run(fixture_catalog(), config(second.path(), Outputs::all(), &tags), Arc::default()).await;

    assert_eq!(read_tree(first.path()), before);
    assert_eq!(read_tree(second.path()), before);
}

#[tokio::test]
async fn nothing_to_do_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();

    let summary = run(
        fixture_catalog(),
        config(dir.path(), Outputs::default(), &[]),
        Arc::default(),
    )
    .await;
    assert!(summary.is_empty());

    let empty = manifest::load_catalog(&[fixture("Empty.toml")]).unwrap();
    assert!(empty.is_empty());
    let summary = run(empty, config(dir.path(), Outputs::all(), &[]), Arc::default()).await;
    assert!(summary.is_empty());

    assert!(read_tree(dir.path()).is_empty());
}

#[tokio::test]
async fn unwritable_output_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocked");
    std::fs::write(&blocker, "not a directory").unwrap();

    let result = Pipeline::builder()
        .catalog(fixture_catalog())
        .config(config(&blocker, Outputs::all(), &[]))
        .link_probe(Arc::new(FakeProbe::default()))
        .build()
        .unwrap()
        .run()
        .await;

    assert!(matches!(result, Err(PipelineError::Writer(_))));
}
