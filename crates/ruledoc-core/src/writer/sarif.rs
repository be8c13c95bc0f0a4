//! SARIF 2.1.0 interchange report, one run per assembly.

use super::{OutputFile, OutputKind, RuleWriter, WriterError};
use crate::model::{AssemblyDescriptor, RuleDescriptor, Severity};

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SCHEMA: &str = "https://schemastore.azurewebsites.net/schemas/json/sarif-2.1.0-rtm.5.json";

#[derive(Debug, Serialize)]
struct SarifLog {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<Run>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Run {
    tool: Tool,
    column_kind: &'static str,
}

#[derive(Debug, Serialize)]
struct Tool {
    driver: Driver,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Driver {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dotted_quad_file_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    semantic_version: Option<String>,
    language: &'static str,
    rules: Vec<ReportingDescriptor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportingDescriptor {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    short_description: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_description: Option<Message>,
    default_configuration: Configuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    help_uri: Option<String>,
    properties: Properties,
}

#[derive(Debug, Serialize)]
struct Message {
    text: String,
}

impl Message {
    fn non_empty(text: &str) -> Option<Self> {
        (!text.is_empty()).then(|| Self {
            text: text.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct Configuration {
    level: &'static str,
    enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Properties {
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    type_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    languages: Vec<String>,
}

fn level(severity: Severity) -> &'static str {
    match severity {
        Severity::Hidden => "hidden",
        Severity::Info => "note",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

impl From<&RuleDescriptor> for ReportingDescriptor {
    fn from(rule: &RuleDescriptor) -> Self {
        let mut languages = rule.languages().to_vec();
        languages.sort_by_key(|l| l.to_lowercase());

        Self {
            id: rule.id().to_string(),
            short_description: Message::non_empty(rule.title()),
            full_description: Message::non_empty(rule.description()),
            default_configuration: Configuration {
                level: level(rule.default_severity()),
                enabled: rule.is_enabled_by_default(),
            },
            help_uri: rule.help_link().map(str::to_string),
            properties: Properties {
                category: Some(rule.category().to_string()).filter(|c| !c.is_empty()),
                tags: rule.tags().to_vec(),
                type_name: rule.type_name().to_string(),
                languages,
            },
        }
    }
}

/// Writes every assembly and its rules as a SARIF log.
///
/// The document is assembled in memory and serialized once on `end`.
#[derive(Debug)]
pub struct SarifWriter {
    file: OutputFile,
    runs: Vec<Run>,
}

impl SarifWriter {
    /// Creates a writer that will produce `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: OutputFile::new(path),
            runs: Vec::new(),
        }
    }
}

#[async_trait]
impl RuleWriter for SarifWriter {
    fn kind(&self) -> OutputKind {
        OutputKind::Sarif
    }

    fn path(&self) -> &Path {
        self.file.path()
    }

    async fn start(&mut self) -> Result<(), WriterError> {
        self.runs.clear();
        self.file.open().await
    }

    async fn start_assembly(&mut self, assembly: &AssemblyDescriptor) -> Result<(), WriterError> {
        self.runs.push(Run {
            tool: Tool {
                driver: Driver {
                    name: assembly.name().to_string(),
                    version: assembly.version().map(str::to_string),
                    dotted_quad_file_version: assembly.file_version().map(str::to_string),
                    semantic_version: assembly.informational_version().map(str::to_string),
                    language: "en-US",
                    rules: Vec::new(),
                },
            },
            column_kind: "utf16CodeUnits",
        });
        Ok(())
    }

    async fn rule(&mut self, rule: &Arc<RuleDescriptor>) -> Result<(), WriterError> {
        let Some(run) = self.runs.last_mut() else {
            return Err(WriterError::NotStarted {
                path: self.file.path().to_path_buf(),
            });
        };
        run.tool.driver.rules.push(ReportingDescriptor::from(rule.as_ref()));
        Ok(())
    }

    async fn end(&mut self) -> Result<(), WriterError> {
        if !self.file.is_open() {
            return Ok(());
        }
        let log = SarifLog {
            schema: SCHEMA,
            version: "2.1.0",
            runs: std::mem::take(&mut self.runs),
        };
        let json = serde_json::to_string_pretty(&log).map_err(|e| WriterError::Json {
            path: self.file.path().to_path_buf(),
            source: e,
        })?;
        self.file.write_line(&json).await?;
        self.file.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_one_run_per_assembly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documentation/Contoso.sarif");
        let mut writer = SarifWriter::new(&path);

        let assembly = AssemblyDescriptor::new("Contoso.Analyzers")
            .with_file_version("1.2.0.0")
            .with_informational_version("1.2.0-beta.1+abc");
        let rule = Arc::new(
            RuleDescriptor::new("CT1001", "Avoid foo", "Design", Severity::Info)
                .with_help_link("https://example.com/CT1001")
                .with_type_name("FooAnalyzer")
                .with_tag("Telemetry")
                .with_language("visual Basic")
                .with_language("C#"),
        );

        writer.start().await.unwrap();
        writer.start_assembly(&assembly).await.unwrap();
        writer.start_rules().await.unwrap();
        writer.rule(&rule).await.unwrap();
        writer.end_rules().await.unwrap();
        writer.end_assembly().await.unwrap();
        writer.end().await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["$schema"], SCHEMA);
        assert_eq!(json["version"], "2.1.0");

        let run = &json["runs"][0];
        assert_eq!(run["columnKind"], "utf16CodeUnits");
        let driver = &run["tool"]["driver"];
        assert_eq!(driver["name"], "Contoso.Analyzers");
        assert_eq!(driver["version"], "1.2.0");
        assert_eq!(driver["dottedQuadFileVersion"], "1.2.0.0");
        assert_eq!(driver["semanticVersion"], "1.2.0-beta.1+abc");
        assert_eq!(driver["language"], "en-US");

        let entry = &driver["rules"][0];
        assert_eq!(entry["id"], "CT1001");
        assert_eq!(entry["shortDescription"]["text"], "Avoid foo");
        assert!(entry.get("fullDescription").is_none());
        assert_eq!(entry["defaultConfiguration"]["level"], "note");
        assert_eq!(entry["defaultConfiguration"]["enabled"], true);
        assert_eq!(entry["helpUri"], "https://example.com/CT1001");
        assert_eq!(entry["properties"]["category"], "Design");
        assert_eq!(entry["properties"]["tags"][0], "Telemetry");
        assert_eq!(entry["properties"]["typeName"], "FooAnalyzer");
        assert_eq!(
            entry["properties"]["languages"],
            serde_json::json!(["C#", "visual Basic"])
        );
    }

    #[tokio::test]
    async fn assembly_without_versions_omits_them() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sarif");
        let mut writer = SarifWriter::new(&path);

        writer.start().await.unwrap();
        writer
            .start_assembly(&AssemblyDescriptor::new("Bare"))
            .await
            .unwrap();
        writer.end_assembly().await.unwrap();
        writer.end().await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("\"version\": \"\""));
        assert!(!text.contains("semanticVersion"));
        assert!(!text.contains("dottedQuadFileVersion"));
    }
}
