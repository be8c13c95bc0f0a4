//! Configuration types for ruledoc.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for ruledoc.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logical output name used for the report, documentation and build
    /// manifest file names. Defaults to the first assembly name.
    #[serde(default)]
    pub name: Option<String>,

    /// Directory every output is written under.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Tags to additionally slice configuration outputs by.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Requested output kinds.
    #[serde(default)]
    pub outputs: Outputs,

    /// Link-check settings.
    #[serde(default)]
    pub link_check: LinkCheckConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Output kinds to generate. Every kind is off unless requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Outputs {
    /// SARIF interchange report.
    #[serde(default)]
    pub sarif: bool,
    /// Markdown rule documentation.
    #[serde(default)]
    pub markdown: bool,
    /// XML rulesets.
    #[serde(default)]
    pub rulesets: bool,
    /// `.editorconfig` files.
    #[serde(default)]
    pub editorconfig: bool,
    /// `.globalconfig` files.
    #[serde(default)]
    pub globalconfig: bool,
    /// MSBuild `.props` manifest.
    #[serde(default)]
    pub msbuild: bool,
    /// Help-link check report.
    #[serde(default)]
    pub checks: bool,
}

impl Outputs {
    /// Every output kind turned on.
    #[must_use]
    pub fn all() -> Self {
        Self {
            sarif: true,
            markdown: true,
            rulesets: true,
            editorconfig: true,
            globalconfig: true,
            msbuild: true,
            checks: true,
        }
    }

    /// Returns `true` if at least one output kind is requested.
    #[must_use]
    pub fn any(&self) -> bool {
        self.sarif
            || self.markdown
            || self.rulesets
            || self.editorconfig
            || self.globalconfig
            || self.msbuild
            || self.checks
    }

    /// Field-wise union.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            sarif: self.sarif || other.sarif,
            markdown: self.markdown || other.markdown,
            rulesets: self.rulesets || other.rulesets,
            editorconfig: self.editorconfig || other.editorconfig,
            globalconfig: self.globalconfig || other.globalconfig,
            msbuild: self.msbuild || other.msbuild,
            checks: self.checks || other.checks,
        }
    }
}

/// Settings for the live help-link check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCheckConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User agent sent with every request. Some documentation hosts reject
    /// clients that do not look like a browser.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept a redirect whose target only differs by a trailing slash.
    #[serde(default = "default_true")]
    pub follow_trailing_slash: bool,
}

impl LinkCheckConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for LinkCheckConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
            follow_trailing_slash: true,
        }
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
        .to_string()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.name, None);
        assert!(config.tags.is_empty());
        assert!(!config.outputs.any());
        assert_eq!(config.link_check.timeout_seconds, 30);
        assert!(config.link_check.follow_trailing_slash);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
name = "Contoso"
output_dir = "./artifacts"
tags = ["Telemetry", "Security"]

[outputs]
sarif = true
editorconfig = true

[link_check]
timeout_seconds = 5
follow_trailing_slash = false
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.name.as_deref(), Some("Contoso"));
        assert_eq!(config.output_dir, PathBuf::from("./artifacts"));
        assert_eq!(config.tags, ["Telemetry", "Security"]);
        assert!(config.outputs.sarif);
        assert!(config.outputs.editorconfig);
        assert!(!config.outputs.rulesets);
        assert_eq!(config.link_check.timeout(), Duration::from_secs(5));
        assert!(!config.link_check.follow_trailing_slash);
        assert!(config.link_check.user_agent.starts_with("Mozilla"));
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("outputs = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_outputs_union() {
        let file = Outputs {
            sarif: true,
            ..Outputs::default()
        };
        let flags = Outputs {
            markdown: true,
            ..Outputs::default()
        };
        let merged = file.union(flags);
        assert!(merged.sarif && merged.markdown && !merged.checks);
        assert_eq!(Outputs::default().union(Outputs::all()), Outputs::all());
    }
}
