//! Rule manifests: already-materialized rule metadata stored as TOML.
//!
//! Each manifest describes one assembly. Discovery of the rules themselves
//! happens elsewhere; this module only reads what discovery produced.
//!
//! # Architecture
//!
//! ```text
//! paths / glob patterns
//!   ↓ expand_inputs()
//! manifest files
//!   ↓ serde (DTO layer)
//! dto types
//!   ↓ validate + convert
//! AssemblyDescriptor + fixable ids
//!   ↓ CatalogBuilder
//! Catalog
//! ```

pub mod dto;
pub mod loader;

pub use loader::{LoadError, LoadedManifest};

use crate::catalog::{Catalog, CatalogBuilder};

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Errors from locating, reading and validating manifests.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// IO error reading a manifest.
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// TOML deserialization failed.
    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        /// Manifest path.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// Descriptor validation failed.
    #[error("Invalid manifest {path}: {source}")]
    Invalid {
        /// Manifest path.
        path: PathBuf,
        /// The validation error.
        source: LoadError,
    },

    /// An input argument is not a valid glob pattern.
    #[error("Invalid input pattern `{pattern}`: {source}")]
    Pattern {
        /// The offending argument.
        pattern: String,
        /// Underlying pattern error.
        source: glob::PatternError,
    },
}

/// Parses manifest content.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or a rule fails validation.
pub fn parse_manifest(content: &str, path: &Path) -> Result<LoadedManifest, ManifestError> {
    let dto: dto::ManifestDto = toml::from_str(content).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let stem = path.file_stem().and_then(|s| s.to_str());
    loader::load(dto, stem).map_err(|e| ManifestError::Invalid {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads and validates one manifest file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_manifest(path: &Path) -> Result<LoadedManifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_manifest(&content, path)
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Expands input arguments into manifest paths.
///
/// Arguments are processed in order. Plain paths are kept as given, glob
/// patterns expand to their matches in sorted order. Repeated paths are kept
/// once.
///
/// # Errors
///
/// Returns an error if a pattern is malformed or a match cannot be read.
pub fn expand_inputs<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<PathBuf>, ManifestError> {
    let mut paths = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if !is_pattern(input) {
            paths.push(PathBuf::from(input));
            continue;
        }

        let entries = glob::glob(input).map_err(|e| ManifestError::Pattern {
            pattern: input.to_string(),
            source: e,
        })?;
        let mut matches = entries
            .map(|entry| {
                entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    ManifestError::Io {
                        path,
                        source: e.into(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if matches.is_empty() {
            warn!("No manifests match {input}");
        }
        matches.sort();
        paths.extend(matches);
    }

    let mut seen = std::collections::BTreeSet::new();
    paths.retain(|p| seen.insert(p.clone()));
    Ok(paths)
}

/// Loads every manifest named by `inputs` into a catalog.
///
/// # Errors
///
/// Returns the first expansion, read or validation error.
pub fn load_catalog<S: AsRef<str>>(inputs: &[S]) -> Result<Catalog, ManifestError> {
    let mut builder = CatalogBuilder::new();
    for path in expand_inputs(inputs)? {
        debug!("Loading manifest {}", path.display());
        let loaded = load_manifest(&path)?;
        builder.add_assembly(loaded.assembly, loaded.fixable_ids);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MANIFEST: &str = r#"
[[rules]]
id = "R1"
title = "t"
category = "Design"
"#;

    #[test]
    fn expands_globs_sorted_after_plain_paths() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.toml", "a.toml", "c.txt"] {
            fs::write(dir.path().join(name), MANIFEST).unwrap();
        }
        let plain = dir.path().join("c.txt");
        let pattern = format!("{}/*.toml", dir.path().display());

        let paths = expand_inputs(&[plain.to_string_lossy().into_owned(), pattern]).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["c.txt", "a.toml", "b.toml"]);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = expand_inputs(&["[unclosed"]).unwrap_err();
        assert!(matches!(err, ManifestError::Pattern { .. }));
    }

    #[test]
    fn load_catalog_uses_file_stem_as_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Contoso.Analyzers.toml");
        fs::write(&path, MANIFEST).unwrap();

        let catalog = load_catalog(&[path.to_string_lossy()]).unwrap();
        assert_eq!(catalog.default_name(), Some("Contoso.Analyzers"));
        assert_eq!(catalog.rule_count(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_catalog(&["does/not/exist.toml"]).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn validation_error_names_file() {
        let err = parse_manifest(
            "[[rules]]\nid = \"\"\ntitle = \"t\"\ncategory = \"c\"\n",
            Path::new("bad.toml"),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid manifest bad.toml: rules[0]: rule id must not be empty"
        );
    }
}
