//! # ruledoc-core
//!
//! Emits analyzer rule metadata into documentation, interchange reports and
//! severity configuration files.
//!
//! This crate provides:
//!
//! - [`RuleDescriptor`] and [`AssemblyDescriptor`], the rule data model
//! - [`Catalog`], the de-duplicated master rule list built by [`CatalogBuilder`]
//! - [`Selector`] and [`RulesetVariant`] for configuration scoping
//! - [`RuleWriter`], the writer protocol, with one implementation per format
//! - [`Pipeline`] for driving every writer over the catalog concurrently
//!
//! ## Example
//!
//! ```ignore
//! use ruledoc_core::{manifest, Config, Pipeline};
//!
//! let catalog = manifest::load_catalog(&["manifests/*.toml"])?;
//! let pipeline = Pipeline::builder()
//!     .catalog(catalog)
//!     .config(Config::from_file("ruledoc.toml".as_ref())?)
//!     .build()?;
//!
//! let summary = pipeline.run().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod config;
mod model;
mod pipeline;
mod probe;
mod selector;

/// Rule manifests on disk.
pub mod manifest;
/// Writer protocol and output formats.
pub mod writer;

pub use catalog::{Catalog, CatalogBuilder};
pub use config::{Config, ConfigError, LinkCheckConfig, Outputs};
pub use manifest::ManifestError;
pub use model::{AssemblyDescriptor, RuleDescriptor, Severity};
pub use pipeline::{
    OutputPlan, Pipeline, PipelineBuilder, PipelineError, RunSummary, Scope, Target, Traversal,
    WriterSpec, WrittenFile,
};
pub use probe::{check_help_link, HttpLinkProbe, LinkError, LinkProbe};
pub use selector::{RulesetVariant, Selector};
pub use writer::{OutputKind, RuleWriter, WriterError};
