//! Package assembly engine.
//!
//! Three kinds of archives are produced from a resolved [`Config`](crate::config::Config):
//!
//! - **binary**: installed products under `BINARIES-<tag>/`, a relocatable
//!   launcher and its environment file
//! - **source**: product archives under `ARCHIVES/`, a self-contained
//!   `PROJECT/` tree and a copy of the tools
//! - **project**: the directories a project descriptor points at
//!
//! Each producer contributes a [`Manifest`]; the [`Packager`] merges them
//! and hands the result to the archive writer.
//!
//! # Module Organization
//!
//! - [`archive`] - tar/gzip writer tolerant to per-entry failures
//! - [`builder`] - manifest producers and the [`Packager`]
//! - [`launcher`] - relocatable launchers and environment files
//! - [`manifest`] - labelled archive entries
//! - [`project_tree`] - project tree embedded in source packages
//! - [`vcs`] - snapshots of version-controlled products

pub mod archive;
pub mod builder;
pub mod error;
pub mod launcher;
pub mod manifest;
pub mod project_tree;
pub mod report;
pub mod request;
pub mod resources;
pub mod utils;
pub mod vcs;

pub use builder::{BuiltManifest, PackagedArchive, Packager};
pub use error::{Context, Error, ErrorExt, Result};
pub use manifest::{Manifest, ManifestEntry};
pub use report::MissingArtifactReport;
pub use request::{PackageRequest, PropertyFilter};
