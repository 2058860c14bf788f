//! Manifest building and archive orchestration.
//!
//! The [`Packager`] turns a [`PackageRequest`](super::PackageRequest) into an
//! archive:
//!
//! 1. Selects the products to pack (commercial and property filters)
//! 2. Builds one manifest per requested mode, in a private working directory
//! 3. Appends extra files and the README
//! 4. Writes the archive, then hashes it
//!
//! # Example
//!
//! ```no_run
//! use satpack::config::Config;
//! use satpack::package::{PackageRequest, Packager};
//!
//! # async fn example() -> satpack::package::Result<()> {
//! let config = Config::load(std::path::Path::new("satpack.toml"))?;
//! let packager = Packager::new(config)?;
//! let archive = packager
//!     .package(&PackageRequest {
//!         binaries: true,
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{} ({} bytes, sha256 {})", archive.path.display(), archive.size, archive.checksum);
//! # Ok(())
//! # }
//! ```

mod binary;
mod checksum;
mod orchestrator;
mod project;
mod readme;
mod source;

pub use binary::{BinaryManifest, SOURCES_DIR, build_binary_manifest};
pub use checksum::calculate_sha256;
pub use orchestrator::{BuiltManifest, PackagedArchive, Packager};
pub use project::build_project_manifest;
pub use readme::{README_NAME, produce_readme};
pub use source::{TOOLS_DIR, TOOLS_LINK, build_source_manifest, tools_manifest};

use super::{archive::ExclusionFilter, launcher::EnvironmentWriter, resources::Templates};
use crate::config::Config;
use std::path::Path;

/// Shared inputs of the manifest producers.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub config: &'a Config,
    pub templates: &'a Templates,
    pub environment: &'a dyn EnvironmentWriter,
    /// Private working directory of this run.
    pub work_dir: &'a Path,
}

impl BuildContext<'_> {
    /// Exclusion filter for directories packed during this run.
    pub fn filter(&self) -> ExclusionFilter {
        ExclusionFilter::new(self.config.tools.ignored_extensions.as_slice())
    }
}
