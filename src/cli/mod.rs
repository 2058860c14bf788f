//! Command line interface for satpack.
//!
//! Parses flags into a [`PackageRequest`], runs the [`Packager`] and reports
//! the outcome. The exit code is 0 only when the archive was written and
//! every entry was added.

mod args;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::{
    config::Config,
    error::{CliError, Result},
    package::{self, PackageRequest, Packager},
};
use std::path::Path;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let runtime = RuntimeConfig::from(&args);
    let request = args.to_request()?;
    execute(&args.config, &request, &runtime).await
}

/// Loads the configuration at `config_path` and packages `request`.
pub async fn execute(
    config_path: &Path,
    request: &PackageRequest,
    runtime: &RuntimeConfig,
) -> Result<i32> {
    let out = runtime.output();
    let config = Config::load(config_path)?;
    if (request.binaries || request.sources) && config.application.is_none() {
        return Err(CliError::InvalidArguments {
            reason: format!(
                "--binaries and --sources need an [application] in {}",
                config_path.display()
            ),
        }
        .into());
    }

    out.section("Packaging")?;
    out.verbose(&format!("Configuration: {}", config_path.display()))?;
    let packager = Packager::new(config)?;
    out.progress(&format!(
        "Writing {}",
        packager.archive_path(request)?.display()
    ))?;

    let archive = match packager.package(request).await {
        Ok(archive) => archive,
        Err(package::Error::MissingArtifacts(report)) => {
            out.error("missing products, no archive written")?;
            out.block(&report.listing())?;
            out.indent("Pass --force-creation to package without them")?;
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    if !archive.missing.is_empty() {
        out.warn("the archive was created without these products")?;
        out.block(&archive.missing.listing())?;
    }

    out.indent(&format!("Path:     {}", archive.path.display()))?;
    out.indent(&format!("Entries:  {}", archive.entries))?;
    out.indent(&format!("Size:     {} bytes", archive.size))?;
    out.indent(&format!("SHA-256:  {}", archive.checksum))?;

    if archive.success {
        out.success("Archive created")?;
        Ok(0)
    } else {
        out.error("some entries could not be added, see the KO lines above")?;
        Ok(1)
    }
}
