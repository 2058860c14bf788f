//! Snapshotting version-controlled products into tarballs.
//!
//! Source packages never ship a working copy. Each VCS product is cleaned and
//! fetched again through the build driver, then packed as
//! `ARCHIVES/<name>.tgz`, the same place archive-acquired products land.

use super::{
    Error, Result,
    archive::{self, ExclusionFilter},
    error::Context,
    manifest::Manifest,
    utils::fs,
};
use crate::config::ProductDescriptor;
use std::{
    future::Future,
    path::{Path, PathBuf},
};

/// Archive-relative directory holding product archives in source packages.
pub const ARCHIVES_DIR: &str = "ARCHIVES";

/// Name of the tarball a VCS product is converted to.
pub fn snapshot_name(product: &str) -> String {
    format!("{product}.tgz")
}

/// The build subsystem operations a snapshot needs.
///
/// Both calls block until the underlying tool finishes; there is no timeout.
pub trait BuildDriver {
    /// Discards the local source trees (and patches) of `products`.
    fn clean_sources(&self, products: &[String]) -> impl Future<Output = Result<()>> + Send;

    /// Fetches pristine source trees of `products`.
    fn fetch_sources(&self, products: &[String]) -> impl Future<Output = Result<()>> + Send;
}

/// Runs the build driver executable.
///
/// ```text
/// <executable> clean <application> --sources --products A,B
/// <executable> source <application> --products A,B
/// ```
#[derive(Debug, Clone)]
pub struct CommandDriver {
    executable: PathBuf,
    application: String,
}

impl CommandDriver {
    /// Driver for `application`. A bare executable name is looked up in
    /// `PATH` on first use.
    pub fn new(executable: impl Into<PathBuf>, application: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            application: application.into(),
        }
    }

    fn resolve(&self) -> Result<PathBuf> {
        let exe = &self.executable;
        if exe.components().count() == 1 && !exe.exists() {
            return which::which(exe).map_err(|e| {
                Error::GenericError(format!("build driver `{}` not found: {e}", exe.display()))
            });
        }
        Ok(exe.clone())
    }

    async fn run(&self, args: &[&str]) -> Result<()> {
        let executable = self.resolve()?;
        let command = format!("{} {}", executable.display(), args.join(" "));
        log::info!("Running {command}");

        let status = tokio::process::Command::new(&executable)
            .args(args)
            .status()
            .await
            .map_err(|e| Error::Driver {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(Error::Driver {
                command,
                reason: format!("exit code {:?}", status.code()),
            });
        }
        Ok(())
    }
}

impl BuildDriver for CommandDriver {
    async fn clean_sources(&self, products: &[String]) -> Result<()> {
        let list = products.join(",");
        self.run(&["clean", self.application.as_str(), "--sources", "--products", list.as_str()])
            .await
    }

    async fn fetch_sources(&self, products: &[String]) -> Result<()> {
        let list = products.join(",");
        self.run(&["source", self.application.as_str(), "--products", list.as_str()])
            .await
    }
}

/// Re-fetches every product in `products` and packs each source tree into
/// `<work_dir>/<name>.tgz`.
///
/// Driver failures are returned as is and abort the whole conversion.
pub async fn snapshot<D: BuildDriver>(
    products: &[ProductDescriptor],
    driver: &D,
    work_dir: &Path,
    filter: &ExclusionFilter,
) -> Result<Manifest> {
    let mut manifest = Manifest::new();
    if products.is_empty() {
        return Ok(manifest);
    }

    let names: Vec<String> = products.iter().map(|p| p.name.clone()).collect();
    log::info!("Cleaning sources of {}", names.join(", "));
    driver.clean_sources(&names).await?;
    log::info!("Fetching sources of {}", names.join(", "));
    driver.fetch_sources(&names).await?;

    fs::create_dir_all(work_dir).await?;

    for product in products {
        let source_dir = product
            .source_dir
            .clone()
            .with_context(|| format!("product {} has no source directory", product.name))?;
        let file_name = snapshot_name(&product.name);
        let tarball = work_dir.join(&file_name);

        log::debug!("Packing {} into {}", source_dir.display(), tarball.display());
        let (src, dest, name, filter) = (
            source_dir,
            tarball.clone(),
            product.name.clone(),
            filter.clone(),
        );
        tokio::task::spawn_blocking(move || archive::pack_directory(&src, &dest, &name, &filter))
            .await
            .map_err(|e| Error::GenericError(format!("packing task panicked: {e}")))??;

        manifest.add(
            format!("{} (vcs archive)", product.name),
            tarball,
            Path::new(ARCHIVES_DIR).join(file_name),
        )?;
    }

    Ok(manifest)
}
