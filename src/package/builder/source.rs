//! Source package manifests.
//!
//! A source package holds everything needed to rebuild the application
//! offline: every product's source archive under `ARCHIVES/`, the project
//! tree describing them, and a copy of the tools.

use super::BuildContext;
use crate::{
    config::{AcquisitionKind, Config, ProductDescriptor},
    package::{
        Result,
        error::Context,
        manifest::Manifest,
        project_tree,
        request::PackageRequest,
        utils::fs,
        vcs::{self, ARCHIVES_DIR, BuildDriver},
    },
};
use std::path::{Path, PathBuf};

/// Archive-relative directory of the tools copy.
pub const TOOLS_DIR: &str = "salomeTools";

/// Name of the link to the tools entry point at the archive root.
pub const TOOLS_LINK: &str = "sat";

/// Builds the manifest of a source package.
///
/// VCS products are re-fetched and snapshotted through `driver` unless the
/// request keeps them as VCS references.
pub async fn build_source_manifest<D: BuildDriver>(
    ctx: &BuildContext<'_>,
    products: &[ProductDescriptor],
    request: &PackageRequest,
    driver: &D,
) -> Result<Manifest> {
    let application = ctx.config.require_application("a source package")?;
    let mut manifest = archive_products(products)?;

    if !request.with_vcs {
        let vcs_products: Vec<ProductDescriptor> =
            products.iter().filter(|p| p.is_vcs()).cloned().collect();
        let snapshots = vcs::snapshot(
            &vcs_products,
            driver,
            &ctx.work_dir.join("vcs"),
            &ctx.filter(),
        )
        .await?;
        manifest.merge(snapshots)?;
    }

    let tree = project_tree::materialize(
        ctx.templates,
        products,
        application,
        ctx.work_dir,
        request.with_vcs,
    )
    .await?;
    manifest.add("project", tree.root(), project_tree::PROJECT_DIR)?;

    manifest.merge(tools_manifest(ctx.config, ctx.work_dir).await?)?;
    Ok(manifest)
}

/// Entries for products shipped as their existing source archive.
fn archive_products(products: &[ProductDescriptor]) -> Result<Manifest> {
    let mut manifest = Manifest::new();
    for product in products
        .iter()
        .filter(|p| p.acquisition() == AcquisitionKind::Archive)
    {
        let archive = product
            .archive
            .as_deref()
            .with_context(|| format!("archive product {} has no archive file", product.name))?;
        manifest.add(
            format!("{} (archive)", product.name),
            archive,
            Path::new(ARCHIVES_DIR).join(fs::file_name(archive)?),
        )?;
    }
    Ok(manifest)
}

/// Entries for the tools copy and, where symbolic links exist, the `sat`
/// link pointing into it.
pub async fn tools_manifest(config: &Config, work_dir: &Path) -> Result<Manifest> {
    let root = config.require_tools_root()?;
    let mut manifest = Manifest::new();
    manifest.add("salomeTools", root, TOOLS_DIR)?;

    #[cfg(unix)]
    {
        let link_dir = work_dir.join("tools");
        fs::create_dir_all(&link_dir).await?;
        let link = link_dir.join(TOOLS_LINK);
        fs::replace_symlink(&Path::new(TOOLS_DIR).join(TOOLS_LINK), &link).await?;
        manifest.add("sat (link)", link, PathBuf::from(TOOLS_LINK))?;
    }
    #[cfg(not(unix))]
    {
        let _ = work_dir;
        log::debug!("No symbolic links on this platform, skipping the {TOOLS_LINK} link");
    }

    Ok(manifest)
}
