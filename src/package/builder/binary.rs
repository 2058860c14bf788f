//! Binary package manifests.

use super::BuildContext;
use crate::{
    config::ProductDescriptor,
    package::{
        Error, Result,
        launcher::{self, LauncherContext, ShellFlavor},
        manifest::Manifest,
        report::MissingArtifactReport,
        request::PackageRequest,
        utils::fs,
    },
};
use std::path::{Path, PathBuf};

/// Archive-relative directory of sources shipped with binaries.
pub const SOURCES_DIR: &str = "SOURCES";

/// Prefix of the launcher copy added when sources share the archive root.
pub const SOURCES_LAUNCHER_PREFIX: &str = "bin_";

/// A binary manifest and whatever was found missing while building it.
#[derive(Debug, Default)]
pub struct BinaryManifest {
    pub manifest: Manifest,
    /// Non-empty only when the request forces creation.
    pub missing: MissingArtifactReport,
}

/// Builds the manifest of a binary package.
///
/// Native, fixed and non-buildable products are skipped. A product without
/// an install directory (or without sources when it asks for them) aborts
/// the build with [`Error::MissingArtifacts`] unless
/// [`PackageRequest::force_creation`] is set, in which case it is only
/// reported.
pub async fn build_binary_manifest(
    ctx: &BuildContext<'_>,
    products: &[ProductDescriptor],
    request: &PackageRequest,
) -> Result<BinaryManifest> {
    let binaries_root = ctx.config.binaries_root();
    let mut manifest = Manifest::new();
    let mut missing = MissingArtifactReport::default();

    for product in products {
        if product.ships_binaries() {
            match product.install_dir.as_deref() {
                Some(install_dir) if product.is_installed() => {
                    manifest.add(
                        format!("{} (bin)", product.name),
                        install_dir,
                        Path::new(&binaries_root).join(&product.name),
                    )?;
                    for component in &product.components {
                        if let Some(dir) = product.component_install_dir(component) {
                            manifest.add(
                                format!("{component} (bin)"),
                                dir,
                                Path::new(&binaries_root).join(component),
                            )?;
                        }
                    }
                }
                _ => missing.missing_installs.push(product.name.clone()),
            }
        }

        if product.sources_in_package() {
            match product.source_dir.as_deref() {
                Some(source_dir) if product.has_sources() => {
                    manifest.add(
                        format!("{} (sources)", product.name),
                        source_dir,
                        Path::new(SOURCES_DIR).join(&product.name),
                    )?;
                }
                _ => missing.missing_sources.push(product.name.clone()),
            }
        }
    }

    if !missing.is_empty() {
        if !request.force_creation {
            return Err(Error::MissingArtifacts(missing));
        }
        log::warn!("{}", missing.forced_warning());
    }

    let application = ctx.config.require_application("a binary package")?;
    let flavor = ShellFlavor::for_platform(&ctx.config.platform);
    let out_dir = ctx.work_dir.join("binary");
    fs::create_dir_all(&out_dir).await?;

    match &application.profile {
        Some(profile) => {
            let lctx = LauncherContext {
                application: &application.name,
                products,
                binaries_root: &binaries_root,
                flavor,
            };
            let launcher =
                launcher::produce_launcher(ctx.templates, ctx.environment, &lctx, profile, &out_dir)
                    .await?;
            let launcher_name = fs::file_name(&launcher)?;
            manifest.add("launcher", &launcher, &launcher_name)?;

            let env_file =
                launcher::produce_env_file(ctx.templates, ctx.environment, &lctx, &out_dir).await?;
            manifest.add("environment file", &env_file, fs::file_name(&env_file)?)?;

            if ctx.config.platform.windows {
                let link =
                    launcher::produce_launch_link(ctx.templates, flavor, &launcher_name, &out_dir)
                        .await?;
                manifest.add("launcher (link)", &link, fs::file_name(&link)?)?;
            }

            if request.sources {
                manifest.add(
                    "launcher (sources)",
                    &launcher,
                    PathBuf::from(format!("{SOURCES_LAUNCHER_PREFIX}{launcher_name}")),
                )?;
            }
        }
        None => {
            let script = launcher::produce_appli_script(
                ctx.templates,
                &application.name,
                products,
                &binaries_root,
                &out_dir,
            )
            .await?;
            manifest.add(
                "application creation script",
                &script,
                launcher::CREATE_APPLI_NAME,
            )?;
        }
    }

    Ok(BinaryManifest { manifest, missing })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{
            ApplicationConfig, Config, LauncherProfile, PROP_SOURCES_IN_PACKAGE, Platform,
            SourceKind,
        },
        package::{launcher::ProductEnvironment, resources::Templates},
    };

    fn installed(root: &Path, name: &str, kind: SourceKind) -> ProductDescriptor {
        let dir = root.join("INSTALL").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let mut p = ProductDescriptor::new(name, kind);
        p.install_dir = Some(dir);
        p
    }

    fn config(root: &Path, profile: Option<&str>, windows: bool) -> Config {
        Config {
            platform: Platform {
                tag: "CO7".into(),
                windows,
            },
            application: Some(ApplicationConfig {
                name: "APP".into(),
                workdir: root.join("APP"),
                descriptor: root.join("APP.pyconf"),
                package_dir: None,
                profile: profile.map(|product| LauncherProfile {
                    product: product.into(),
                    launcher_name: "salome".into(),
                    launcher_command: PathBuf::from("bin/salome/runSalome"),
                }),
            }),
            ..Default::default()
        }
    }

    async fn build(
        config: &Config,
        products: &[ProductDescriptor],
        request: &PackageRequest,
        work_dir: &Path,
    ) -> Result<BinaryManifest> {
        let templates = Templates::embedded().unwrap();
        let ctx = BuildContext {
            config,
            templates: &templates,
            environment: &ProductEnvironment,
            work_dir,
        };
        build_binary_manifest(&ctx, products, request).await
    }

    #[tokio::test]
    async fn native_products_are_exempt() {
        let dir = tempfile::tempdir().unwrap();
        let products = vec![
            installed(dir.path(), "A", SourceKind::Archive),
            installed(dir.path(), "B", SourceKind::Git),
            ProductDescriptor::new("C", SourceKind::Native),
        ];
        let config = config(dir.path(), Some("A"), false);

        let built = build(&config, &products, &PackageRequest::default(), &dir.path().join("w"))
            .await
            .unwrap();
        let labels: Vec<_> = built.manifest.labels().collect();
        assert_eq!(labels, ["A (bin)", "B (bin)", "launcher", "environment file"]);
        assert!(built.missing.is_empty());
        assert_eq!(
            built.manifest.get("B (bin)").unwrap().archive_path(),
            Path::new("BINARIES-CO7/B")
        );
    }

    #[tokio::test]
    async fn missing_install_aborts_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let mut absent = ProductDescriptor::new("GEOM", SourceKind::Git);
        absent.install_dir = Some(dir.path().join("INSTALL/GEOM"));
        let products = vec![installed(dir.path(), "KERNEL", SourceKind::Git), absent];
        let config = config(dir.path(), Some("KERNEL"), false);

        let res = build(&config, &products, &PackageRequest::default(), &dir.path().join("w")).await;
        match res {
            Err(Error::MissingArtifacts(report)) => assert_eq!(report.missing_installs, ["GEOM"]),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!dir.path().join("w/binary").exists());

        let forced = PackageRequest {
            force_creation: true,
            ..Default::default()
        };
        let built = build(&config, &products, &forced, &dir.path().join("w"))
            .await
            .unwrap();
        assert_eq!(built.missing.missing_installs, ["GEOM"]);
        assert!(built.manifest.contains("KERNEL (bin)"));
        assert!(!built.manifest.contains("GEOM (bin)"));
    }

    #[tokio::test]
    async fn components_and_sources() {
        let dir = tempfile::tempdir().unwrap();
        let mut smesh = installed(dir.path(), "SMESH", SourceKind::Git);
        smesh.components = vec!["NETGENPLUGIN".into()];
        smesh
            .properties
            .insert(PROP_SOURCES_IN_PACKAGE.into(), "yes".into());
        let src = dir.path().join("SOURCES/SMESH");
        std::fs::create_dir_all(&src).unwrap();
        smesh.source_dir = Some(src.clone());
        let config = config(dir.path(), None, false);

        let built = build(&config, &[smesh], &PackageRequest::default(), &dir.path().join("w"))
            .await
            .unwrap();
        let component = built.manifest.get("NETGENPLUGIN (bin)").unwrap();
        assert_eq!(component.local_path(), dir.path().join("INSTALL/NETGENPLUGIN"));
        assert_eq!(component.archive_path(), Path::new("BINARIES-CO7/NETGENPLUGIN"));
        let sources = built.manifest.get("SMESH (sources)").unwrap();
        assert_eq!(sources.local_path(), src);
        assert_eq!(sources.archive_path(), Path::new("SOURCES/SMESH"));
        assert!(built.manifest.contains("application creation script"));
        assert!(!built.manifest.contains("launcher"));
    }

    #[tokio::test]
    async fn missing_sources_are_reported_separately() {
        let dir = tempfile::tempdir().unwrap();
        let mut geom = installed(dir.path(), "GEOM", SourceKind::Git);
        geom.properties
            .insert(PROP_SOURCES_IN_PACKAGE.into(), "yes".into());
        let config = config(dir.path(), None, false);

        let res = build(&config, &[geom], &PackageRequest::default(), &dir.path().join("w")).await;
        match res {
            Err(Error::MissingArtifacts(report)) => {
                assert!(report.missing_installs.is_empty());
                assert_eq!(report.missing_sources, ["GEOM"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn windows_gets_a_link_and_sources_a_second_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let products = vec![installed(dir.path(), "KERNEL", SourceKind::Git)];
        let config = config(dir.path(), Some("KERNEL"), true);
        let request = PackageRequest {
            binaries: true,
            sources: true,
            ..Default::default()
        };

        let built = build(&config, &products, &request, &dir.path().join("w"))
            .await
            .unwrap();
        let m = &built.manifest;
        assert_eq!(m.get("launcher").unwrap().archive_path(), Path::new("salome.bat"));
        assert_eq!(
            m.get("environment file").unwrap().archive_path(),
            Path::new("env_launch.bat")
        );
        assert_eq!(
            m.get("launcher (link)").unwrap().archive_path(),
            Path::new("launch_salome.bat")
        );
        let copy = m.get("launcher (sources)").unwrap();
        assert_eq!(copy.archive_path(), Path::new("bin_salome.bat"));
        assert_eq!(copy.local_path(), m.get("launcher").unwrap().local_path());
    }
}
