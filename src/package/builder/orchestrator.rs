//! Packaging orchestration.

use super::{
    BuildContext, README_NAME, build_binary_manifest, build_project_manifest,
    build_source_manifest, calculate_sha256, produce_readme, tools_manifest,
};
use crate::{
    config::{Config, ProductDescriptor},
    package::{
        Error, Result,
        archive::{self, ExclusionFilter},
        error::ErrorExt,
        launcher::{EnvironmentWriter, ProductEnvironment},
        manifest::Manifest,
        report::MissingArtifactReport,
        request::PackageRequest,
        resources::Templates,
        utils::fs,
        vcs::{BuildDriver, CommandDriver},
    },
};
use path_absolutize::Absolutize;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use uuid::Uuid;

/// Extension given to archive names that carry none.
const ARCHIVE_EXTENSION: &str = ".tgz";

/// A finished archive.
#[derive(Debug, Clone)]
pub struct PackagedArchive {
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256.
    pub checksum: String,
    /// False if at least one manifest entry could not be written.
    pub success: bool,
    /// Number of manifest entries.
    pub entries: usize,
    /// Missing artifacts tolerated by the force policy.
    pub missing: MissingArtifactReport,
}

/// Every entry of a request, before anything is archived.
#[derive(Debug, Default)]
pub struct BuiltManifest {
    pub manifest: Manifest,
    pub missing: MissingArtifactReport,
}

/// Builds archives from a resolved configuration.
///
/// Templates are loaded once when the packager is created. Each
/// [`package`](Packager::package) call owns a fresh working directory,
/// `<tmp>/satpack-<uuid>`, removed once the archive is written.
pub struct Packager<D = CommandDriver> {
    config: Config,
    templates: Templates,
    environment: Box<dyn EnvironmentWriter>,
    driver: D,
}

impl<D> std::fmt::Debug for Packager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packager")
            .field("config", &self.config)
            .field("templates", &self.templates)
            .field("environment", &"<EnvironmentWriter>")
            .finish_non_exhaustive()
    }
}

impl Packager<CommandDriver> {
    /// Packager running the configured build driver executable (`sat` from
    /// `PATH` when none is configured).
    pub fn new(config: Config) -> Result<Self> {
        let executable = config
            .tools
            .driver_executable()
            .unwrap_or_else(|| PathBuf::from("sat"));
        let application = config
            .application
            .as_ref()
            .map(|app| app.name.clone())
            .unwrap_or_default();
        Self::with_driver(config, CommandDriver::new(executable, application))
    }
}

impl<D: BuildDriver> Packager<D> {
    /// Packager using `driver` to re-fetch VCS sources.
    pub fn with_driver(config: Config, driver: D) -> Result<Self> {
        Ok(Self {
            config,
            templates: Templates::embedded()?,
            environment: Box::new(ProductEnvironment),
            driver,
        })
    }

    /// Replaces the environment writer used by launchers.
    pub fn environment(mut self, environment: impl EnvironmentWriter + 'static) -> Self {
        self.environment = Box::new(environment);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds and writes the archive for `request`.
    ///
    /// # Errors
    ///
    /// Fails before anything is written when the request is invalid, when
    /// artifacts are missing and creation is not forced, or when a
    /// descriptor or the build driver fails. Entries that cannot be read
    /// while writing do not fail the call; they clear
    /// [`PackagedArchive::success`].
    pub async fn package(&self, request: &PackageRequest) -> Result<PackagedArchive> {
        request.validate()?;
        let products = request.select_products(&self.config.products);
        let archive_path = self.archive_path(request)?;

        let work_dir = self.work_root().join(format!("satpack-{}", Uuid::new_v4()));
        fs::create_dir_all(&work_dir).await?;
        log::debug!("Working directory {}", work_dir.display());

        let result = self
            .assemble(request, &products, &work_dir, &archive_path)
            .await;

        if let Err(e) = fs::remove_dir_all(&work_dir).await {
            log::warn!("Failed to remove working directory: {e}");
        }
        result
    }

    async fn assemble(
        &self,
        request: &PackageRequest,
        products: &[ProductDescriptor],
        work_dir: &Path,
        archive_path: &Path,
    ) -> Result<PackagedArchive> {
        let BuiltManifest { manifest, missing } =
            self.build_manifest(request, products, work_dir).await?;
        let entries = manifest.len();

        log::info!("Writing {entries} entries to {}", archive_path.display());
        let filter = ExclusionFilter::new(self.config.tools.ignored_extensions.as_slice());
        let path = archive_path.to_path_buf();
        let success = tokio::task::spawn_blocking(move || {
            archive::create_archive(&path, &manifest, &filter)
        })
        .await
        .map_err(|e| Error::GenericError(format!("archive task panicked: {e}")))??;

        let size = tokio::fs::metadata(archive_path)
            .await
            .fs_context("reading archive metadata", archive_path)?
            .len();
        let checksum = calculate_sha256(archive_path).await?;

        Ok(PackagedArchive {
            path: archive_path.to_path_buf(),
            size,
            checksum,
            success,
            entries,
            missing,
        })
    }

    /// Builds the manifest of `request` over `products`, generating files
    /// into `work_dir`.
    pub async fn build_manifest(
        &self,
        request: &PackageRequest,
        products: &[ProductDescriptor],
        work_dir: &Path,
    ) -> Result<BuiltManifest> {
        let ctx = BuildContext {
            config: &self.config,
            templates: &self.templates,
            environment: self.environment.as_ref(),
            work_dir,
        };
        let mut built = BuiltManifest::default();

        if request.binaries {
            let binary = build_binary_manifest(&ctx, products, request).await?;
            built.manifest.merge(binary.manifest)?;
            built.missing = binary.missing;
        }

        if request.sources {
            let sources = build_source_manifest(&ctx, products, request, &self.driver).await?;
            built.manifest.merge(sources)?;
        } else if request.tools {
            built
                .manifest
                .merge(tools_manifest(&self.config, work_dir).await?)?;
        }

        if let Some(project) = &request.project {
            built
                .manifest
                .merge(build_project_manifest(&self.config, project, work_dir).await?)?;
        }

        for file in &request.add_files {
            if !file.exists() {
                log::warn!("{} does not exist, not adding it", file.display());
                continue;
            }
            let file = file
                .absolutize()
                .fs_context("resolving added file", file.as_path())?;
            let Some(name) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                log::warn!("{} has no file name, not adding it", file.display());
                continue;
            };
            built
                .manifest
                .add(format!("{name} (added file)"), file.to_path_buf(), &name)?;
        }

        let readme = produce_readme(&self.templates, &self.config, request, work_dir).await?;
        built.manifest.add("README", readme, README_NAME)?;

        Ok(built)
    }

    /// Where the archive of `request` is written.
    ///
    /// An explicit name containing a directory is used as is; a bare name or a
    /// derived one lands in the application's package directory, or in the
    /// current directory without an application.
    pub fn archive_path(&self, request: &PackageRequest) -> Result<PathBuf> {
        let file = match &request.name {
            Some(name) => with_archive_extension(name),
            None => PathBuf::from(format!("{}{ARCHIVE_EXTENSION}", self.default_stem(request)?)),
        };
        if file.is_absolute() || file.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
            return Ok(file);
        }

        let dir = match &self.config.application {
            Some(app) => app.package_dir(),
            None => std::env::current_dir().fs_context("reading current directory", ".")?,
        };
        Ok(dir.join(file))
    }

    fn default_stem(&self, request: &PackageRequest) -> Result<String> {
        if let Some(project) = &request.project {
            return Ok(format!("PROJECT-{project}"));
        }
        if !request.binaries && !request.sources {
            return Ok(super::TOOLS_DIR.to_string());
        }

        let app = self.config.require_application("naming the archive")?;
        let mut stem = app.name.clone();
        if request.binaries {
            stem.push('-');
            stem.push_str(&self.config.platform.tag);
        }
        if request.sources {
            stem.push_str("-SRC");
        }
        Ok(stem)
    }

    fn work_root(&self) -> PathBuf {
        self.config
            .tools
            .tmp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn with_archive_extension(name: &Path) -> PathBuf {
    let text = name.to_string_lossy();
    if text.ends_with(ARCHIVE_EXTENSION) || text.ends_with(".tar.gz") {
        return name.to_path_buf();
    }
    let mut os: OsString = name.as_os_str().to_owned();
    os.push(ARCHIVE_EXTENSION);
    PathBuf::from(os)
}
