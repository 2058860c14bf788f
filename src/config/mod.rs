//! Resolved configuration loaded from a single TOML file.
//!
//! The configuration system that resolves applications, products and
//! projects lives outside this crate. It hands us one fully resolved file,
//! which we only ever read:
//!
//! ```toml
//! [tools]
//! root = "/opt/salomeTools"
//! ignored_extensions = [".pyc"]
//!
//! [platform]
//! tag = "CO7"
//!
//! [application]
//! name = "SALOME-9"
//! workdir = "/work/SALOME-9"
//! descriptor = "/work/project/applications/SALOME-9.pyconf"
//!
//! [application.profile]
//! product = "SALOME_PROFILE"
//! launcher_name = "salome"
//!
//! [[products]]
//! name = "GEOM"
//! get_source = "git"
//!
//! [projects]
//! salome = "/work/project/salome.pyconf"
//! ```

pub mod descriptor;
mod product;

pub use product::{
    AcquisitionKind, PROP_COMMERCIAL, PROP_COMPILATION, PROP_PLUGIN, PROP_SOURCES_IN_PACKAGE,
    ProductDescriptor, SourceKind,
};

use crate::package::{Error, ErrorExt, Result};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub platform: Platform,

    #[serde(default)]
    pub application: Option<ApplicationConfig>,

    /// Products in declaration order.
    #[serde(default)]
    pub products: Vec<ProductDescriptor>,

    /// Project name to project descriptor file.
    #[serde(default)]
    pub projects: BTreeMap<String, PathBuf>,
}

/// Where this engine lives and how it treats packed trees.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
    /// Root of the engine installation copied into source packages.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Build driver executable. Defaults to `<root>/sat`.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// File name suffixes never packed from directories (`.pyc`, `.tar.gz`, `~`).
    #[serde(default)]
    pub ignored_extensions: Vec<String>,

    /// Parent of temporary working directories. Defaults to the system
    /// temporary directory.
    #[serde(default)]
    pub tmp_dir: Option<PathBuf>,
}

impl ToolsConfig {
    /// Build driver executable, if one can be derived.
    pub fn driver_executable(&self) -> Option<PathBuf> {
        self.executable
            .clone()
            .or_else(|| self.root.as_ref().map(|root| root.join("sat")))
    }
}

/// Target platform of the packed binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Platform {
    /// Short tag used in `BINARIES-<tag>`.
    pub tag: String,
    /// Windows-class target (batch launchers, `.bat` links).
    pub windows: bool,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            tag: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            windows: cfg!(windows),
        }
    }
}

/// The application being packaged.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    pub name: String,

    /// Application working directory.
    pub workdir: PathBuf,

    /// Application descriptor file.
    pub descriptor: PathBuf,

    /// Where archives are written. Defaults to `<workdir>/PACKAGE`.
    #[serde(default)]
    pub package_dir: Option<PathBuf>,

    /// Launcher profile; without one binary packages get an
    /// application-creation script instead of a launcher.
    #[serde(default)]
    pub profile: Option<LauncherProfile>,
}

impl ApplicationConfig {
    pub fn package_dir(&self) -> PathBuf {
        self.package_dir
            .clone()
            .unwrap_or_else(|| self.workdir.join("PACKAGE"))
    }
}

/// Application-level launcher declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LauncherProfile {
    /// Product providing the launcher entry point.
    pub product: String,

    /// File name of the generated launcher.
    pub launcher_name: String,

    /// Entry point, relative to the profile product's install directory.
    #[serde(default = "default_launcher_command")]
    pub launcher_command: PathBuf,
}

fn default_launcher_command() -> PathBuf {
    PathBuf::from("bin/salome/runSalome")
}

impl Config {
    /// Reads and parses the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).fs_context("reading configuration", path)?;
        toml::from_str(&text).map_err(|e| Error::Descriptor {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Product by name.
    pub fn product(&self, name: &str) -> Option<&ProductDescriptor> {
        self.products.iter().find(|p| p.name == name)
    }

    /// Name of the binaries root directory inside binary archives.
    pub fn binaries_root(&self) -> String {
        format!("BINARIES-{}", self.platform.tag)
    }

    /// The application section, or a descriptor error naming the operation
    /// that needed it.
    pub fn require_application(&self, purpose: &str) -> Result<&ApplicationConfig> {
        self.application
            .as_ref()
            .ok_or_else(|| Error::GenericError(format!("{purpose} requires an [application]")))
    }

    /// The engine root, required for source and tools packages.
    pub fn require_tools_root(&self) -> Result<&Path> {
        self.tools
            .root
            .as_deref()
            .ok_or_else(|| Error::GenericError("[tools] root is not configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_minimal_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [platform]
            tag = "CO7"

            [application]
            name = "APP"
            workdir = "/work/APP"
            descriptor = "/work/APP.pyconf"

            [application.profile]
            product = "PROFILE"
            launcher_name = "salome"

            [[products]]
            name = "B"
            get_source = "git"

            [[products]]
            name = "A"
            get_source = "archive"
            "#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.binaries_root(), "BINARIES-CO7");
        let names: Vec<_> = config.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
        let app = config.application.unwrap();
        assert_eq!(app.package_dir(), PathBuf::from("/work/APP/PACKAGE"));
        assert_eq!(
            app.profile.unwrap().launcher_command,
            PathBuf::from("bin/salome/runSalome")
        );
    }

    #[test]
    fn malformed_file_is_a_descriptor_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[products]]\nname = 3\n").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(Error::Descriptor { .. })
        ));
    }
}
