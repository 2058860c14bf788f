//! Resolved product entries.

use serde::Deserialize;
use std::{collections::BTreeMap, path::PathBuf};

/// Property opting a product's source directory into binary packages.
pub const PROP_SOURCES_IN_PACKAGE: &str = "sources_in_package";
/// Property disabling compilation (`compilation = "no"`).
pub const PROP_COMPILATION: &str = "compilation";
/// Property marking a product as a plugin rather than an application module.
pub const PROP_PLUGIN: &str = "is_plugin";
/// Property marking a product as shipped under a commercial license.
pub const PROP_COMMERCIAL: &str = "is_commercial";

/// How a product's sources are obtained, as written in descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Prebuilt or source archive.
    Archive,
    /// Git checkout.
    Git,
    /// Subversion checkout.
    Svn,
    /// CVS checkout.
    Cvs,
    /// System package.
    Native,
    /// Pre-installed, supplied as-is.
    Fixed,
}

/// Coarse acquisition class used by the manifest builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquisitionKind {
    Archive,
    Vcs,
    Native,
    Fixed,
}

impl SourceKind {
    pub fn acquisition(self) -> AcquisitionKind {
        match self {
            SourceKind::Archive => AcquisitionKind::Archive,
            SourceKind::Git | SourceKind::Svn | SourceKind::Cvs => AcquisitionKind::Vcs,
            SourceKind::Native => AcquisitionKind::Native,
            SourceKind::Fixed => AcquisitionKind::Fixed,
        }
    }
}

/// A product as resolved by the configuration system.
///
/// Paths are absolute on the building machine. `install_dir` is configured for
/// every buildable product; whether it exists on disk tells whether the
/// product was installed.
///
/// ```toml
/// [[products]]
/// name = "GEOM"
/// get_source = "git"
/// descriptor = "/work/project/products/GEOM.pyconf"
/// install_dir = "/work/SALOME/INSTALL/GEOM"
/// source_dir = "/work/SALOME/SOURCES/GEOM"
/// compil_script = "/work/project/products/compil_scripts/GEOM.sh"
/// patches = ["/work/project/products/patches/geom-fix.patch"]
///
/// [products.properties]
/// sources_in_package = "yes"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductDescriptor {
    pub name: String,

    pub get_source: SourceKind,

    /// Canonical descriptor file of the product.
    #[serde(default)]
    pub descriptor: Option<PathBuf>,

    /// Existing archive file, for archive-acquired products.
    #[serde(default)]
    pub archive: Option<PathBuf>,

    #[serde(default)]
    pub install_dir: Option<PathBuf>,

    #[serde(default)]
    pub source_dir: Option<PathBuf>,

    /// Sub-components of a multi-binary product, each installed next to
    /// the product's own install directory.
    #[serde(default)]
    pub components: Vec<String>,

    #[serde(default)]
    pub compil_script: Option<PathBuf>,

    #[serde(default)]
    pub env_script: Option<PathBuf>,

    #[serde(default)]
    pub patches: Vec<PathBuf>,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl ProductDescriptor {
    /// Creates a product with no paths and no properties.
    pub fn new(name: impl Into<String>, get_source: SourceKind) -> Self {
        Self {
            name: name.into(),
            get_source,
            descriptor: None,
            archive: None,
            install_dir: None,
            source_dir: None,
            components: Vec::new(),
            compil_script: None,
            env_script: None,
            patches: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn acquisition(&self) -> AcquisitionKind {
        self.get_source.acquisition()
    }

    pub fn is_vcs(&self) -> bool {
        self.acquisition() == AcquisitionKind::Vcs
    }

    pub fn is_native(&self) -> bool {
        self.acquisition() == AcquisitionKind::Native
    }

    pub fn is_fixed(&self) -> bool {
        self.acquisition() == AcquisitionKind::Fixed
    }

    /// Value of a property, if set.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// True when `key` is set to `yes`.
    pub fn property_is_yes(&self, key: &str) -> bool {
        self.property(key) == Some("yes")
    }

    /// Products are buildable unless `compilation = "no"`.
    pub fn is_buildable(&self) -> bool {
        self.property(PROP_COMPILATION) != Some("no")
    }

    /// Native and fixed products are never packed as installations.
    pub fn ships_binaries(&self) -> bool {
        !self.is_native() && !self.is_fixed() && self.is_buildable()
    }

    /// True when the install directory is configured and exists on disk.
    pub fn is_installed(&self) -> bool {
        self.install_dir.as_deref().is_some_and(|dir| dir.is_dir())
    }

    /// True when the source directory is configured and exists on disk.
    pub fn has_sources(&self) -> bool {
        self.source_dir.as_deref().is_some_and(|dir| dir.is_dir())
    }

    pub fn sources_in_package(&self) -> bool {
        self.property_is_yes(PROP_SOURCES_IN_PACKAGE)
    }

    pub fn is_plugin(&self) -> bool {
        self.property_is_yes(PROP_PLUGIN)
    }

    pub fn is_commercial(&self) -> bool {
        self.property_is_yes(PROP_COMMERCIAL)
    }

    pub fn is_composite(&self) -> bool {
        !self.components.is_empty()
    }

    /// Install directory of a sub-component: a sibling of the product's own.
    pub fn component_install_dir(&self, component: &str) -> Option<PathBuf> {
        let install_dir = self.install_dir.as_deref()?;
        Some(match install_dir.parent() {
            Some(parent) => parent.join(component),
            None => PathBuf::from(component),
        })
    }
}
