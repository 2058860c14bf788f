//! What the caller asked to be packed.

use super::{Error, Result};
use crate::config::ProductDescriptor;
use std::{fmt, path::PathBuf, str::FromStr};

/// Excludes products whose property equals a value (`<property>:<value>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFilter {
    property: String,
    value: String,
}

impl PropertyFilter {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    /// True if `product` must be left out.
    pub fn matches(&self, product: &ProductDescriptor) -> bool {
        product.property(&self.property) == Some(self.value.as_str())
    }
}

impl FromStr for PropertyFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((property, value)) if !property.is_empty() && !value.contains(':') => {
                Ok(Self::new(property, value))
            }
            _ => Err(Error::GenericError(format!(
                "invalid property filter `{s}`, expected <property>:<value>"
            ))),
        }
    }
}

impl fmt::Display for PropertyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.value)
    }
}

/// One packaging run.
///
/// Binary, source and tools content may be combined in a single archive;
/// a project archive stands alone.
#[derive(Debug, Clone, Default)]
pub struct PackageRequest {
    /// Pack installed binaries with a launcher.
    pub binaries: bool,
    /// Pack product sources, the project tree and the tools.
    pub sources: bool,
    /// Pack the named project.
    pub project: Option<String>,
    /// Pack the tools.
    pub tools: bool,
    /// Missing installs or sources are warnings instead of errors.
    pub force_creation: bool,
    /// Keep VCS products as VCS references instead of snapshotting them.
    pub with_vcs: bool,
    /// Leave out products flagged `is_commercial`.
    pub without_commercial: bool,
    /// Archive name or path.
    pub name: Option<PathBuf>,
    /// Extra files added at the archive root.
    pub add_files: Vec<PathBuf>,
    pub without_property: Option<PropertyFilter>,
}

impl PackageRequest {
    /// Checks that the request asks for something coherent.
    pub fn validate(&self) -> Result<()> {
        if !self.binaries && !self.sources && self.project.is_none() && !self.tools {
            return Err(Error::GenericError(
                "nothing to pack: request binaries, sources, a project or the tools".into(),
            ));
        }
        if self.project.is_some() && (self.binaries || self.sources) {
            return Err(Error::GenericError(
                "a project package cannot also hold binaries or sources".into(),
            ));
        }
        Ok(())
    }

    /// Products to pack, in declaration order.
    pub fn select_products(&self, products: &[ProductDescriptor]) -> Vec<ProductDescriptor> {
        products
            .iter()
            .filter(|p| {
                if self.without_commercial && p.is_commercial() {
                    log::info!("Leaving out commercial product {}", p.name);
                    return false;
                }
                if let Some(filter) = &self.without_property {
                    if filter.matches(p) {
                        log::info!("Leaving out {} ({filter})", p.name);
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect()
    }
}
