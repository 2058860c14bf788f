//! Declarative descriptor files (`*.pyconf`).
//!
//! Descriptors are TOML documents. Files written by this crate start with
//! [`DESCRIPTOR_HEADER`], matching hand-authored descriptors. Keys this crate
//! does not interpret are kept in `other` and written back untouched.

use super::SourceKind;
use crate::package::{Error, ErrorExt, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;

/// Two-line header prefixed to every written descriptor.
pub const DESCRIPTOR_HEADER: &str = "#!/usr/bin/env python\n#-*- coding:utf-8 -*-\n";

/// Extension of descriptor files.
pub const DESCRIPTOR_EXTENSION: &str = "pyconf";

/// Variable holding the project root inside project descriptors.
pub const PROJECT_PATH_VAR: &str = "${project_path}";

/// Variable resolved by the configuration system to the directory holding
/// the descriptor being read.
pub const DESCRIPTOR_DIR_VAR: &str = "${descriptor_dir}";

/// Variable resolved to the directory of the packaged tools.
pub const TOOLS_DIR_VAR: &str = "${tools_dir}";

/// File name of a descriptor for `name`.
pub fn descriptor_file_name(name: &str) -> String {
    format!("{name}.{DESCRIPTOR_EXTENSION}")
}

/// A product descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFile {
    pub name: String,

    pub get_source: SourceKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compil_script: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patches: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environ: Option<EnvironSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_info: Option<ArchiveInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_info: Option<toml::Table>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svn_info: Option<toml::Table>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvs_info: Option<toml::Table>,

    #[serde(flatten)]
    pub other: toml::Table,
}

/// `[environ]` section of a product descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_script: Option<String>,

    #[serde(flatten)]
    pub other: toml::Table,
}

/// `[archive_info]` section of a product descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    pub archive_name: String,

    #[serde(flatten)]
    pub other: toml::Table,
}

impl ProductFile {
    /// Drops every repository section.
    pub fn clear_vcs_info(&mut self) {
        self.git_info = None;
        self.svn_info = None;
        self.cvs_info = None;
    }
}

/// An application descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationFile {
    pub name: String,

    pub workdir: String,

    /// `no` forbids reusing a shared base installation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(flatten)]
    pub other: toml::Table,
}

/// A project descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,

    #[serde(rename = "ARCHIVEPATH", default, skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<String>,

    #[serde(rename = "APPLICATIONPATH", default, skip_serializing_if = "Option::is_none")]
    pub application_path: Option<String>,

    #[serde(rename = "PRODUCTPATH", default, skip_serializing_if = "Option::is_none")]
    pub product_path: Option<String>,

    #[serde(rename = "JOBPATH", default, skip_serializing_if = "Option::is_none")]
    pub job_path: Option<String>,

    #[serde(rename = "MACHINEPATH", default, skip_serializing_if = "Option::is_none")]
    pub machine_path: Option<String>,

    #[serde(flatten)]
    pub other: toml::Table,
}

/// The five well-known directory keys of a project descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectPathKey {
    Archives,
    Applications,
    Products,
    Jobs,
    Machines,
}

impl ProjectPathKey {
    pub const ALL: [ProjectPathKey; 5] = [
        ProjectPathKey::Archives,
        ProjectPathKey::Applications,
        ProjectPathKey::Products,
        ProjectPathKey::Jobs,
        ProjectPathKey::Machines,
    ];

    /// Key name in the descriptor.
    pub fn key(self) -> &'static str {
        match self {
            ProjectPathKey::Archives => "ARCHIVEPATH",
            ProjectPathKey::Applications => "APPLICATIONPATH",
            ProjectPathKey::Products => "PRODUCTPATH",
            ProjectPathKey::Jobs => "JOBPATH",
            ProjectPathKey::Machines => "MACHINEPATH",
        }
    }

    /// Fixed directory name inside project archives.
    pub fn archive_dir(self) -> &'static str {
        match self {
            ProjectPathKey::Archives => "archives",
            ProjectPathKey::Applications => "applications",
            ProjectPathKey::Products => "products",
            ProjectPathKey::Jobs => "jobs",
            ProjectPathKey::Machines => "machines",
        }
    }
}

impl ProjectFile {
    pub fn path(&self, key: ProjectPathKey) -> Option<&str> {
        self.slot(key).as_deref()
    }

    pub fn set_path(&mut self, key: ProjectPathKey, value: String) {
        *self.slot_mut(key) = Some(value);
    }

    fn slot(&self, key: ProjectPathKey) -> &Option<String> {
        match key {
            ProjectPathKey::Archives => &self.archive_path,
            ProjectPathKey::Applications => &self.application_path,
            ProjectPathKey::Products => &self.product_path,
            ProjectPathKey::Jobs => &self.job_path,
            ProjectPathKey::Machines => &self.machine_path,
        }
    }

    fn slot_mut(&mut self, key: ProjectPathKey) -> &mut Option<String> {
        match key {
            ProjectPathKey::Archives => &mut self.archive_path,
            ProjectPathKey::Applications => &mut self.application_path,
            ProjectPathKey::Products => &mut self.product_path,
            ProjectPathKey::Jobs => &mut self.job_path,
            ProjectPathKey::Machines => &mut self.machine_path,
        }
    }
}

/// Parses descriptor text. `path` is only used in error messages.
pub fn parse_descriptor<T: DeserializeOwned>(text: &str, path: &Path) -> Result<T> {
    toml::from_str(text).map_err(|e| Error::Descriptor {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Reads and parses a descriptor file. A missing file is a descriptor error.
pub async fn read_descriptor<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(Error::Descriptor {
            path: path.to_path_buf(),
            reason: "file not found".into(),
        });
    }
    let text = tokio::fs::read_to_string(path)
        .await
        .fs_context("reading descriptor", path)?;
    parse_descriptor(&text, path)
}

/// Serializes a descriptor, header first.
///
/// Output is deterministic: keys of flattened tables are sorted and plain
/// values always precede sub-tables.
pub fn render_descriptor<T: Serialize>(descriptor: &T) -> Result<String> {
    let value = toml::Value::try_from(descriptor)?;
    let body = toml::to_string(&value)?;
    Ok(format!("{DESCRIPTOR_HEADER}\n{body}"))
}

/// Writes a descriptor file, creating parent directories.
pub async fn write_descriptor<T: Serialize>(path: &Path, descriptor: &T) -> Result<()> {
    let text = render_descriptor(descriptor)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating descriptor directory", parent)?;
    }
    tokio::fs::write(path, text)
        .await
        .fs_context("writing descriptor", path)
}
