//! Archive manifests: what goes into the archive, from where, under which name.

use super::error::{Error, Result};
use std::path::{Path, PathBuf};

/// One file or directory to pack.
///
/// Entries are value objects: built once by a manifest producer and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    label: String,
    local_path: PathBuf,
    archive_path: PathBuf,
}

impl ManifestEntry {
    /// Creates an entry packing `local_path` as `archive_path`.
    pub fn new(
        label: impl Into<String>,
        local_path: impl Into<PathBuf>,
        archive_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            local_path: local_path.into(),
            archive_path: archive_path.into(),
        }
    }

    /// Human-readable label, unique within a manifest.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Path on the building machine.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Destination relative to the archive root.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }
}

/// Ordered set of [`ManifestEntry`] values with unique labels.
///
/// Insertion order is preserved and is the order entries are written to the
/// archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateLabel`] when the label is already taken.
    pub fn push(&mut self, entry: ManifestEntry) -> Result<()> {
        if self.contains(entry.label()) {
            return Err(Error::DuplicateLabel(entry.label));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Shorthand for `push(ManifestEntry::new(..))`.
    pub fn add(
        &mut self,
        label: impl Into<String>,
        local_path: impl Into<PathBuf>,
        archive_path: impl Into<PathBuf>,
    ) -> Result<()> {
        self.push(ManifestEntry::new(label, local_path, archive_path))
    }

    /// Moves every entry of `other` to the end of this manifest.
    pub fn merge(&mut self, other: Manifest) -> Result<()> {
        for entry in other.entries {
            self.push(entry)?;
        }
        Ok(())
    }

    /// Looks up an entry by label.
    pub fn get(&self, label: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    /// True if an entry with `label` exists.
    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
