//! Writing manifests into gzip-compressed tar archives.
//!
//! The writer tolerates per-entry failures: an entry that cannot be read is
//! logged as `KO` and the remaining entries are still written. Callers get a
//! single "everything succeeded" flag back.

use super::{
    Result,
    error::ErrorExt,
    manifest::{Manifest, ManifestEntry},
};
use flate2::{Compression, write::GzEncoder};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};
use walkdir::WalkDir;

/// Version-control metadata directories never packed from a directory tree.
pub const VCS_DIRS: [&str; 4] = [".git", ".svn", ".hg", "CVS"];

/// Decides which paths inside recursively added directories are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionFilter {
    suffixes: Vec<String>,
}

impl ExclusionFilter {
    /// Filter dropping VCS directories and files whose name ends with any of
    /// `ignored_extensions`.
    ///
    /// Entries are matched against the whole file name, so multi-part
    /// extensions (`.tar.gz`) and bare suffixes (`~`) both work.
    pub fn new<S: AsRef<str>>(ignored_extensions: &[S]) -> Self {
        Self {
            suffixes: ignored_extensions
                .iter()
                .map(|e| e.as_ref().to_string())
                .filter(|e| !e.trim_start_matches('.').is_empty())
                .collect(),
        }
    }

    /// True if `path` must not be packed.
    pub fn excludes(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if VCS_DIRS.contains(&name) {
            return true;
        }
        self.suffixes
            .iter()
            .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix.as_str()))
    }
}

/// Adds every manifest entry to `archive`.
///
/// Directories are added recursively; paths for which `exclude` returns true
/// are skipped along with everything below them. The entry's own top-level
/// path is never tested against `exclude`.
///
/// Returns `true` only if every entry was added.
pub fn write_all<W: Write>(
    archive: &mut tar::Builder<W>,
    manifest: &Manifest,
    exclude: impl Fn(&Path) -> bool,
) -> bool {
    let mut success = true;
    for entry in manifest {
        match append_entry(archive, entry, &exclude) {
            Ok(()) => log::info!("{:<50} OK", entry.label()),
            Err(e) => {
                log::error!("{:<50} KO ({})", entry.label(), e);
                success = false;
            }
        }
    }
    success
}

fn append_entry<W: Write>(
    archive: &mut tar::Builder<W>,
    entry: &ManifestEntry,
    exclude: &impl Fn(&Path) -> bool,
) -> io::Result<()> {
    let local = entry.local_path();
    let metadata = std::fs::symlink_metadata(local)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", local.display())))?;

    if !metadata.is_dir() {
        return archive.append_path_with_name(local, entry.archive_path());
    }

    let walker = WalkDir::new(local)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !exclude(e.path()));

    for item in walker {
        let item = item.map_err(io::Error::from)?;
        let rel = item.path().strip_prefix(local).map_err(io::Error::other)?;
        let name = if rel.as_os_str().is_empty() {
            entry.archive_path().to_path_buf()
        } else {
            entry.archive_path().join(rel)
        };
        archive.append_path_with_name(item.path(), &name)?;
    }
    Ok(())
}

fn gz_builder(path: &Path) -> Result<tar::Builder<GzEncoder<BufWriter<File>>>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).fs_context("creating archive directory", parent)?;
    }
    let file = File::create(path).fs_context("creating archive", path)?;
    let mut builder = tar::Builder::new(GzEncoder::new(BufWriter::new(file), Compression::default()));
    builder.follow_symlinks(false);
    Ok(builder)
}

fn finish(builder: tar::Builder<GzEncoder<BufWriter<File>>>, path: &Path) -> Result<()> {
    let encoder = builder.into_inner().fs_context("finishing archive", path)?;
    let mut writer = encoder.finish().fs_context("compressing archive", path)?;
    writer.flush().fs_context("flushing archive", path)
}

/// Creates the archive at `path` from `manifest`.
///
/// Failing to create or finish the archive file is an error; failing to add
/// an entry is not, and is reported through the returned flag.
pub fn create_archive(path: &Path, manifest: &Manifest, filter: &ExclusionFilter) -> Result<bool> {
    let mut builder = gz_builder(path)?;
    let success = write_all(&mut builder, manifest, |p| filter.excludes(p));
    finish(builder, path)?;
    Ok(success)
}

/// Packs directory `src` into the tarball `dest`, rooted at `root_name`.
pub fn pack_directory(
    src: &Path,
    dest: &Path,
    root_name: &str,
    filter: &ExclusionFilter,
) -> Result<()> {
    let mut builder = gz_builder(dest)?;
    let entry = ManifestEntry::new(root_name, src, root_name);
    append_entry(&mut builder, &entry, &|p: &Path| filter.excludes(p))
        .fs_context("packing directory", src)?;
    finish(builder, dest)
}
