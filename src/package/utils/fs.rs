//! Filesystem helpers shared by the manifest producers.

use crate::package::{
    Result,
    error::{Error, ErrorExt},
};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Creates a directory and all of its parents.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(Error::Fs {
            context: "removing directory",
            path: path.to_path_buf(),
            error: e,
        }),
    }
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{from:?} does not exist")));
    }
    if !from.is_file() {
        return Err(Error::GenericError(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        create_dir_all(dest_dir).await?;
    }
    fs::copy(from, to).await.fs_context("copying file", from)?;
    Ok(())
}

/// Copies `from` into `dir`, keeping its file name. Returns that name.
pub async fn copy_into(from: &Path, dir: &Path) -> Result<String> {
    let name = file_name(from)?;
    copy_file(from, &dir.join(&name)).await?;
    Ok(name)
}

/// Final component of `path` as a string.
pub fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::GenericError(format!("{} has no file name", path.display())))
}

/// Writes a script and makes it executable by everyone (`0755`).
pub async fn write_executable(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await?;
    }
    fs::write(path, content)
        .await
        .fs_context("writing script", path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .await
            .fs_context("setting script permissions", path)?;
    }

    Ok(path.to_path_buf())
}

/// Points `link` at `target`, removing any existing link first.
///
/// Not atomic: a concurrent reader may briefly see no link.
#[cfg(unix)]
pub async fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    if fs::symlink_metadata(link).await.is_ok() {
        fs::remove_file(link)
            .await
            .fs_context("removing existing link", link)?;
    }
    fs::symlink(target, link)
        .await
        .fs_context("creating symbolic link", link)
}
