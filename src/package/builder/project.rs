//! Project package manifests.
//!
//! A project archive holds the directories a project descriptor points at,
//! each under a fixed name, plus a rewritten descriptor that finds them
//! relative to its own location once extracted.

use crate::{
    config::{
        Config,
        descriptor::{self, DESCRIPTOR_DIR_VAR, PROJECT_PATH_VAR, ProjectFile, ProjectPathKey},
    },
    package::{Result, error::Context, manifest::Manifest, utils::fs},
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Builds the manifest of the project `name`.
///
/// The original descriptor is never modified; the rewritten one is written
/// to `work_dir` and is the last manifest entry.
pub async fn build_project_manifest(config: &Config, name: &str, work_dir: &Path) -> Result<Manifest> {
    let path = config
        .projects
        .get(name)
        .with_context(|| format!("unknown project `{name}`"))?;
    let descriptor_dir = path.parent().unwrap_or(Path::new("."));
    let mut project: ProjectFile = descriptor::read_descriptor(path).await?;

    let project_root = match project.project_path.as_deref() {
        Some(value) => resolve(value, descriptor_dir, descriptor_dir)?,
        None => descriptor_dir.to_path_buf(),
    };

    let mut manifest = Manifest::new();
    for key in ProjectPathKey::ALL {
        let Some(value) = project.path(key) else {
            continue;
        };
        let local = resolve(value, &project_root, descriptor_dir)?;
        log::debug!("{} -> {}", key.key(), local.display());
        manifest.add(
            format!("{} (project)", key.archive_dir()),
            local,
            key.archive_dir(),
        )?;
        project.set_path(key, format!("{PROJECT_PATH_VAR}/{}", key.archive_dir()));
    }
    project.project_path = Some(DESCRIPTOR_DIR_VAR.to_string());

    let file_name = descriptor::descriptor_file_name(name);
    let out_dir = work_dir.join("project");
    fs::create_dir_all(&out_dir).await?;
    let rewritten = out_dir.join(&file_name);
    descriptor::write_descriptor(&rewritten, &project).await?;
    manifest.add("project descriptor", rewritten, file_name)?;

    Ok(manifest)
}

/// Expands the path variables of `value` and makes it absolute relative to
/// the descriptor's directory.
fn resolve(value: &str, project_root: &Path, descriptor_dir: &Path) -> Result<PathBuf> {
    let expanded = value
        .replace(PROJECT_PATH_VAR, &project_root.to_string_lossy())
        .replace(DESCRIPTOR_DIR_VAR, &descriptor_dir.to_string_lossy());
    let absolute = Path::new(&expanded).absolutize_from(descriptor_dir)?;
    Ok(absolute.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::descriptor::parse_descriptor;

    fn project_config(root: &Path, descriptor: &str) -> Config {
        let dir = root.join("salome_project");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("salome.pyconf");
        std::fs::write(&path, descriptor).unwrap();
        let mut config = Config::default();
        config.projects.insert("salome".into(), path);
        config
    }

    #[tokio::test]
    async fn paths_are_remapped_to_fixed_names() {
        let dir = tempfile::tempdir().unwrap();
        let config = project_config(
            dir.path(),
            "project_path = \"${descriptor_dir}\"\n\
             ARCHIVEPATH = \"/data/ARCHIVES\"\n\
             PRODUCTPATH = \"${project_path}/products\"\n\
             JOBPATH = \"jobs\"\n\
             git_server = \"https://git.example.org\"\n",
        );

        let manifest = build_project_manifest(&config, "salome", &dir.path().join("w"))
            .await
            .unwrap();
        let project_dir = dir.path().join("salome_project");

        let labels: Vec<_> = manifest.labels().collect();
        assert_eq!(
            labels,
            [
                "archives (project)",
                "products (project)",
                "jobs (project)",
                "project descriptor"
            ]
        );
        let archives = manifest.get("archives (project)").unwrap();
        assert_eq!(archives.local_path(), Path::new("/data/ARCHIVES"));
        assert_eq!(archives.archive_path(), Path::new("archives"));
        assert_eq!(
            manifest.get("products (project)").unwrap().local_path(),
            project_dir.join("products")
        );
        assert_eq!(
            manifest.get("jobs (project)").unwrap().local_path(),
            project_dir.join("jobs")
        );

        let entry = manifest.get("project descriptor").unwrap();
        assert_eq!(entry.archive_path(), Path::new("salome.pyconf"));
        let text = std::fs::read_to_string(entry.local_path()).unwrap();
        let rewritten: ProjectFile = parse_descriptor(&text, entry.local_path()).unwrap();
        assert_eq!(rewritten.project_path.as_deref(), Some("${descriptor_dir}"));
        assert_eq!(
            rewritten.path(ProjectPathKey::Archives),
            Some("${project_path}/archives")
        );
        assert_eq!(rewritten.path(ProjectPathKey::Machines), None);
        assert!(rewritten.other.contains_key("git_server"));

        // the original is untouched
        let original = std::fs::read_to_string(project_dir.join("salome.pyconf")).unwrap();
        assert!(original.contains("/data/ARCHIVES"));
    }

    #[tokio::test]
    async fn project_path_is_always_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = project_config(dir.path(), "APPLICATIONPATH = \"apps\"\n");
        let manifest = build_project_manifest(&config, "salome", &dir.path().join("w"))
            .await
            .unwrap();
        let text =
            std::fs::read_to_string(manifest.get("project descriptor").unwrap().local_path())
                .unwrap();
        assert!(text.contains("project_path = \"${descriptor_dir}\""));
        assert!(text.contains("APPLICATIONPATH = \"${project_path}/applications\""));
    }

    #[tokio::test]
    async fn unknown_project_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = build_project_manifest(&Config::default(), "nope", dir.path()).await;
        assert!(res.is_err());
    }
}
