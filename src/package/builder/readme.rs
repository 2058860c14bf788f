//! The `README` shipped at the root of every archive.

use crate::{
    config::Config,
    package::{
        Result,
        error::ErrorExt,
        launcher::ShellFlavor,
        request::PackageRequest,
        resources::{self, Templates},
    },
};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Archive-relative name of the README.
pub const README_NAME: &str = "README";

/// Renders the README for `request` into `work_dir`.
pub async fn produce_readme(
    templates: &Templates,
    config: &Config,
    request: &PackageRequest,
    work_dir: &Path,
) -> Result<PathBuf> {
    let application = config.application.as_ref();
    let flavor = ShellFlavor::for_platform(&config.platform);
    let launcher = application
        .and_then(|app| app.profile.as_ref())
        .filter(|_| request.binaries)
        .map(|profile| flavor.script_name(&profile.launcher_name));

    let text = templates.render(
        resources::README,
        &json!({
            "date": chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
            "user": current_user(),
            "application": application.map(|app| app.name.as_str()),
            "binaries": request.binaries,
            "binaries_root": config.binaries_root(),
            "launcher": launcher,
            "sources": request.sources,
            "project": request.project,
            "tools": request.tools || request.sources,
        }),
    )?;

    let path = work_dir.join(README_NAME);
    tokio::fs::write(&path, text)
        .await
        .fs_context("writing README", &path)?;
    Ok(path)
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".into())
}
