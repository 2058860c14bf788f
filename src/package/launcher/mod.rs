//! Relocatable launcher and environment generation.
//!
//! Generated scripts never contain a path of the packaging host. Each one
//! starts by resolving the directory it was extracted to into the
//! [`ROOT_VAR`] variable, and every packed location is written as that
//! variable followed by an archive-relative path (see
//! [`ShellFlavor::relocated`]). The variable reference is emitted outside any
//! string literal, so no later rewriting of the output is needed.
//!
//! # Generated files
//!
//! - the launcher (`<launcher_name>` or `<launcher_name>.bat`)
//! - the environment file (`env_launch.sh` / `env_launch.bat`)
//! - a launch link that loads the environment then runs the launcher
//! - `create_appli.sh`, for applications without a launcher profile

mod environment;

pub use environment::{EnvironmentWriter, ProductEnvironment, root_var_name};

use crate::{
    bail,
    config::{LauncherProfile, Platform, ProductDescriptor},
    package::{
        Result,
        resources::{self, Templates},
        utils::fs,
    },
};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Variable holding the extraction directory at run time.
pub const ROOT_VAR: &str = "out_dir_Path";

/// Name of the application-creation script.
pub const CREATE_APPLI_NAME: &str = "create_appli.sh";

/// Script dialect of the target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlavor {
    /// `bash` scripts.
    Posix,
    /// `cmd.exe` batch files.
    Batch,
}

impl ShellFlavor {
    pub fn for_platform(platform: &Platform) -> Self {
        if platform.windows {
            ShellFlavor::Batch
        } else {
            ShellFlavor::Posix
        }
    }

    pub fn separator(self) -> char {
        match self {
            ShellFlavor::Posix => '/',
            ShellFlavor::Batch => '\\',
        }
    }

    /// File name of a script with the given stem.
    pub fn script_name(self, stem: &str) -> String {
        match self {
            ShellFlavor::Posix => stem.to_string(),
            ShellFlavor::Batch => format!("{stem}.bat"),
        }
    }

    pub fn env_file_name(self) -> &'static str {
        match self {
            ShellFlavor::Posix => "env_launch.sh",
            ShellFlavor::Batch => "env_launch.bat",
        }
    }

    /// Argument pass-through of launch links.
    pub fn forward_args(self) -> &'static str {
        match self {
            ShellFlavor::Posix => "$*",
            ShellFlavor::Batch => "%*",
        }
    }

    /// Reference to variable `var`.
    pub fn var_ref(self, var: &str) -> String {
        match self {
            ShellFlavor::Posix => format!("${{{var}}}"),
            ShellFlavor::Batch => format!("%{var}%"),
        }
    }

    /// Path expression `<ROOT_VAR>/<parts...>`.
    ///
    /// The literal part is quoted on POSIX while the root reference is not,
    /// so the expression is valid as a single shell word.
    pub fn relocated(self, parts: &[&str]) -> String {
        let sep = self.separator().to_string();
        let tail = parts.join(&sep);
        match self {
            ShellFlavor::Posix => format!("\"{}\"'/{tail}'", self.var_ref(ROOT_VAR)),
            ShellFlavor::Batch => format!("{}\\{tail}", self.var_ref(ROOT_VAR)),
        }
    }

    /// `base` followed by the relative path `rel`.
    pub fn join(self, base: &str, rel: &str) -> String {
        match self {
            ShellFlavor::Posix => format!("\"{base}/{rel}\""),
            ShellFlavor::Batch => format!("{base}\\{rel}"),
        }
    }

    pub fn comment(self, text: &str) -> String {
        match self {
            ShellFlavor::Posix => format!("# {text}\n"),
            ShellFlavor::Batch => format!("rem {text}\n"),
        }
    }

    pub fn set_var(self, var: &str, value: &str) -> String {
        match self {
            ShellFlavor::Posix => format!("export {var}={value}\n"),
            ShellFlavor::Batch => format!("set {var}={value}\n"),
        }
    }

    /// Prepends `value` to the search path `var`.
    pub fn prepend_path(self, var: &str, value: &str) -> String {
        match self {
            ShellFlavor::Posix => format!("export {var}={value}:\"{}\"\n", self.var_ref(var)),
            ShellFlavor::Batch => format!("set {var}={value};{}\n", self.var_ref(var)),
        }
    }

    fn launcher_template(self) -> &'static str {
        match self {
            ShellFlavor::Posix => resources::LAUNCHER_SH,
            ShellFlavor::Batch => resources::LAUNCHER_BAT,
        }
    }

    fn env_template(self) -> &'static str {
        match self {
            ShellFlavor::Posix => resources::ENV_LAUNCH_SH,
            ShellFlavor::Batch => resources::ENV_LAUNCH_BAT,
        }
    }

    fn link_template(self) -> &'static str {
        match self {
            ShellFlavor::Posix => resources::LAUNCH_LINK_SH,
            ShellFlavor::Batch => resources::LAUNCH_LINK_BAT,
        }
    }
}

/// What every generator needs to know about the packed application.
#[derive(Debug, Clone, Copy)]
pub struct LauncherContext<'a> {
    /// Application name, used in script headers.
    pub application: &'a str,
    /// Packed products, in declaration order.
    pub products: &'a [ProductDescriptor],
    /// `BINARIES-<tag>`.
    pub binaries_root: &'a str,
    pub flavor: ShellFlavor,
}

/// Writes the relocatable launcher into `out_dir`.
///
/// The launcher exports the packed environment, then execs the profile
/// product's entry point with all arguments.
pub async fn produce_launcher(
    templates: &Templates,
    env: &dyn EnvironmentWriter,
    ctx: &LauncherContext<'_>,
    profile: &LauncherProfile,
    out_dir: &Path,
) -> Result<PathBuf> {
    if !ctx.products.iter().any(|p| p.name == profile.product) {
        bail!(
            "launcher profile product `{}` is not part of the application",
            profile.product
        );
    }

    let mut parts = vec![ctx.binaries_root.to_string(), profile.product.clone()];
    parts.extend(
        profile
            .launcher_command
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();

    let environment = env.render(ctx.products, ctx.binaries_root, ctx.flavor)?;
    let text = templates.render(
        ctx.flavor.launcher_template(),
        &json!({
            "application": ctx.application,
            "root_var": ROOT_VAR,
            "environment": environment.trim_end(),
            "command": ctx.flavor.relocated(&parts),
        }),
    )?;

    let path = out_dir.join(ctx.flavor.script_name(&profile.launcher_name));
    log::debug!("Writing launcher {}", path.display());
    fs::write_executable(&path, &text).await
}

/// Writes the environment file into `out_dir`.
pub async fn produce_env_file(
    templates: &Templates,
    env: &dyn EnvironmentWriter,
    ctx: &LauncherContext<'_>,
    out_dir: &Path,
) -> Result<PathBuf> {
    let environment = env.render(ctx.products, ctx.binaries_root, ctx.flavor)?;
    let text = templates.render(
        ctx.flavor.env_template(),
        &json!({
            "application": ctx.application,
            "root_var": ROOT_VAR,
            "environment": environment.trim_end(),
        }),
    )?;

    let path = out_dir.join(ctx.flavor.env_file_name());
    log::debug!("Writing environment file {}", path.display());
    fs::write_executable(&path, &text).await
}

/// Writes a shim that loads the environment file and runs `launcher_file`
/// (a file name next to it) with all arguments.
pub async fn produce_launch_link(
    templates: &Templates,
    flavor: ShellFlavor,
    launcher_file: &str,
    out_dir: &Path,
) -> Result<PathBuf> {
    let text = templates.render(
        flavor.link_template(),
        &json!({
            "env_file": flavor.env_file_name(),
            "launcher": launcher_file,
            "args": flavor.forward_args(),
        }),
    )?;

    let stem = launcher_file.strip_suffix(".bat").unwrap_or(launcher_file);
    let path = out_dir.join(flavor.script_name(&format!("launch_{stem}")));
    fs::write_executable(&path, &text).await
}

/// One `<module>` line of the application-creation script.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AppliModule {
    pub name: String,
    /// Directory under the binaries root.
    pub path: String,
}

/// Modules listed by the application-creation script, in product
/// declaration order. Plugin-only products are skipped; a composite product
/// contributes one module per component.
pub fn appli_modules(products: &[ProductDescriptor]) -> Vec<AppliModule> {
    let mut modules = Vec::new();
    for product in products
        .iter()
        .filter(|p| p.ships_binaries() && !p.is_plugin())
    {
        if product.is_composite() {
            modules.extend(product.components.iter().map(|c| AppliModule {
                name: c.clone(),
                path: c.clone(),
            }));
        } else {
            modules.push(AppliModule {
                name: product.name.clone(),
                path: product.name.clone(),
            });
        }
    }
    modules
}

/// Writes `create_appli.sh` into `out_dir`.
pub async fn produce_appli_script(
    templates: &Templates,
    application: &str,
    products: &[ProductDescriptor],
    binaries_root: &str,
    out_dir: &Path,
) -> Result<PathBuf> {
    let text = templates.render(
        resources::CREATE_APPLI,
        &json!({
            "application": application,
            "root_var": ROOT_VAR,
            "root_ref": ShellFlavor::Posix.var_ref(ROOT_VAR),
            "binaries_root": binaries_root,
            "modules": appli_modules(products),
        }),
    )?;

    fs::write_executable(&out_dir.join(CREATE_APPLI_NAME), &text).await
}
