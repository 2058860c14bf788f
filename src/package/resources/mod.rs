//! Embedded text templates.
//!
//! All generated files (launchers, environment files, project descriptors,
//! README) are rendered from handlebars templates compiled into the binary.
//! A [`Templates`] registry is built once per run and passed explicitly to
//! every generator, so tests can substitute their own template text.

use crate::package::Result;
use handlebars::Handlebars;
use serde::Serialize;

pub const LAUNCHER_SH: &str = "launcher.sh";
pub const LAUNCHER_BAT: &str = "launcher.bat";
pub const ENV_LAUNCH_SH: &str = "env_launch.sh";
pub const ENV_LAUNCH_BAT: &str = "env_launch.bat";
pub const LAUNCH_LINK_SH: &str = "launch_link.sh";
pub const LAUNCH_LINK_BAT: &str = "launch_link.bat";
pub const CREATE_APPLI: &str = "create_appli.sh";
pub const PROJECT_DESCRIPTOR: &str = "project.pyconf";
pub const README: &str = "README";

const EMBEDDED: [(&str, &str); 9] = [
    (LAUNCHER_SH, include_str!("templates/launcher.sh.hbs")),
    (LAUNCHER_BAT, include_str!("templates/launcher.bat.hbs")),
    (ENV_LAUNCH_SH, include_str!("templates/env_launch.sh.hbs")),
    (ENV_LAUNCH_BAT, include_str!("templates/env_launch.bat.hbs")),
    (LAUNCH_LINK_SH, include_str!("templates/launch_link.sh.hbs")),
    (LAUNCH_LINK_BAT, include_str!("templates/launch_link.bat.hbs")),
    (CREATE_APPLI, include_str!("templates/create_appli.sh.hbs")),
    (PROJECT_DESCRIPTOR, include_str!("templates/project.pyconf.hbs")),
    (README, include_str!("templates/README.hbs")),
];

/// Compiled template registry.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.registry.get_templates().keys().collect();
        names.sort();
        f.debug_struct("Templates").field("names", &names).finish()
    }
}

impl Templates {
    /// Registry holding the built-in templates.
    pub fn embedded() -> Result<Self> {
        Self::with_overrides(std::iter::empty::<(&str, &str)>())
    }

    /// Built-in templates, with `overrides` replacing those of the same name.
    pub fn with_overrides<'a>(
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);

        for (name, source) in EMBEDDED {
            registry.register_template_string(name, source)?;
        }
        for (name, source) in overrides {
            registry.register_template_string(name, source)?;
        }

        Ok(Self { registry })
    }

    /// Renders template `name` with `data`.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        Ok(self.registry.render(name, data)?)
    }
}
