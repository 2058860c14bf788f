//! Command line argument parsing and validation.

use crate::{
    error::CliError,
    package::{PackageRequest, PropertyFilter},
};
use clap::Parser;
use std::path::PathBuf;

/// Package assembly for multi-product applications
#[derive(Parser, Debug)]
#[command(
    name = "satpack",
    version,
    about = "Builds binary, source and project archives of an application",
    long_about = "Builds binary, source and project archives of an application from a resolved configuration.

Binary and source content can share one archive. A project archive stands alone.

Usage:
  satpack --config app.toml --binaries
  satpack --config app.toml --binaries --sources --name nightly
  satpack --config app.toml --project salome
  satpack --config app.toml --salometools

Exit code 0 = archive written and every entry added."
)]
pub struct Args {
    /// Resolved configuration file
    #[arg(short, long, env = "SATPACK_CONFIG", value_name = "FILE")]
    pub config: PathBuf,

    /// Pack the installed binaries with a launcher
    #[arg(short, long)]
    pub binaries: bool,

    /// Pack sources, project tree and tools
    #[arg(short, long)]
    pub sources: bool,

    /// Pack the named project
    #[arg(short, long, value_name = "PROJECT")]
    pub project: Option<String>,

    /// Pack the tools
    #[arg(short = 't', long = "salometools")]
    pub tools: bool,

    /// Create the archive even if installs or sources are missing
    #[arg(short, long)]
    pub force_creation: bool,

    /// Keep VCS products as VCS references in source packages
    #[arg(long)]
    pub with_vcs: bool,

    /// Leave out products flagged as commercial
    #[arg(long)]
    pub without_commercial: bool,

    /// Archive name or path (`.tgz` is appended if missing)
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<PathBuf>,

    /// Extra files added at the archive root
    #[arg(short, long, value_name = "FILE", num_args = 1.., value_delimiter = ',')]
    pub add_files: Vec<PathBuf>,

    /// Leave out products whose property has this value
    #[arg(long, value_name = "PROPERTY:VALUE")]
    pub without_property: Option<String>,

    /// Print more detail
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Checks the mode flags.
    pub fn validate(&self) -> Result<(), CliError> {
        if !self.binaries && !self.sources && self.project.is_none() && !self.tools {
            return Err(CliError::MissingArgument {
                argument: "one of --binaries, --sources, --project, --salometools".into(),
            });
        }
        if self.project.is_some() && (self.binaries || self.sources) {
            let mut arguments = vec!["--project".to_string()];
            if self.binaries {
                arguments.push("--binaries".into());
            }
            if self.sources {
                arguments.push("--sources".into());
            }
            return Err(CliError::ConflictingArguments { arguments });
        }
        Ok(())
    }

    /// Validated packaging request.
    pub fn to_request(&self) -> Result<PackageRequest, CliError> {
        self.validate()?;
        let without_property = self
            .without_property
            .as_deref()
            .map(|s| s.parse::<PropertyFilter>())
            .transpose()
            .map_err(|e| CliError::InvalidArguments {
                reason: e.to_string(),
            })?;

        Ok(PackageRequest {
            binaries: self.binaries,
            sources: self.sources,
            project: self.project.clone(),
            tools: self.tools,
            force_creation: self.force_creation,
            with_vcs: self.with_vcs,
            without_commercial: self.without_commercial,
            name: self.name.clone(),
            add_files: self.add_files.clone(),
            without_property,
        })
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}
