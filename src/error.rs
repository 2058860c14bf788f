//! Top-level error types for the command line tool.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, SatpackError>;

/// Main error type of the command line tool
#[derive(Error, Debug)]
pub enum SatpackError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Package assembly errors
    #[error("{0}")]
    Package(#[from] crate::package::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Conflicting arguments
    #[error("Conflicting arguments: {arguments:?}")]
    ConflictingArguments {
        /// Arguments that conflict
        arguments: Vec<String>,
    },
}

impl SatpackError {
    /// Hints printed after the error message.
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::package::Error as E;
        match self {
            SatpackError::Package(E::MissingArtifacts(_)) => vec![
                "Build or install the listed products first".into(),
                "Or pass --force-creation to package without them".into(),
            ],
            SatpackError::Package(E::Descriptor { path, .. }) => vec![format!(
                "Check that {} exists and is valid TOML",
                path.display()
            )],
            SatpackError::Package(E::Driver { .. }) => vec![
                "Check the [tools] executable in the configuration".into(),
                "Or pass --with-vcs to keep VCS products as references".into(),
            ],
            SatpackError::Cli(_) => vec!["Run with --help for usage".into()],
            _ => Vec::new(),
        }
    }
}
