//! Error types for package assembly.
//!
//! Every fallible engine operation returns [`Result`]. Filesystem failures carry
//! the offending path through [`ErrorExt::fs_context`], free-form failures go
//! through [`Context`] or the crate-level [`bail!`](crate::bail) macro.

use super::report::MissingArtifactReport;
use std::{fmt::Display, path::PathBuf};

/// Result type alias for package assembly operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building manifests and archives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem operation failed on a known path.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being attempted.
        context: &'static str,
        /// Path the operation touched.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// Bare I/O error.
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    /// A template failed to render.
    #[error("failed to render template: {0}")]
    Template(#[from] handlebars::RenderError),

    /// A template failed to compile.
    #[error("failed to register template: {0}")]
    TemplateRegistration(#[from] Box<handlebars::TemplateError>),

    /// A product, application or project descriptor is absent or malformed.
    #[error("invalid descriptor {}: {reason}", path.display())]
    Descriptor {
        /// Descriptor file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Products are missing an install or source directory and the
    /// force policy is off.
    #[error("{0}")]
    MissingArtifacts(MissingArtifactReport),

    /// The external build driver failed.
    #[error("`{command}` failed: {reason}")]
    Driver {
        /// Command line that was run.
        command: String,
        /// Exit status or spawn error.
        reason: String,
    },

    /// Two manifest entries share the same label.
    #[error("duplicate manifest label `{0}`")]
    DuplicateLabel(String),

    /// Directory traversal error.
    #[error("directory walk failed: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix stripping failed.
    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

impl From<handlebars::TemplateError> for Error {
    fn from(error: handlebars::TemplateError) -> Self {
        Self::TemplateRegistration(Box::new(error))
    }
}

/// Attach the offending path to an I/O failure.
pub trait ErrorExt<T> {
    /// Converts the error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Add a human-readable message to a failure.
pub trait Context<T> {
    /// Wraps the failure with `context`.
    fn context<C: Display>(self, context: C) -> Result<T>;

    /// Wraps the failure with a lazily built message.
    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Return early with an [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::package::Error::GenericError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_context_keeps_path() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = res.fs_context("reading descriptor", "/tmp/x.pyconf").unwrap_err();
        assert_eq!(err.to_string(), "reading descriptor /tmp/x.pyconf: gone");
    }

    #[test]
    fn option_context() {
        let none: Option<u8> = None;
        let err = none.context("no launcher profile").unwrap_err();
        assert!(matches!(err, Error::GenericError(ref m) if m == "no launcher profile"));
    }
}
