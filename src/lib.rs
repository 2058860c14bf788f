//! Package assembly engine for multi-product applications.
//!
//! This library builds three kinds of gzip-compressed tar archives:
//! - binary packages (installed products plus a relocatable launcher)
//! - source packages (product archives, an offline project tree, the tools)
//! - project packages (the directories a project descriptor points at)
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod config;
pub mod error;
pub mod package;

// Re-export commonly used types
pub use error::{CliError, Result, SatpackError};
