//! Colored console output.

use crossterm::style::Stylize;
use std::io::{self, Write};

/// Prints user-facing messages.
///
/// Progress and results go to stdout, warnings and errors to stderr. Quiet
/// mode keeps only errors; verbose messages need verbose mode.
#[derive(Debug, Clone, Copy)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Detail shown only in verbose mode.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if self.verbose && !self.quiet {
            writeln!(io::stdout(), "{}", message.dark_grey())?;
        }
        Ok(())
    }

    pub fn progress(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout(), "{} {message}", "→".cyan())?;
        }
        Ok(())
    }

    pub fn success(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout(), "{} {}", "✓".green(), message.green())?;
        }
        Ok(())
    }

    pub fn warn(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stderr(), "{} {}", "warning:".yellow().bold(), message)?;
        }
        Ok(())
    }

    /// Always printed.
    pub fn error(&self, message: &str) -> io::Result<()> {
        writeln!(io::stderr(), "{} {}", "error:".red().bold(), message)
    }

    pub fn section(&self, title: &str) -> io::Result<()> {
        if !self.quiet {
            let mut out = io::stdout();
            writeln!(out)?;
            writeln!(out, "{}", title.bold())?;
            writeln!(out, "{}", "-".repeat(title.chars().count()).dark_grey())?;
        }
        Ok(())
    }

    /// Indented line, used for details under a section.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout(), "  {message}")?;
        }
        Ok(())
    }

    /// A multi-line block on stderr, such as a missing-artifact listing.
    pub fn block(&self, text: &str) -> io::Result<()> {
        let mut err = io::stderr();
        for line in text.lines() {
            writeln!(err, "  {line}")?;
        }
        Ok(())
    }
}
