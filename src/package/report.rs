//! Missing-artifact bookkeeping for the force policy.

use std::fmt;

/// Products whose install or source directory is absent.
///
/// Built while composing a binary manifest. A non-empty report aborts the
/// assembly unless the request carries the force flag, in which case it is
/// handed back to the caller as a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingArtifactReport {
    /// Products expected to be installed but without an install directory.
    pub missing_installs: Vec<String>,
    /// Products flagged `sources_in_package` without a source directory.
    pub missing_sources: Vec<String>,
}

impl MissingArtifactReport {
    /// True when nothing is missing.
    pub fn is_empty(&self) -> bool {
        self.missing_installs.is_empty() && self.missing_sources.is_empty()
    }

    /// Human-readable listing, one product per line, each list fenced by rules.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        if !self.missing_installs.is_empty() {
            out.push_str("The following products are not installed:\n");
            push_fenced(&mut out, &self.missing_installs);
        }
        if !self.missing_sources.is_empty() {
            out.push_str("The following products have no source directory:\n");
            push_fenced(&mut out, &self.missing_sources);
        }
        out
    }

    /// Warning issued when creation is forced despite missing products.
    pub fn forced_warning(&self) -> String {
        format!("Creating the package anyway\n{}", self.listing().trim_end())
    }
}

fn push_fenced(out: &mut String, names: &[String]) {
    const RULE: &str = "--------";
    out.push_str(RULE);
    out.push('\n');
    for name in names {
        out.push_str(name);
        out.push('\n');
    }
    out.push_str(RULE);
    out.push('\n');
}

impl fmt::Display for MissingArtifactReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} product(s) not installed, {} product(s) without sources",
            self.missing_installs.len(),
            self.missing_sources.len()
        )
    }
}
