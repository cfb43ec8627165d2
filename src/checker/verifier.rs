//! Verifier command configuration and result-file parsing.

use crate::checker::CheckOutcome;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How to invoke the external verifier.
///
/// The manifest path is appended as the final argument; the process runs
/// with the artifact directory as its working directory so intermediates
/// land where cleanup can find them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    command: PathBuf,
    args: Vec<String>,
}

impl VerifierConfig {
    /// Configures the verifier executable.
    #[must_use]
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    /// Appends a fixed argument, passed before the manifest path.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The executable path.
    #[must_use]
    pub fn command(&self) -> &Path {
        &self.command
    }

    /// The fixed arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Maps a result file's first line onto an outcome.
///
/// The vocabulary is fixed: `sat` means the invariant holds, `unsat` and
/// `violated` mean it does not, and anything else — including an empty
/// file — is [`CheckOutcome::Unknown`].
pub(crate) fn parse_result(text: &str) -> CheckOutcome {
    match text.lines().next().map(str::trim) {
        Some("sat") => CheckOutcome::Satisfied,
        Some("unsat" | "violated") => CheckOutcome::Violated,
        _ => CheckOutcome::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sat_is_satisfied() {
        assert_eq!(parse_result("sat\n"), CheckOutcome::Satisfied);
        assert_eq!(parse_result("  sat  "), CheckOutcome::Satisfied);
    }

    #[test]
    fn violation_vocabulary() {
        assert_eq!(parse_result("unsat\n"), CheckOutcome::Violated);
        assert_eq!(parse_result("violated"), CheckOutcome::Violated);
    }

    #[test]
    fn anything_else_is_unknown() {
        assert_eq!(parse_result(""), CheckOutcome::Unknown);
        assert_eq!(parse_result("SAT"), CheckOutcome::Unknown);
        assert_eq!(parse_result("error: timeout"), CheckOutcome::Unknown);
    }

    #[test]
    fn only_the_first_line_counts() {
        assert_eq!(parse_result("garbage\nsat\n"), CheckOutcome::Unknown);
        assert_eq!(parse_result("sat\ndetails follow"), CheckOutcome::Satisfied);
    }

    #[test]
    fn config_builder_accumulates_args() {
        let config = VerifierConfig::new("/usr/bin/verify")
            .with_arg("-I")
            .with_arg("/lib/ruby");
        assert_eq!(config.command(), Path::new("/usr/bin/verify"));
        assert_eq!(config.args(), ["-I", "/lib/ruby"]);
    }
}
