//! Bridge to the external invariant verifier.
//!
//! Translates the fabric's forwarding state into the verifier's manifest
//! format, invokes the out-of-process tool, interprets its result file, and
//! guarantees that every generated artifact is removed on every exit path.
//! The verifier's internal algorithm is out of scope; only its input file
//! format and result-file contract matter here.

pub mod manifest;
pub mod verifier;

pub use manifest::{ManifestFiles, dump_forwarding_csv, write_manifest};
pub use verifier::VerifierConfig;

use crate::error::{Error, Result};
use crate::fabric::Fabric;
use crate::tracing_compat::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::process::Command;

/// The network-wide properties the verifier can be asked about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CheckKind {
    /// No forwarding loops anywhere in the fabric.
    LoopFreedom,
    /// No destinations silently blackholed.
    BlackholeFreedom,
    /// Forwarding state is mutually consistent across switches.
    RoutingConsistency,
    /// All endpoints can reach each other. Placeholder: the verifier has no
    /// implementation target for this, and requesting it fails with
    /// [`Error::NotImplemented`].
    Connectivity,
}

impl CheckKind {
    /// Every check kind, in menu order.
    pub const ALL: [Self; 4] = [
        Self::LoopFreedom,
        Self::BlackholeFreedom,
        Self::RoutingConsistency,
        Self::Connectivity,
    ];

    /// The verifier's result-file prefix for this check, or `None` for
    /// checks with no implementation target.
    #[must_use]
    pub fn result_prefix(self) -> Option<&'static str> {
        match self {
            Self::LoopFreedom => Some("lc-base"),
            Self::BlackholeFreedom => Some("pl-base"),
            Self::RoutingConsistency => Some("cfc-base"),
            Self::Connectivity => None,
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoopFreedom => "loop-freedom",
            Self::BlackholeFreedom => "blackhole-freedom",
            Self::RoutingConsistency => "routing-consistency",
            Self::Connectivity => "connectivity",
        };
        write!(f, "{name}")
    }
}

/// What the verifier said about the snapshot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum CheckOutcome {
    /// The invariant holds.
    Satisfied,
    /// The invariant is violated.
    Violated,
    /// The result file said something outside the fixed vocabulary.
    Unknown,
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Satisfied => "satisfied",
            Self::Violated => "violated",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// The checker bridge: snapshot, invoke, interpret, clean up.
#[derive(Debug, Clone)]
pub struct InvariantChecker {
    config: VerifierConfig,
}

impl InvariantChecker {
    /// Creates a bridge around the configured verifier command.
    #[must_use]
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Runs one check against the fabric's current forwarding state.
    ///
    /// Snapshots every switch's FIB into a scoped artifact directory,
    /// invokes the verifier with the manifest path as its final argument,
    /// and reads `<prefix>.result` from the artifact directory. The
    /// directory — manifest, per-switch dumps, and any verifier
    /// intermediates written next to them — is deleted on every exit path.
    pub fn run_check(&self, kind: CheckKind, fabric: &Fabric) -> Result<CheckOutcome> {
        let Some(prefix) = kind.result_prefix() else {
            return Err(Error::NotImplemented("connectivity invariant check"));
        };

        // TempDir removal on drop is what makes cleanup unconditional:
        // every early return and panic path below still deletes artifacts.
        let workdir = tempfile::Builder::new()
            .prefix("fabriclab-check-")
            .tempdir()?;
        let files = write_manifest(workdir.path(), fabric)?;

        debug!(%kind, command = %self.config.command().display(), "invoking verifier");
        let output = Command::new(self.config.command())
            .args(self.config.args())
            .arg(&files.manifest)
            .current_dir(workdir.path())
            .output()
            .map_err(|err| {
                Error::VerifierUnavailable(format!(
                    "failed to launch {}: {err}",
                    self.config.command().display()
                ))
            })?;

        let result_path = workdir.path().join(format!("{prefix}.result"));
        let result_text = fs::read_to_string(&result_path).ok();

        match result_text {
            Some(text) => {
                let outcome = verifier::parse_result(&text);
                if output.status.success() || outcome == CheckOutcome::Violated {
                    Ok(outcome)
                } else {
                    Err(Error::VerifierUnavailable(format!(
                        "verifier exited with {} without reporting a violation",
                        output.status
                    )))
                }
            }
            None => Err(Error::VerifierUnavailable(format!(
                "verifier produced no result file {prefix}.result (exit {})",
                output.status
            ))),
        }
    }
}
