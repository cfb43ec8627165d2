//! Invariant checker bridge tests against a stub verifier.
//!
//! The stub is a shell script that stands in for the external solver: it
//! validates that the manifest it was handed exists, records its working
//! directory, and writes a canned result file. The tests drive the full
//! bridge path — snapshot, invoke, parse, clean up — and then assert that
//! every artifact directory is gone no matter how the check ended.
//!
//! Run with:
//!   cargo test --test checker_artifacts
#![cfg(unix)]

use fabriclab::checker::{CheckKind, CheckOutcome, InvariantChecker, VerifierConfig};
use fabriclab::error::Error;
use fabriclab::fabric::{Fabric, FlowAction, FlowEntry, FlowMatch, Topology};
use fabriclab::test_utils::init_test_logging;
use fabriclab::types::{Dpid, PortNo};
use std::fs;
use std::net::Ipv4Addr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

// =============================================================================
// HELPERS
// =============================================================================

/// A stub verifier living in its own temp directory.
struct StubVerifier {
    dir: tempfile::TempDir,
    script: PathBuf,
}

impl StubVerifier {
    /// Writes a stub that emits `result` into `<prefix>.result` and exits
    /// with `exit_code`. The stub also records its working directory in
    /// `workdir.txt` next to itself so tests can check artifact cleanup.
    fn new(prefix: &str, result: &str, exit_code: i32) -> Self {
        let dir = tempfile::tempdir().expect("stub dir");
        let script = dir.path().join("verify.sh");
        let body = format!(
            "#!/bin/sh\n\
             test -f \"$1\" || exit 3\n\
             pwd > \"{workdir}\"\n\
             printf '{result}\\n' > {prefix}.result\n\
             exit {exit_code}\n",
            workdir = dir.path().join("workdir.txt").display(),
        );
        fs::write(&script, body).expect("write stub");
        let mut perms = fs::metadata(&script).expect("stat stub").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).expect("chmod stub");
        Self { dir, script }
    }

    fn checker(&self) -> InvariantChecker {
        InvariantChecker::new(VerifierConfig::new(&self.script))
    }

    /// The artifact directory the stub ran in, recorded at invocation time.
    fn recorded_workdir(&self) -> PathBuf {
        let text = fs::read_to_string(self.dir.path().join("workdir.txt"))
            .expect("stub never ran");
        PathBuf::from(text.trim())
    }
}

fn fabric_with_entries() -> Fabric {
    let mut fabric = Topology::full_mesh(2).build();
    fabric
        .switch_mut(Dpid::new(0))
        .unwrap()
        .table_mut()
        .unwrap()
        .push(FlowEntry::new(
            FlowMatch::nw_dst(Ipv4Addr::new(10, 0, 0, 0), 24),
            vec![FlowAction::Output(PortNo::new(1))],
        ));
    fabric
        .switch_mut(Dpid::new(1))
        .unwrap()
        .table_mut()
        .unwrap()
        .push(FlowEntry::new(FlowMatch::any(), Vec::new()));
    fabric
}

fn assert_cleaned_up(workdir: &Path) {
    assert!(
        !workdir.exists(),
        "artifact directory {} survived the check",
        workdir.display()
    );
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn sat_result_is_satisfied_and_cleaned_up() {
    init_test_logging();
    let stub = StubVerifier::new("lc-base", "sat", 0);
    let outcome = stub
        .checker()
        .run_check(CheckKind::LoopFreedom, &fabric_with_entries())
        .expect("check");
    assert_eq!(outcome, CheckOutcome::Satisfied);
    assert_cleaned_up(&stub.recorded_workdir());
}

#[test]
fn violation_vocabulary_is_violated() {
    init_test_logging();
    for marker in ["unsat", "violated"] {
        let stub = StubVerifier::new("pl-base", marker, 0);
        let outcome = stub
            .checker()
            .run_check(CheckKind::BlackholeFreedom, &fabric_with_entries())
            .expect("check");
        assert_eq!(outcome, CheckOutcome::Violated, "marker {marker}");
        assert_cleaned_up(&stub.recorded_workdir());
    }
}

#[test]
fn out_of_vocabulary_result_is_unknown() {
    init_test_logging();
    let stub = StubVerifier::new("cfc-base", "solver timed out", 0);
    let outcome = stub
        .checker()
        .run_check(CheckKind::RoutingConsistency, &fabric_with_entries())
        .expect("check");
    assert_eq!(outcome, CheckOutcome::Unknown);
    assert_cleaned_up(&stub.recorded_workdir());
}

#[test]
fn nonzero_exit_with_violation_still_reports_violated() {
    init_test_logging();
    let stub = StubVerifier::new("lc-base", "unsat", 2);
    let outcome = stub
        .checker()
        .run_check(CheckKind::LoopFreedom, &fabric_with_entries())
        .expect("violation outweighs exit status");
    assert_eq!(outcome, CheckOutcome::Violated);
    assert_cleaned_up(&stub.recorded_workdir());
}

#[test]
fn nonzero_exit_without_violation_is_unavailable_and_cleaned_up() {
    init_test_logging();
    let stub = StubVerifier::new("lc-base", "sat", 2);
    let err = stub
        .checker()
        .run_check(CheckKind::LoopFreedom, &fabric_with_entries())
        .unwrap_err();
    assert!(matches!(err, Error::VerifierUnavailable(_)));
    assert_cleaned_up(&stub.recorded_workdir());
}

#[test]
fn wrong_result_prefix_is_unavailable() {
    init_test_logging();
    // The stub writes pl-base.result but loop freedom reads lc-base.result.
    let stub = StubVerifier::new("pl-base", "sat", 0);
    let err = stub
        .checker()
        .run_check(CheckKind::LoopFreedom, &fabric_with_entries())
        .unwrap_err();
    assert!(matches!(err, Error::VerifierUnavailable(_)));
    assert_cleaned_up(&stub.recorded_workdir());
}

#[test]
fn snapshot_failure_never_invokes_the_verifier() {
    init_test_logging();
    use fabriclab::fabric::{FullMeshPanel, Port, RecordingSession, Switch};
    use fabriclab::types::HwAddr;

    let dpid = Dpid::new(0);
    // A switch with no forwarding table at all.
    let bare = Switch::new(
        dpid,
        vec![Port::new(
            PortNo::new(1),
            "",
            HwAddr::for_port(dpid, PortNo::new(1)),
            None,
        )],
        Box::new(RecordingSession::new()),
    );
    let fabric = Fabric::new(vec![bare], Box::new(FullMeshPanel::new(vec![dpid])));

    let stub = StubVerifier::new("lc-base", "sat", 0);
    let err = stub
        .checker()
        .run_check(CheckKind::LoopFreedom, &fabric)
        .unwrap_err();
    assert!(matches!(err, Error::NoForwardingState(_)));
    assert!(
        !stub.dir.path().join("workdir.txt").exists(),
        "stub must not have been invoked"
    );
}
