//! Determinism regression tests for the round scheduler.
//!
//! These tests validate the reproducibility contract:
//! - Same seed + same config = identical per-round decision sequences
//! - Different seeds diverge
//! - Crash and recovery sets stay disjoint within a round
//! - Driver suspensions between rounds consume no PRNG draws
//!
//! Run with:
//!   cargo test --test determinism

use fabriclab::engine::{FuzzConfig, FuzzEngine, RoundDecision, RoundDriver, RoundReport};
use fabriclab::event::EventKind;
use fabriclab::fabric::Topology;
use fabriclab::test_utils::init_test_logging;

// =============================================================================
// HELPERS
// =============================================================================

/// Driver that records every round report and stops after a fixed count.
struct Recording {
    reports: Vec<RoundReport>,
    remaining: u64,
}

impl Recording {
    fn new(rounds: u64) -> Self {
        Self {
            reports: Vec::new(),
            remaining: rounds,
        }
    }
}

impl RoundDriver for Recording {
    fn after_round(&mut self, report: &RoundReport) -> RoundDecision {
        self.reports.push(report.clone());
        self.remaining -= 1;
        if self.remaining == 0 {
            RoundDecision::Stop
        } else {
            RoundDecision::Continue
        }
    }
}

fn chaotic_config(seed: u64) -> FuzzConfig {
    FuzzConfig::new(seed)
        .with_failure_rate(0.3)
        .with_recovery_rate(0.6)
        .with_delay_rate(0.4)
        .with_drop_rate(0.6)
        .with_traffic_rate(0.8)
}

/// Builds an engine with handlers on every switch and a few in-flight
/// messages, so every round exercises every PRNG-consuming step.
fn loaded_engine(seed: u64, switches: usize) -> FuzzEngine {
    let fabric = Topology::full_mesh(switches).build();
    let mut engine = FuzzEngine::new(chaotic_config(seed), fabric);
    for dpid in engine.fabric().dpids() {
        engine.register_handler(dpid, EventKind::PacketIn, |_| Ok(()));
    }
    for i in 0..8u8 {
        engine.intercept_message(vec![i]);
    }
    engine.mark_ready();
    engine
}

fn run_recorded(seed: u64, switches: usize, rounds: u64) -> Vec<RoundReport> {
    let mut engine = loaded_engine(seed, switches);
    let mut driver = Recording::new(rounds);
    engine.run(&mut driver).expect("run");
    driver.reports
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn same_seed_produces_identical_runs() {
    init_test_logging();
    let first = run_recorded(42, 5, 30);
    let second = run_recorded(42, 5, 30);
    assert_eq!(first, second);
    assert_eq!(first.len(), 30);
    assert_eq!(first.last().unwrap().round.as_u64(), 30);
}

#[test]
fn same_seed_produces_identical_totals() {
    init_test_logging();
    let mut a = loaded_engine(7, 4);
    let mut b = loaded_engine(7, 4);
    let report_a = a.run(&mut Recording::new(20)).expect("run a");
    let report_b = b.run(&mut Recording::new(20)).expect("run b");
    assert_eq!(report_a, report_b);
    assert_eq!(a.logical_time(), b.logical_time());
    assert_eq!(a.fabric().crashed_switches(), b.fabric().crashed_switches());
}

#[test]
fn different_seeds_diverge() {
    init_test_logging();
    let first = run_recorded(1, 5, 30);
    let second = run_recorded(2, 5, 30);
    assert_ne!(
        first, second,
        "30 rounds of 0.3/0.6 fault rates over 5 switches cannot coincide"
    );
}

#[test]
fn crashed_and_recovered_are_disjoint_every_round() {
    init_test_logging();
    for report in run_recorded(1234, 6, 60) {
        for dpid in &report.crashed {
            assert!(
                !report.recovered.contains(dpid),
                "{dpid} crashed and recovered in {}",
                report.round
            );
        }
    }
}

#[test]
fn driver_stalls_do_not_consume_draws() {
    init_test_logging();

    /// Driver that burns time between rounds without touching the engine.
    struct Staller {
        inner: Recording,
    }

    impl RoundDriver for Staller {
        fn after_round(&mut self, report: &RoundReport) -> RoundDecision {
            // The suspension point: arbitrary external work happens here.
            std::hint::black_box(vec![0u8; 1024]);
            self.inner.after_round(report)
        }
    }

    let mut stalled = Staller {
        inner: Recording::new(15),
    };
    let mut engine = loaded_engine(99, 4);
    engine.run(&mut stalled).expect("stalled run");

    let straight = run_recorded(99, 4, 15);
    assert_eq!(stalled.inner.reports, straight);
}
