//! The fuzz engine: a round-based scheduler for deterministic fault injection.
//!
//! The engine is the single authority that advances logical time. Each round
//! applies, in fixed order: in-flight message fate, switch crash decisions,
//! switch recovery decisions, the link/controller extension hooks, the
//! timeout hook, and synthetic traffic against live switches' registered
//! handlers. Every randomized decision draws from one seeded PRNG with
//! entities visited in ascending-id order, which is what makes a run
//! replayable from its seed.
//!
//! # Lifecycle
//!
//! `NotReady -> Running -> Stopped`. The transition to `Running` requires
//! the [`ReadinessGate`] to open; the transition to `Stopped` happens on a
//! driver stop decision or an unrecoverable collaborator error. Rounds are
//! scheduling units, not transactions: a collaborator error mid-round
//! leaves earlier effects of that round applied.
//!
//! # Concurrency
//!
//! Single-threaded, cooperative, step-driven. The only suspension points
//! are between rounds (the driver decision) and before the first round (the
//! gate); neither consumes PRNG draws. Handler invocation is synchronous
//! and reentrant-unsafe: a handler must not start further rounds.

pub mod config;
pub mod readiness;

pub use config::FuzzConfig;
pub use readiness::{ControllerStatus, ReadinessGate};

use crate::checker::{CheckKind, CheckOutcome, InvariantChecker};
use crate::error::{Error, Result};
use crate::event::{EventGenerator, EventKind, HandlerRegistry, HandlerResult};
use crate::fabric::Fabric;
use crate::tracing_compat::{debug, error, info};
use crate::transit::TransitRegistry;
use crate::types::{Dpid, Round};
use crate::util::DetRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Waiting for the readiness gate to open.
    NotReady,
    /// Rounds may be scheduled.
    Running,
    /// The run ended; no further rounds will execute.
    Stopped,
}

/// What one completed round did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// The logical time after this round completed.
    pub round: Round,
    /// Switches crashed this round, in ascending dpid order.
    pub crashed: Vec<Dpid>,
    /// Switches recovered this round, in ascending dpid order.
    /// Always disjoint from `crashed`.
    pub recovered: Vec<Dpid>,
    /// In-flight messages delayed another round.
    pub delayed: u64,
    /// In-flight messages dropped.
    pub dropped: u64,
    /// In-flight messages delivered.
    pub delivered: u64,
    /// Synthetic events generated and dispatched.
    pub events_injected: u64,
}

/// Totals reported when a run ends, on both the success and failure paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FuzzReport {
    /// Rounds completed over the whole run.
    pub rounds_completed: u64,
    /// Synthetic events generated over the whole run.
    pub events_generated: u64,
}

/// Maps a finished run to the process exit status an embedding harness
/// should use: success on a clean stop, non-zero on an unrecoverable
/// failure.
#[must_use]
pub fn exit_status(result: &Result<FuzzReport>) -> i32 {
    i32::from(result.is_err())
}

/// Decision returned by a [`RoundDriver`] at the inter-round boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundDecision {
    /// Schedule the next round immediately.
    Continue,
    /// Pause the round loop, run the named invariant check, then ask again.
    Check(CheckKind),
    /// End the run.
    Stop,
}

/// The operator/automation collaborator consulted between rounds.
///
/// Implementations range from a fixed iteration count ([`FixedRounds`]) to
/// interactive prompts; the engine only needs the decision.
pub trait RoundDriver {
    /// Called after every completed round.
    fn after_round(&mut self, report: &RoundReport) -> RoundDecision;

    /// Called with the outcome of a check this driver requested.
    fn on_check_outcome(&mut self, kind: CheckKind, outcome: CheckOutcome) {
        let _ = (kind, outcome);
    }
}

/// Baseline automated driver: run a fixed number of rounds, then stop.
#[derive(Debug, Clone, Copy)]
pub struct FixedRounds {
    remaining: u64,
}

impl FixedRounds {
    /// Runs exactly `rounds` rounds.
    ///
    /// The driver is first consulted after a round has completed, so a
    /// count of 0 still runs one round.
    #[must_use]
    pub fn new(rounds: u64) -> Self {
        Self { remaining: rounds }
    }
}

impl RoundDriver for FixedRounds {
    fn after_round(&mut self, _report: &RoundReport) -> RoundDecision {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            RoundDecision::Stop
        } else {
            RoundDecision::Continue
        }
    }
}

/// Overridable per-round extension points.
///
/// Link cut/repair, controller crash/restart, and timeout interposition are
/// explicit steps of every round; the baseline policy leaves them as no-ops
/// that consume no PRNG draws. Implementations that do draw must draw for
/// every round unconditionally to preserve replayability.
#[allow(unused_variables)]
pub trait RoundHooks {
    /// Cut links. Runs after switch recovery, before traffic fuzzing.
    fn cut_links(&mut self, fabric: &mut Fabric, rng: &mut DetRng) {}

    /// Repair previously cut links.
    fn repair_links(&mut self, fabric: &mut Fabric, rng: &mut DetRng) {}

    /// Crash controllers.
    fn crash_controllers(&mut self, rng: &mut DetRng) {}

    /// Restart crashed controllers.
    fn restart_controllers(&mut self, rng: &mut DetRng) {}

    /// Interpose on timeouts. Runs after the link/controller steps,
    /// before traffic fuzzing.
    fn check_timeouts(&mut self, round: Round, transit: &mut TransitRegistry, rng: &mut DetRng) {}
}

/// The baseline hook policy: every extension point is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineHooks;

impl RoundHooks for BaselineHooks {}

/// The round scheduler.
///
/// Owns the fabric, the transit registry, the PRNG, and the per-switch
/// handler tables; collaborators (driver, hooks, checker, sessions) are
/// plugged in at the seams.
pub struct FuzzEngine {
    config: FuzzConfig,
    state: EngineState,
    gate: ReadinessGate,
    fabric: Fabric,
    transit: TransitRegistry,
    handlers: BTreeMap<Dpid, HandlerRegistry>,
    generator: EventGenerator,
    hooks: Box<dyn RoundHooks>,
    checker: Option<InvariantChecker>,
    rng: DetRng,
    logical_time: Round,
    events_generated: u64,
}

impl std::fmt::Debug for FuzzEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzEngine")
            .field("state", &self.state)
            .field("logical_time", &self.logical_time)
            .field("switches", &self.fabric.len())
            .field("events_generated", &self.events_generated)
            .finish_non_exhaustive()
    }
}

impl FuzzEngine {
    /// Creates an engine over a built fabric.
    ///
    /// The default readiness gate requires no controllers; call
    /// [`FuzzEngine::with_readiness`] to demand more, then feed it
    /// notifications via [`FuzzEngine::notify_core_up`] and
    /// [`FuzzEngine::observe_controllers`].
    #[must_use]
    pub fn new(config: FuzzConfig, fabric: Fabric) -> Self {
        let rng = DetRng::new(config.seed);
        Self {
            config,
            state: EngineState::NotReady,
            gate: ReadinessGate::new(0),
            fabric,
            transit: TransitRegistry::new(),
            handlers: BTreeMap::new(),
            generator: EventGenerator::new(),
            hooks: Box::new(BaselineHooks),
            checker: None,
            rng,
            logical_time: Round::ZERO,
            events_generated: 0,
        }
    }

    /// Replaces the readiness gate.
    #[must_use]
    pub fn with_readiness(mut self, gate: ReadinessGate) -> Self {
        self.gate = gate;
        self
    }

    /// Replaces the per-round extension hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Box<dyn RoundHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Attaches an invariant checker for driver-requested checks.
    #[must_use]
    pub fn with_checker(mut self, checker: InvariantChecker) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Logical time: rounds completed so far.
    #[must_use]
    pub fn logical_time(&self) -> Round {
        self.logical_time
    }

    /// Borrows the fabric.
    #[must_use]
    pub fn fabric(&self) -> &Fabric {
        &self.fabric
    }

    /// Mutably borrows the fabric (topology seeding, FIB installation).
    pub fn fabric_mut(&mut self) -> &mut Fabric {
        &mut self.fabric
    }

    /// Borrows the transit registry.
    #[must_use]
    pub fn transit(&self) -> &TransitRegistry {
        &self.transit
    }

    /// Intercepts a control message en route, placing it under the round
    /// scheduler's delay/drop authority.
    pub fn intercept_message(&mut self, payload: impl Into<Vec<u8>>) -> crate::types::MessageId {
        self.transit.intercept(payload)
    }

    /// Registers a controller handler for an event kind on one switch.
    /// First-registered wins at dispatch time.
    pub fn register_handler(
        &mut self,
        dpid: Dpid,
        kind: EventKind,
        handler: impl FnMut(&crate::event::Event) -> HandlerResult + 'static,
    ) {
        self.handlers.entry(dpid).or_default().register(kind, handler);
    }

    /// Records the "core is up" signal and re-evaluates start eligibility.
    pub fn notify_core_up(&mut self) {
        self.gate.notify_core_up();
        self.try_start();
    }

    /// Records a controller status update and re-evaluates start
    /// eligibility.
    pub fn observe_controllers(&mut self, controllers: &[ControllerStatus]) {
        self.gate.observe(controllers);
        self.try_start();
    }

    /// Convenience bootstrap for gates with no controller requirement:
    /// marks the core up and starts the engine.
    pub fn mark_ready(&mut self) {
        self.notify_core_up();
    }

    /// Totals so far; valid on every path, including after a failed run.
    #[must_use]
    pub fn report(&self) -> FuzzReport {
        FuzzReport {
            rounds_completed: self.logical_time.as_u64(),
            events_generated: self.events_generated,
        }
    }

    /// Requests a stop at the current inter-round boundary.
    ///
    /// Rounds already in progress are never interrupted; this is only
    /// callable between rounds because the engine is single-threaded.
    pub fn stop(&mut self) -> FuzzReport {
        self.state = EngineState::Stopped;
        let report = self.report();
        info!(
            rounds = report.rounds_completed,
            events = report.events_generated,
            "fuzzer stopping"
        );
        report
    }

    fn try_start(&mut self) {
        if self.state == EngineState::NotReady && self.gate.is_ready() {
            debug!("readiness gate open, starting fuzz loop");
            self.state = EngineState::Running;
        }
    }

    /// Executes exactly one round.
    ///
    /// Fails unless the engine is `Running`. A collaborator error stops the
    /// engine but does not roll back effects already applied this round.
    pub fn step(&mut self) -> Result<RoundReport> {
        if self.state != EngineState::Running {
            return Err(Error::NotReady);
        }
        match self.round() {
            Ok(report) => Ok(report),
            Err(err) => {
                let totals = self.report();
                error!(
                    rounds = totals.rounds_completed,
                    events = totals.events_generated,
                    %err,
                    "round failed, stopping"
                );
                self.state = EngineState::Stopped;
                Err(err)
            }
        }
    }

    /// Runs rounds until the driver stops the run or a collaborator fails.
    ///
    /// Between rounds the driver may request invariant checks; the round
    /// loop pauses for the duration of each check. On a clean stop the
    /// final totals are returned; on failure they remain available via
    /// [`FuzzEngine::report`].
    pub fn run(&mut self, driver: &mut dyn RoundDriver) -> Result<FuzzReport> {
        self.try_start();
        loop {
            let report = self.step()?;
            info!(round = report.round.as_u64(), "round completed");
            loop {
                match driver.after_round(&report) {
                    RoundDecision::Continue => break,
                    RoundDecision::Stop => return Ok(self.stop()),
                    RoundDecision::Check(kind) => {
                        let outcome = match self.run_check(kind) {
                            Ok(outcome) => outcome,
                            Err(err) => {
                                let totals = self.report();
                                error!(
                                    rounds = totals.rounds_completed,
                                    events = totals.events_generated,
                                    %err,
                                    "invariant check failed, stopping"
                                );
                                self.state = EngineState::Stopped;
                                return Err(err);
                            }
                        };
                        driver.on_check_outcome(kind, outcome);
                    }
                }
            }
        }
    }

    /// Runs one invariant check against current forwarding state.
    ///
    /// Blocking by design: the round loop must not advance while the
    /// external verifier reads the snapshot.
    pub fn run_check(&mut self, kind: CheckKind) -> Result<CheckOutcome> {
        let checker = self.checker.as_ref().ok_or_else(|| {
            Error::VerifierUnavailable("no verifier configured".into())
        })?;
        checker.run_check(kind, &self.fabric)
    }

    /// One round, in the fixed order that defines the PRNG draw sequence.
    fn round(&mut self) -> Result<RoundReport> {
        let Self {
            config,
            fabric,
            transit,
            handlers,
            generator,
            hooks,
            rng,
            logical_time,
            events_generated,
            ..
        } = self;

        // 1. Transit evaluation.
        let transit_summary = transit.check_in_transit(config.delay_rate, config.drop_rate, rng);

        // 2. Crash evaluation over live switches.
        let mut crashed = Vec::new();
        for dpid in fabric.live_switches() {
            if rng.below(config.failure_rate) {
                fabric.fail(dpid)?;
                crashed.push(dpid);
            }
        }

        // 3. Recovery evaluation, skipping this round's fresh crashes so a
        //    crash+recover pair can never mask the crash event.
        let mut recovered = Vec::new();
        for dpid in fabric.crashed_switches() {
            if crashed.contains(&dpid) {
                continue;
            }
            if rng.below(config.recovery_rate) {
                fabric.recover(dpid)?;
                recovered.push(dpid);
            }
        }

        // 4. Link and controller extension points, then timeouts.
        hooks.cut_links(fabric, rng);
        hooks.repair_links(fabric, rng);
        hooks.crash_controllers(rng);
        hooks.restart_controllers(rng);
        hooks.check_timeouts(*logical_time, transit, rng);

        // 5. Traffic fuzzing against live switches.
        let mut events_injected = 0;
        for dpid in fabric.live_switches() {
            if !rng.below(config.of_message_generation_rate) {
                continue;
            }
            let Some(registry) = handlers.get_mut(&dpid) else {
                debug!(%dpid, "no handler table for switch, skipping");
                continue;
            };
            let kinds = registry.kinds();
            if kinds.is_empty() {
                debug!(%dpid, "no registered handlers for switch, skipping");
                continue;
            }
            let &kind = rng.choose(&kinds).expect("kinds is non-empty");
            let switch = fabric.switch(dpid).expect("live dpid exists");
            let event = generator.generate(kind, switch, rng)?;
            *events_generated += 1;
            events_injected += 1;
            if let Some(Err(err)) = registry.dispatch_first(&event) {
                return Err(Error::Collaborator(err));
            }
        }

        *logical_time = logical_time.advanced();
        Ok(RoundReport {
            round: *logical_time,
            crashed,
            recovered,
            delayed: transit_summary.delayed,
            dropped: transit_summary.dropped,
            delivered: transit_summary.delivered.len() as u64,
            events_injected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::Topology;

    fn engine(n: usize, config: FuzzConfig) -> FuzzEngine {
        let mut engine = FuzzEngine::new(config, Topology::full_mesh(n).build());
        engine.mark_ready();
        engine
    }

    #[test]
    fn step_before_ready_is_an_error() {
        let fabric = Topology::full_mesh(2).build();
        let mut engine = FuzzEngine::new(FuzzConfig::new(1), fabric);
        assert_eq!(engine.state(), EngineState::NotReady);
        assert!(matches!(engine.step(), Err(Error::NotReady)));
    }

    #[test]
    fn gate_with_controller_requirement_blocks_start() {
        let fabric = Topology::full_mesh(2).build();
        let mut engine =
            FuzzEngine::new(FuzzConfig::new(1), fabric).with_readiness(ReadinessGate::new(1));
        engine.notify_core_up();
        assert_eq!(engine.state(), EngineState::NotReady);
        engine.observe_controllers(&[ControllerStatus::pending("c1")]);
        assert_eq!(engine.state(), EngineState::NotReady);
        engine.observe_controllers(&[ControllerStatus::ready("c1")]);
        assert_eq!(engine.state(), EngineState::Running);
    }

    #[test]
    fn logical_time_advances_per_round() {
        let mut engine = engine(2, FuzzConfig::new(3).with_traffic_rate(0.0));
        for expected in 1..=5u64 {
            let report = engine.step().expect("round");
            assert_eq!(report.round.as_u64(), expected);
        }
        assert_eq!(engine.logical_time().as_u64(), 5);
    }

    #[test]
    fn crash_and_recover_never_share_a_round() {
        let config = FuzzConfig::new(1234)
            .with_failure_rate(0.7)
            .with_recovery_rate(0.7)
            .with_traffic_rate(0.0);
        let mut engine = engine(5, config);
        for _ in 0..50 {
            let report = engine.step().expect("round");
            for dpid in &report.crashed {
                assert!(!report.recovered.contains(dpid));
            }
        }
    }

    #[test]
    fn fixed_rounds_driver_stops_the_run() {
        let mut engine = engine(3, FuzzConfig::new(0).with_traffic_rate(0.0));
        let report = engine.run(&mut FixedRounds::new(7)).expect("run");
        assert_eq!(report.rounds_completed, 7);
        assert_eq!(engine.state(), EngineState::Stopped);
        assert!(matches!(engine.step(), Err(Error::NotReady)));
    }

    #[test]
    fn handler_error_stops_the_run_without_rollback() {
        let config = FuzzConfig::new(1)
            .with_failure_rate(0.0)
            .with_recovery_rate(0.0)
            .with_traffic_rate(1.0);
        let mut engine = engine(2, config);
        engine.register_handler(Dpid::new(0), EventKind::PacketIn, |_| {
            Err("handler exploded".into())
        });
        let err = engine.run(&mut FixedRounds::new(10)).unwrap_err();
        assert!(matches!(err, Error::Collaborator(_)));
        assert_eq!(engine.state(), EngineState::Stopped);
        // The failing round's event still counts; partial application is
        // the documented property.
        assert_eq!(engine.report().events_generated, 1);
    }

    #[test]
    fn switches_without_handlers_are_skipped_silently() {
        let config = FuzzConfig::new(5)
            .with_failure_rate(0.0)
            .with_recovery_rate(0.0)
            .with_traffic_rate(1.0);
        let mut engine = engine(3, config);
        let report = engine.step().expect("round");
        assert_eq!(report.events_injected, 0);
    }

    #[test]
    fn check_without_checker_is_unavailable() {
        let mut engine = engine(2, FuzzConfig::new(0));
        let err = engine.run_check(CheckKind::LoopFreedom).unwrap_err();
        assert!(matches!(err, Error::VerifierUnavailable(_)));
    }

    #[test]
    fn exit_status_maps_success_and_failure() {
        assert_eq!(exit_status(&Ok(FuzzReport::default())), 0);
        assert_eq!(exit_status(&Err(Error::NotReady)), 1);
    }

    #[test]
    fn stop_reports_totals() {
        let mut engine = engine(2, FuzzConfig::new(0).with_traffic_rate(0.0));
        let _ = engine.step().expect("round");
        let report = engine.stop();
        assert_eq!(report.rounds_completed, 1);
        assert_eq!(engine.state(), EngineState::Stopped);
    }
}
