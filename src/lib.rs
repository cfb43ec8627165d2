//! Fabriclab: deterministic fault-injection fuzz harness for SDN controllers.
//!
//! # Overview
//!
//! Fabriclab exercises a controller application against a simulated switch
//! fabric. Each fuzz round applies, in a fixed order, message delay/drop
//! decisions, switch crash and recovery decisions, and synthetic protocol
//! traffic against the handlers the controller registered. Derived forwarding
//! state can be snapshotted at any inter-round boundary and handed to an
//! external invariant verifier.
//!
//! # Core Guarantees
//!
//! - **Reproducibility**: every randomized decision is drawn from one seeded
//!   PRNG in one fixed traversal order; same seed → same run
//! - **Total ordering**: rounds are discrete logical time steps; no effect is
//!   applied outside the round loop
//! - **Crash ≠ removal**: a failed switch keeps its identity, ports, and
//!   forwarding state and can recover later in the run
//! - **Unconditional cleanup**: verifier artifacts are deleted on every exit
//!   path, success or failure
//!
//! # Module Structure
//!
//! - [`types`]: Identifier newtypes (dpid, port number, round) and addresses
//! - [`fabric`]: Switches, ports, links, patch panel wiring, forwarding tables
//! - [`event`]: Event kinds, handler dispatch tables, synthetic event generator
//! - [`transit`]: In-flight control message registry
//! - [`engine`]: The round scheduler, its configuration, and the readiness gate
//! - [`checker`]: Bridge to the external invariant verifier
//! - [`util`]: Deterministic RNG
//! - [`error`](mod@error): Error taxonomy
//!
//! # Quick Start
//!
//! ```
//! use fabriclab::engine::{FixedRounds, FuzzConfig, FuzzEngine};
//! use fabriclab::fabric::Topology;
//!
//! let fabric = Topology::full_mesh(3).build();
//! let config = FuzzConfig::new(42).with_failure_rate(0.0).with_recovery_rate(0.0);
//! let mut engine = FuzzEngine::new(config, fabric);
//! engine.mark_ready();
//! let report = engine.run(&mut FixedRounds::new(10)).expect("fuzz run");
//! assert_eq!(report.rounds_completed, 10);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod checker;
pub mod engine;
pub mod error;
pub mod event;
pub mod fabric;
pub mod tracing_compat;
pub mod transit;
pub mod types;
pub mod util;

// ── Test-only modules ───────────────────────────────────────────────────
#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

// Re-exports for convenient access to core types
pub use checker::{CheckKind, CheckOutcome, InvariantChecker, VerifierConfig};
pub use engine::{
    BaselineHooks, ControllerStatus, EngineState, FixedRounds, FuzzConfig, FuzzEngine, FuzzReport,
    ReadinessGate, RoundDecision, RoundDriver, RoundHooks, RoundReport, exit_status,
};
pub use error::{Error, Result};
pub use event::{Event, EventGenerator, EventKind, HandlerRegistry, HandlerResult, PacketIn};
pub use fabric::{
    Endpoint, Fabric, FlowAction, FlowEntry, FlowMatch, FlowTable, FullMeshPanel, Link, Liveness,
    PatchPanel, Port, RecordingSession, Switch, SwitchSession, Topology,
};
pub use transit::{TransitMessage, TransitRegistry, TransitSummary};
pub use types::{Dpid, HwAddr, MessageId, PortNo, Round};
pub use util::DetRng;
