//! Test utilities.
//!
//! Shared helpers for unit and integration tests: tracing-based logging
//! initialization and small fixture builders. Compiled only for tests and
//! the `test-internals` feature.

use crate::engine::{FuzzConfig, FuzzEngine};
use crate::fabric::Topology;
use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Default seed used by test fixtures.
pub const DEFAULT_TEST_SEED: u64 = 0xDEAD_BEEF;

/// Initialize test logging with debug-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

/// A ready-to-step engine over a full mesh, with all fault rates zeroed.
///
/// Tests opt back in to the faults they exercise via the returned engine's
/// config. Fixtures that crash switches at random make scenario tests
/// flaky in spirit even when seeded.
#[must_use]
pub fn quiet_mesh_engine(switches: usize, seed: u64) -> FuzzEngine {
    let config = FuzzConfig::new(seed)
        .with_failure_rate(0.0)
        .with_recovery_rate(0.0)
        .with_delay_rate(0.0)
        .with_drop_rate(0.0)
        .with_traffic_rate(0.0);
    let mut engine = FuzzEngine::new(config, Topology::full_mesh(switches).build());
    engine.mark_ready();
    engine
}
