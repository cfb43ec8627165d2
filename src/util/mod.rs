//! Internal utilities for the fuzz harness.
//!
//! Intentionally minimal and dependency-free to maintain determinism in the
//! round scheduler.

pub mod det_rng;

pub use det_rng::DetRng;
