//! Fuzz engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a fuzz run: the PRNG seed and the per-round rates.
///
/// All rates are probabilities in `[0.0, 1.0]`, compared against one PRNG
/// draw each. Every rate defaults to 0.5.
///
/// ```
/// use fabriclab::engine::FuzzConfig;
///
/// let config = FuzzConfig::new(42)
///     .with_failure_rate(0.1)
///     .with_recovery_rate(0.9)
///     .with_traffic_rate(1.0);
/// assert_eq!(config.seed, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzConfig {
    /// Seed for the deterministic PRNG.
    pub seed: u64,
    /// Per-round probability that a live switch crashes.
    pub failure_rate: f64,
    /// Per-round probability that a failed switch recovers.
    pub recovery_rate: f64,
    /// Per-message probability that an in-flight message is delayed.
    pub delay_rate: f64,
    /// Per-message probability that an in-flight message is dropped,
    /// evaluated only when the delay draw did not fire.
    pub drop_rate: f64,
    /// Per-round probability that a live switch emits synthetic traffic.
    pub of_message_generation_rate: f64,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

impl FuzzConfig {
    /// Creates a config with the given seed and the default 0.5 rates.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            failure_rate: 0.5,
            recovery_rate: 0.5,
            delay_rate: 0.5,
            drop_rate: 0.5,
            of_message_generation_rate: 0.5,
        }
    }

    /// Sets the switch crash probability.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not in `[0.0, 1.0]`.
    #[must_use]
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        assert_rate(rate, "failure");
        self.failure_rate = rate;
        self
    }

    /// Sets the switch recovery probability.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not in `[0.0, 1.0]`.
    #[must_use]
    pub fn with_recovery_rate(mut self, rate: f64) -> Self {
        assert_rate(rate, "recovery");
        self.recovery_rate = rate;
        self
    }

    /// Sets the in-flight message delay probability.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not in `[0.0, 1.0]`.
    #[must_use]
    pub fn with_delay_rate(mut self, rate: f64) -> Self {
        assert_rate(rate, "delay");
        self.delay_rate = rate;
        self
    }

    /// Sets the in-flight message drop probability.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not in `[0.0, 1.0]`.
    #[must_use]
    pub fn with_drop_rate(mut self, rate: f64) -> Self {
        assert_rate(rate, "drop");
        self.drop_rate = rate;
        self
    }

    /// Sets the synthetic traffic generation probability.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not in `[0.0, 1.0]`.
    #[must_use]
    pub fn with_traffic_rate(mut self, rate: f64) -> Self {
        assert_rate(rate, "traffic generation");
        self.of_message_generation_rate = rate;
        self
    }
}

fn assert_rate(rate: f64, what: &str) {
    assert!(
        (0.0..=1.0).contains(&rate),
        "{what} rate must be in [0.0, 1.0], got {rate}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rate_defaults_to_half() {
        let config = FuzzConfig::default();
        assert_eq!(config.seed, 0);
        for rate in [
            config.failure_rate,
            config.recovery_rate,
            config.delay_rate,
            config.drop_rate,
            config.of_message_generation_rate,
        ] {
            assert!((rate - 0.5).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn builder_sets_each_rate() {
        let config = FuzzConfig::new(7)
            .with_failure_rate(0.0)
            .with_recovery_rate(1.0)
            .with_delay_rate(0.25)
            .with_drop_rate(0.75)
            .with_traffic_rate(0.5);
        assert!((config.failure_rate).abs() < f64::EPSILON);
        assert!((config.recovery_rate - 1.0).abs() < f64::EPSILON);
        assert!((config.delay_rate - 0.25).abs() < f64::EPSILON);
        assert!((config.drop_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    #[should_panic(expected = "failure rate must be in [0.0, 1.0]")]
    fn rejects_out_of_range_rate() {
        let _ = FuzzConfig::new(0).with_failure_rate(1.5);
    }

    #[test]
    fn serde_roundtrip() {
        let config = FuzzConfig::new(99).with_traffic_rate(1.0);
        let json = serde_json::to_string(&config).expect("serialize");
        let back: FuzzConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(config, back);
    }
}
