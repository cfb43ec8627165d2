//! Readiness gate.
//!
//! The fuzz engine may not start until the surrounding control plane is up:
//! the core has booted, the required number of controller-like entities are
//! present, and every one of them has completed its handshake. The gate
//! consumes two external signals — a "core up" notification and topology
//! update notifications carrying controller status — and re-evaluates
//! eligibility on each.

use crate::tracing_compat::debug;
use serde::{Deserialize, Serialize};

/// Status of one controller-like entity, as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerStatus {
    /// The controller's name, for diagnostics only.
    pub name: String,
    /// Whether the controller completed its handshake.
    pub handshake_complete: bool,
}

impl ControllerStatus {
    /// A controller that has completed its handshake.
    #[must_use]
    pub fn ready(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handshake_complete: true,
        }
    }

    /// A controller still mid-handshake.
    #[must_use]
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handshake_complete: false,
        }
    }
}

/// Gate deciding whether the fuzz engine may start.
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    required_controllers: usize,
    core_up: bool,
    controllers_present: usize,
    handshakes_pending: usize,
}

impl ReadinessGate {
    /// Creates a gate requiring `required_controllers` handshaken
    /// controllers before the engine may start.
    #[must_use]
    pub fn new(required_controllers: usize) -> Self {
        Self {
            required_controllers,
            ..Self::default()
        }
    }

    /// Records the "core is up" notification.
    pub fn notify_core_up(&mut self) {
        self.core_up = true;
    }

    /// Records a topology update carrying current controller status.
    ///
    /// Returns the gate's readiness after the update.
    pub fn observe(&mut self, controllers: &[ControllerStatus]) -> bool {
        self.controllers_present = controllers.len();
        self.handshakes_pending = controllers
            .iter()
            .filter(|c| !c.handshake_complete)
            .count();
        if !self.is_ready() {
            debug!(
                present = self.controllers_present,
                required = self.required_controllers,
                pending = self.handshakes_pending,
                core_up = self.core_up,
                "not ready to start"
            );
        }
        self.is_ready()
    }

    /// Whether all start conditions hold.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.core_up
            && self.controllers_present >= self.required_controllers
            && self.handshakes_pending == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_core_up() {
        let mut gate = ReadinessGate::new(0);
        assert!(!gate.is_ready());
        gate.notify_core_up();
        assert!(gate.is_ready());
    }

    #[test]
    fn requires_controller_count() {
        let mut gate = ReadinessGate::new(2);
        gate.notify_core_up();
        assert!(!gate.observe(&[ControllerStatus::ready("c1")]));
        assert!(gate.observe(&[
            ControllerStatus::ready("c1"),
            ControllerStatus::ready("c2"),
        ]));
    }

    #[test]
    fn requires_all_handshakes_complete() {
        let mut gate = ReadinessGate::new(1);
        gate.notify_core_up();
        assert!(!gate.observe(&[ControllerStatus::pending("slow")]));
        assert!(gate.observe(&[ControllerStatus::ready("slow")]));
    }

    #[test]
    fn reevaluates_on_each_update() {
        let mut gate = ReadinessGate::new(1);
        gate.notify_core_up();
        assert!(gate.observe(&[ControllerStatus::ready("c1")]));
        // A later update can take readiness away again.
        assert!(!gate.observe(&[]));
        assert!(!gate.is_ready());
    }
}
