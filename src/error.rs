//! Error types for the fuzz harness.
//!
//! Local, recoverable conditions (re-failing a failed switch, a switch with
//! no registered handlers) are logged as warnings and never surface here.
//! Everything in this enum propagates to the caller of the round loop or of
//! the checker bridge.

use crate::event::EventKind;
use crate::types::Dpid;

/// Result alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the fuzz harness.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The event generator has no entry for the requested event kind.
    #[error("no generator registered for event kind {0}")]
    UnsupportedEventType(EventKind),

    /// Event generation needs a port but the switch has none.
    #[error("switch {0} has no ports to generate traffic from")]
    NoPortsAvailable(Dpid),

    /// Forwarding-state export was asked of a switch without a flow table.
    #[error("switch {0} has no forwarding state to snapshot")]
    NoForwardingState(Dpid),

    /// The external verifier could not be located or exited abnormally.
    #[error("invariant verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// The requested check has no implementation target.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// An external collaborator (handler, session) surfaced an error.
    #[error("collaborator failure: {0}")]
    Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The engine was asked to run before its readiness gate opened, or
    /// after it stopped.
    #[error("engine is not running (readiness gate closed or run stopped)")]
    NotReady,

    /// Artifact I/O failed while producing or cleaning verifier inputs.
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps an arbitrary collaborator error.
    pub fn collaborator<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Collaborator(Box::new(err))
    }

    /// Wraps a collaborator failure described only by a message.
    #[must_use]
    pub fn collaborator_msg(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into().into())
    }
}
