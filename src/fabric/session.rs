//! Switch session collaborators.
//!
//! The harness never speaks the real wire protocol; it only needs a
//! capability surface over whatever connection a switch currently has:
//! send a control message, tear the connection down on a crash, and bring
//! it back up (handshake included) on recovery. Real deployments plug in
//! their own implementation; [`RecordingSession`] is the in-process default.

use std::fmt;

/// Result type for session operations.
///
/// Session errors are wrapped into [`crate::Error::Collaborator`] by the
/// fabric before they reach the round loop.
pub type SessionResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A switch's connection/session handle, opaque to the core.
pub trait SwitchSession: fmt::Debug {
    /// Sends a control message over the session.
    ///
    /// Implementations decide what to do while disconnected; the default
    /// recording session silently discards.
    fn send(&mut self, message: &[u8]) -> SessionResult;

    /// Tears the session down. Called when the switch crashes.
    fn disconnect(&mut self);

    /// Re-establishes the session, including any handshake.
    /// Called when the switch recovers.
    fn reconnect(&mut self) -> SessionResult;

    /// Whether the session is currently established.
    fn is_connected(&self) -> bool;
}

/// In-process session stub that records every message sent while connected.
///
/// Messages sent while disconnected are dropped, mirroring a dead TCP
/// connection rather than erroring: a crashed switch going dark is a
/// simulated fault, not a harness bug.
#[derive(Debug, Default)]
pub struct RecordingSession {
    connected: bool,
    sent: Vec<Vec<u8>>,
}

impl RecordingSession {
    /// Creates a connected recording session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connected: true,
            sent: Vec::new(),
        }
    }

    /// The control messages sent while the session was connected.
    #[must_use]
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }
}

impl SwitchSession for RecordingSession {
    fn send(&mut self, message: &[u8]) -> SessionResult {
        if self.connected {
            self.sent.push(message.to_vec());
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn reconnect(&mut self) -> SessionResult {
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
