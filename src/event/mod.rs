//! Synthetic protocol events and handler dispatch.
//!
//! Event kinds are an explicit enumeration and each switch's handlers live
//! in a typed dispatch table keyed by kind. Registration order is the
//! tie-break: the first-registered handler for a kind is "the controller's
//! handler" for fuzz-traffic purposes.

pub mod generator;

pub use generator::EventGenerator;

use crate::types::{Dpid, HwAddr, PortNo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The kinds of synthetic events the harness can deliver.
///
/// Extending the harness with a new protocol event means adding a variant
/// here and a generator arm in [`EventGenerator`]; the round scheduler is
/// untouched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EventKind {
    /// A data-plane packet punted to the controller.
    PacketIn,
    /// A forwarding entry expired or was evicted. Registerable, but the
    /// generator does not synthesize these yet.
    FlowRemoved,
    /// A port changed state. Registerable, but the generator does not
    /// synthesize these yet.
    PortStatus,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PacketIn => write!(f, "packet-in"),
            Self::FlowRemoved => write!(f, "flow-removed"),
            Self::PortStatus => write!(f, "port-status"),
        }
    }
}

/// A synthetic packet-arrival event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketIn {
    /// The switch that saw the packet.
    pub dpid: Dpid,
    /// The ingress port; always one of the switch's declared ports.
    pub in_port: PortNo,
    /// Synthesized source hardware address (locally administered).
    pub src: HwAddr,
    /// Destination hardware address, copied from the ingress port.
    pub dst: HwAddr,
    /// Randomized transaction identifier.
    pub xid: u32,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
}

/// A synthetic event delivered to registered handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A packet-arrival event.
    PacketIn(PacketIn),
}

impl Event {
    /// The kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PacketIn(_) => EventKind::PacketIn,
        }
    }
}

/// Result of a handler invocation. A handler error is a collaborator
/// failure: it aborts the round loop without being retried or rolled back.
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A registered event callback.
pub type Handler = Box<dyn FnMut(&Event) -> HandlerResult>;

/// Per-switch dispatch table: event kind to ordered callback list.
///
/// Externally owned in spirit (the controller under test registers its
/// handlers here) but read by the round scheduler when fuzzing traffic.
#[derive(Default)]
pub struct HandlerRegistry {
    table: BTreeMap<EventKind, Vec<Handler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<EventKind, usize> =
            self.table.iter().map(|(&k, v)| (k, v.len())).collect();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &counts)
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for an event kind. First-registered wins when
    /// the scheduler dispatches fuzz traffic.
    pub fn register(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) -> HandlerResult + 'static,
    ) {
        self.table.entry(kind).or_default().push(Box::new(handler));
    }

    /// The kinds with at least one registered handler, in stable order.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        self.table
            .iter()
            .filter(|(_, handlers)| !handlers.is_empty())
            .map(|(&kind, _)| kind)
            .collect()
    }

    /// Whether no handlers are registered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.values().all(Vec::is_empty)
    }

    /// Invokes the first-registered handler for the event's kind.
    ///
    /// Returns `None` when no handler is registered for that kind.
    pub fn dispatch_first(&mut self, event: &Event) -> Option<HandlerResult> {
        self.table
            .get_mut(&event.kind())
            .and_then(|handlers| handlers.first_mut())
            .map(|handler| handler(event))
    }
}
