//! Deterministic synthetic event generator.
//!
//! Produces one plausible protocol event for a given switch, drawing all
//! randomness from the shared PRNG. No I/O: the generated event is handed
//! back to the caller, which decides whether and how to deliver it.

use crate::error::{Error, Result};
use crate::event::{Event, EventKind, PacketIn};
use crate::fabric::Switch;
use crate::types::HwAddr;
use crate::util::DetRng;

/// Factory for synthetic protocol events.
///
/// The generator table is the `match` in [`EventGenerator::generate`]:
/// one arm per supported [`EventKind`], extended by kind without touching
/// the round scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventGenerator;

impl EventGenerator {
    /// Creates a generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generates one event of the given kind for the given switch.
    ///
    /// Draw order is fixed: ingress port, then source address, then
    /// transaction id. Callers relying on replay must not reorder calls.
    pub fn generate(&self, kind: EventKind, switch: &Switch, rng: &mut DetRng) -> Result<Event> {
        match kind {
            EventKind::PacketIn => self.packet_in(switch, rng),
            unsupported => Err(Error::UnsupportedEventType(unsupported)),
        }
    }

    fn packet_in(&self, switch: &Switch, rng: &mut DetRng) -> Result<Event> {
        let port_nos = switch.port_nos();
        let &in_port = rng
            .choose(&port_nos)
            .ok_or_else(|| Error::NoPortsAvailable(switch.dpid()))?;
        let port = switch
            .port(in_port)
            .expect("chosen port exists on the switch");

        let mut src = [0u8; 6];
        rng.fill_bytes(&mut src);
        // Locally administered, unicast.
        src[0] = (src[0] | 0x02) & 0xfe;

        Ok(Event::PacketIn(PacketIn {
            dpid: switch.dpid(),
            in_port,
            src: HwAddr::new(src),
            dst: port.hw_addr(),
            xid: rng.next_u64() as u32,
            payload: Vec::new(),
        }))
    }
}
