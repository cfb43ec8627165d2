//! Topology builder.
//!
//! Given a switch count, builds the full set of switches and a populated
//! patch panel (full mesh by default). This is the boundary where synthetic
//! addresses are assigned: port `p` on switch `s` gets hardware address
//! `00:00:00:00:<s>:<p>` and network address `1.1.<s>.<p>`.

use crate::fabric::patch_panel::FullMeshPanel;
use crate::fabric::session::{RecordingSession, SwitchSession};
use crate::fabric::switch::{Port, Switch};
use crate::fabric::{Fabric, FlowTable};
use crate::types::{Dpid, HwAddr, PortNo};
use std::net::Ipv4Addr;

/// Factory for the session attached to each built switch.
pub type SessionFactory = Box<dyn Fn(Dpid) -> Box<dyn SwitchSession>>;

/// Builder for a simulated fabric.
///
/// ```
/// use fabriclab::fabric::Topology;
///
/// let fabric = Topology::full_mesh(3).build();
/// assert_eq!(fabric.len(), 3);
/// ```
pub struct Topology {
    num_switches: usize,
    session_factory: SessionFactory,
}

impl std::fmt::Debug for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topology")
            .field("num_switches", &self.num_switches)
            .finish_non_exhaustive()
    }
}

impl Topology {
    /// A full mesh of `num_switches` switches with N-1 ports each.
    ///
    /// # Panics
    ///
    /// Panics if `num_switches` is zero.
    #[must_use]
    pub fn full_mesh(num_switches: usize) -> Self {
        assert!(num_switches > 0, "a fabric needs at least one switch");
        Self {
            num_switches,
            session_factory: Box::new(|_| Box::new(RecordingSession::new())),
        }
    }

    /// Overrides the session attached to each switch.
    ///
    /// Use this to wire switches into an externally-owned connection layer
    /// instead of the default in-process recording stub.
    #[must_use]
    pub fn with_session_factory(
        mut self,
        factory: impl Fn(Dpid) -> Box<dyn SwitchSession> + 'static,
    ) -> Self {
        self.session_factory = Box::new(factory);
        self
    }

    /// Builds the fabric: switches, sessions, empty flow tables, and the
    /// materialized mesh wiring.
    #[must_use]
    pub fn build(self) -> Fabric {
        let ports_per_switch = self.num_switches - 1;
        let dpids: Vec<Dpid> = (0..self.num_switches as u64).map(Dpid::new).collect();

        let switches = dpids
            .iter()
            .map(|&dpid| {
                let ports = (0..ports_per_switch)
                    .map(|idx| {
                        let no = PortNo::from_index(idx);
                        Port::new(
                            no,
                            "",
                            HwAddr::for_port(dpid, no),
                            Some(port_nw_addr(dpid, no)),
                        )
                    })
                    .collect();
                let mut switch = Switch::new(dpid, ports, (self.session_factory)(dpid));
                switch.set_table(FlowTable::new());
                switch
            })
            .collect();

        Fabric::new(switches, Box::new(FullMeshPanel::new(dpids)))
    }
}

/// The synthetic network address for a port: `1.1.<dpid>.<port>`.
fn port_nw_addr(dpid: Dpid, port: PortNo) -> Ipv4Addr {
    Ipv4Addr::new(1, 1, (dpid.as_u64() & 0xff) as u8, (port.as_u16() & 0xff) as u8)
}
