//! Switches and ports.

use crate::fabric::fib::FlowTable;
use crate::fabric::session::{SessionResult, SwitchSession};
use crate::types::{Dpid, HwAddr, PortNo};
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// Liveness of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Liveness {
    /// The switch is alive and its session is established.
    #[default]
    Up,
    /// The switch has crashed; its session is torn down.
    Failed,
}

/// A switch port, immutable after creation.
#[derive(Debug, Clone)]
pub struct Port {
    no: PortNo,
    name: String,
    hw_addr: HwAddr,
    nw_addr: Option<Ipv4Addr>,
}

impl Port {
    /// Creates a port with the given number, name, and addresses.
    ///
    /// The name may be empty; [`Port::interface_name`] falls back to
    /// `eth<no>` in that case.
    #[must_use]
    pub fn new(no: PortNo, name: impl Into<String>, hw_addr: HwAddr, nw_addr: Option<Ipv4Addr>) -> Self {
        Self {
            no,
            name: name.into(),
            hw_addr,
            nw_addr,
        }
    }

    /// The 1-based port number.
    #[must_use]
    pub fn no(&self) -> PortNo {
        self.no
    }

    /// The port's hardware address.
    #[must_use]
    pub fn hw_addr(&self) -> HwAddr {
        self.hw_addr
    }

    /// The synthetic network address, if one was assigned.
    ///
    /// Only the invariant-checker CSV export reads this.
    #[must_use]
    pub fn nw_addr(&self) -> Option<Ipv4Addr> {
        self.nw_addr
    }

    /// The interface name: the configured name, or `eth<no>` when unnamed.
    #[must_use]
    pub fn interface_name(&self) -> String {
        if self.name.is_empty() {
            format!("eth{}", self.no.as_u16())
        } else {
            self.name.clone()
        }
    }
}

/// A simulated switch.
///
/// Created at topology-build time and never destroyed during a run: a crash
/// flips the liveness flag and tears down the session, but identity, ports,
/// and forwarding state all survive for a later recovery.
pub struct Switch {
    dpid: Dpid,
    ports: BTreeMap<PortNo, Port>,
    liveness: Liveness,
    session: Box<dyn SwitchSession>,
    table: Option<FlowTable>,
}

impl fmt::Debug for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switch")
            .field("dpid", &self.dpid)
            .field("ports", &self.ports.len())
            .field("liveness", &self.liveness)
            .field("has_table", &self.table.is_some())
            .finish_non_exhaustive()
    }
}

impl Switch {
    /// Creates a switch from its ports and session.
    ///
    /// # Panics
    ///
    /// Panics if two ports share a port number.
    #[must_use]
    pub fn new(dpid: Dpid, ports: Vec<Port>, session: Box<dyn SwitchSession>) -> Self {
        let mut by_no = BTreeMap::new();
        for port in ports {
            let no = port.no();
            assert!(
                by_no.insert(no, port).is_none(),
                "duplicate port {no} on switch {dpid}"
            );
        }
        Self {
            dpid,
            ports: by_no,
            liveness: Liveness::Up,
            session,
            table: None,
        }
    }

    /// The datapath identifier.
    #[must_use]
    pub fn dpid(&self) -> Dpid {
        self.dpid
    }

    /// Current liveness.
    #[must_use]
    pub fn liveness(&self) -> Liveness {
        self.liveness
    }

    /// Whether the switch is up.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.liveness == Liveness::Up
    }

    /// Borrows a port by number.
    #[must_use]
    pub fn port(&self, no: PortNo) -> Option<&Port> {
        self.ports.get(&no)
    }

    /// Iterates ports in ascending port-number order.
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    /// Port numbers in ascending order.
    #[must_use]
    pub fn port_nos(&self) -> Vec<PortNo> {
        self.ports.keys().copied().collect()
    }

    /// Borrows the session handle.
    #[must_use]
    pub fn session(&self) -> &dyn SwitchSession {
        self.session.as_ref()
    }

    /// Mutably borrows the session handle.
    pub fn session_mut(&mut self) -> &mut dyn SwitchSession {
        self.session.as_mut()
    }

    /// The forwarding table, if the switch exposes one.
    #[must_use]
    pub fn table(&self) -> Option<&FlowTable> {
        self.table.as_ref()
    }

    /// Mutably borrows the forwarding table.
    pub fn table_mut(&mut self) -> Option<&mut FlowTable> {
        self.table.as_mut()
    }

    /// Installs (or replaces) the forwarding table.
    pub fn set_table(&mut self, table: FlowTable) {
        self.table = Some(table);
    }

    /// Transitions `Up -> Failed` and disconnects the session.
    ///
    /// Callers are expected to have checked liveness; the fabric owns the
    /// idempotence warning.
    pub(crate) fn fail(&mut self) {
        self.liveness = Liveness::Failed;
        self.session.disconnect();
    }

    /// Transitions `Failed -> Up` and re-establishes the session.
    pub(crate) fn recover(&mut self) -> SessionResult {
        self.session.reconnect()?;
        self.liveness = Liveness::Up;
        Ok(())
    }
}
