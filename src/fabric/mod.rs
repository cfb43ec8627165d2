//! The simulated switch fabric.
//!
//! Pure data plus the fault state machine: switches with ports and optional
//! forwarding tables, directed links materialized from a patch-panel wiring
//! policy, and opaque per-switch sessions. All mutation flows through the
//! single-threaded round loop of the fuzz engine; nothing here spawns work or
//! keeps hidden state.

pub mod fib;
pub mod link;
pub mod patch_panel;
pub mod session;
pub mod switch;
pub mod topology;

pub use fib::{FlowAction, FlowEntry, FlowMatch, FlowTable};
pub use link::{Endpoint, Link};
pub use patch_panel::{FullMeshPanel, PatchPanel};
pub use session::{RecordingSession, SessionResult, SwitchSession};
pub use switch::{Liveness, Port, Switch};
pub use topology::Topology;

use crate::error::{Error, Result};
use crate::tracing_compat::{info, warn};
use crate::types::{Dpid, PortNo};
use std::collections::BTreeMap;

/// The fabric model: every switch in the simulated network plus its wiring.
///
/// Switches are created at topology-build time and never destroyed during a
/// run; crashing a switch flips its liveness flag and tears down its session,
/// nothing more.
#[derive(Debug)]
pub struct Fabric {
    switches: BTreeMap<Dpid, Switch>,
    links: BTreeMap<Endpoint, Endpoint>,
    panel: Box<dyn PatchPanel>,
}

impl Fabric {
    /// Assembles a fabric from built switches and a wiring policy.
    ///
    /// Directed links are materialized eagerly (forward and reverse) so that
    /// forwarding and invariant snapshotting are single lookups.
    ///
    /// # Panics
    ///
    /// Panics if the panel wires two distinct ports to the same peer, i.e.
    /// the wiring is not bijective.
    #[must_use]
    pub fn new(switches: Vec<Switch>, panel: Box<dyn PatchPanel>) -> Self {
        let switches: BTreeMap<Dpid, Switch> =
            switches.into_iter().map(|s| (s.dpid(), s)).collect();

        let mut links = BTreeMap::new();
        for (&dpid, switch) in &switches {
            for port in switch.port_nos() {
                let src = Endpoint { dpid, port };
                if let Some(dst) = panel.connected_port(dpid, port) {
                    let previous = links.insert(src, dst);
                    assert!(previous.is_none(), "duplicate link source {src:?}");
                }
            }
        }
        // Wiring must be symmetric: the reverse of every link is also a link.
        for (src, dst) in &links {
            assert_eq!(
                links.get(dst),
                Some(src),
                "panel wiring is not symmetric at {src:?} -> {dst:?}"
            );
        }

        Self {
            switches,
            links,
            panel,
        }
    }

    /// Number of switches in the fabric.
    #[must_use]
    pub fn len(&self) -> usize {
        self.switches.len()
    }

    /// Returns true if the fabric has no switches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    /// All dpids in ascending order.
    #[must_use]
    pub fn dpids(&self) -> Vec<Dpid> {
        self.switches.keys().copied().collect()
    }

    /// Borrows a switch by dpid.
    #[must_use]
    pub fn switch(&self, dpid: Dpid) -> Option<&Switch> {
        self.switches.get(&dpid)
    }

    /// Mutably borrows a switch by dpid.
    pub fn switch_mut(&mut self, dpid: Dpid) -> Option<&mut Switch> {
        self.switches.get_mut(&dpid)
    }

    /// Iterates all switches in ascending dpid order.
    pub fn switches(&self) -> impl Iterator<Item = &Switch> {
        self.switches.values()
    }

    /// The switches which are currently up, in ascending dpid order.
    #[must_use]
    pub fn live_switches(&self) -> Vec<Dpid> {
        self.switches
            .values()
            .filter(|s| s.is_up())
            .map(Switch::dpid)
            .collect()
    }

    /// The switches which are currently down, in ascending dpid order.
    #[must_use]
    pub fn crashed_switches(&self) -> Vec<Dpid> {
        self.switches
            .values()
            .filter(|s| !s.is_up())
            .map(Switch::dpid)
            .collect()
    }

    /// Crashes a switch: `Up -> Failed`, tearing down its session.
    ///
    /// Idempotent: failing an already-failed switch logs a warning and does
    /// nothing else. Returns an error only for an unknown dpid.
    pub fn fail(&mut self, dpid: Dpid) -> Result<()> {
        let switch = self
            .switches
            .get_mut(&dpid)
            .ok_or_else(|| Error::collaborator_msg(format!("unknown switch {dpid}")))?;
        if !switch.is_up() {
            warn!(%dpid, "switch already failed");
            return Ok(());
        }
        info!(%dpid, "crashing switch");
        switch.fail();
        Ok(())
    }

    /// Recovers a switch: `Failed -> Up`, re-establishing its session.
    ///
    /// Idempotent: recovering an already-up switch logs a warning and does
    /// nothing else. A session collaborator failure during reconnect
    /// surfaces as [`Error::Collaborator`].
    pub fn recover(&mut self, dpid: Dpid) -> Result<()> {
        let switch = self
            .switches
            .get_mut(&dpid)
            .ok_or_else(|| Error::collaborator_msg(format!("unknown switch {dpid}")))?;
        if switch.is_up() {
            warn!(%dpid, "switch already up");
            return Ok(());
        }
        info!(%dpid, "rebooting switch");
        switch.recover().map_err(Error::Collaborator)
    }

    /// The port physically wired to `(dpid, port)`, per the panel policy.
    #[must_use]
    pub fn connected_port(&self, dpid: Dpid, port: PortNo) -> Option<Endpoint> {
        self.panel.connected_port(dpid, port)
    }

    /// The directed link with the given source endpoint, if wired.
    #[must_use]
    pub fn link_from(&self, src: Endpoint) -> Option<Link> {
        self.links.get(&src).map(|&dst| Link { src, dst })
    }

    /// All directed links in ascending source-endpoint order.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.links
            .iter()
            .map(|(&src, &dst)| Link { src, dst })
    }
}
